//! The closed set of abstract column types.

use std::fmt;

use crate::error::{DbxError, Result};

/// Abstract, dialect-neutral column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum DataType {
    Char,
    String,
    Text,
    MediumText,
    LongText,
    TinyInt,
    SmallInt,
    MediumInt,
    Int,
    BigInt,
    TinyBlob,
    Blob,
    MediumBlob,
    LongBlob,
    Float,
    Double,
    Decimal,
    Boolean,
    Enum,
    Set,
    Json,
    Jsonb,
    Date,
    DateTime,
    DateTimeTz,
    Time,
    TimeTz,
    Timestamp,
    TimestampTz,
    Year,
    Binary,
    Uuid,
    IpAddress,
    MacAddress,
    Geometry,
    Point,
    LineString,
    Polygon,
    GeometryCollection,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
    /// Declarable but not mapped by any dialect.
    MultiPolygonZ,
}

impl DataType {
    /// Returns the abstract type name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Char => "char",
            Self::String => "string",
            Self::Text => "text",
            Self::MediumText => "mediumText",
            Self::LongText => "longText",
            Self::TinyInt => "tinyInt",
            Self::SmallInt => "smallInt",
            Self::MediumInt => "mediumInt",
            Self::Int => "int",
            Self::BigInt => "bigInt",
            Self::TinyBlob => "tinyBlob",
            Self::Blob => "blob",
            Self::MediumBlob => "mediumBlob",
            Self::LongBlob => "longBlob",
            Self::Float => "float",
            Self::Double => "double",
            Self::Decimal => "decimal",
            Self::Boolean => "boolean",
            Self::Enum => "enum",
            Self::Set => "set",
            Self::Json => "json",
            Self::Jsonb => "jsonb",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::DateTimeTz => "datetimeTz",
            Self::Time => "time",
            Self::TimeTz => "timeTz",
            Self::Timestamp => "timestamp",
            Self::TimestampTz => "timestampTz",
            Self::Year => "year",
            Self::Binary => "binary",
            Self::Uuid => "uuid",
            Self::IpAddress => "ipAddress",
            Self::MacAddress => "macAddress",
            Self::Geometry => "geometry",
            Self::Point => "point",
            Self::LineString => "lineString",
            Self::Polygon => "polygon",
            Self::GeometryCollection => "geometryCollection",
            Self::MultiPoint => "multiPoint",
            Self::MultiLineString => "multiLineString",
            Self::MultiPolygon => "multiPolygon",
            Self::MultiPolygonZ => "multiPolygonZ",
        }
    }

    /// Maps a generic catalog type name to an abstract type.
    ///
    /// Matching is case-insensitive. Dialects translate their own aliases
    /// (`int8`, `bpchar`, `tinyint(1)`, ...) before falling back to this.
    ///
    /// # Errors
    ///
    /// Returns [`DbxError::InvalidValue`] for an unknown name.
    pub fn from_catalog(name: &str) -> Result<Self> {
        let data_type = match name.trim().to_ascii_lowercase().as_str() {
            "char" => Self::Char,
            "string" | "varchar" => Self::String,
            "text" => Self::Text,
            "mediumtext" => Self::MediumText,
            "longtext" => Self::LongText,
            "int" | "integer" | "int4" | "int2" => Self::Int,
            "tinyint" | "tinyinteger" => Self::TinyInt,
            "smallint" | "smallinteger" => Self::SmallInt,
            "mediumint" | "mediuminteger" => Self::MediumInt,
            "bigint" | "biginteger" | "int8" => Self::BigInt,
            "blob" => Self::Blob,
            "tinyblob" => Self::TinyBlob,
            "mediumblob" => Self::MediumBlob,
            "longblob" => Self::LongBlob,
            "float" => Self::Float,
            "double" => Self::Double,
            "decimal" => Self::Decimal,
            "boolean" => Self::Boolean,
            "enum" => Self::Enum,
            "set" => Self::Set,
            "json" => Self::Json,
            "jsonb" => Self::Jsonb,
            "date" => Self::Date,
            "datetime" => Self::DateTime,
            "datetimetz" => Self::DateTimeTz,
            "time" => Self::Time,
            "timetz" => Self::TimeTz,
            "timestamp" => Self::Timestamp,
            "timestamptz" => Self::TimestampTz,
            "year" => Self::Year,
            "binary" => Self::Binary,
            "uuid" => Self::Uuid,
            "ipaddress" => Self::IpAddress,
            "macaddress" => Self::MacAddress,
            "geometry" => Self::Geometry,
            "point" => Self::Point,
            "linestring" => Self::LineString,
            "polygon" => Self::Polygon,
            "geometrycollection" => Self::GeometryCollection,
            "multipoint" => Self::MultiPoint,
            "multilinestring" => Self::MultiLineString,
            "multipolygon" => Self::MultiPolygon,
            _ => {
                return Err(DbxError::InvalidValue(format!(
                    "unsupported column type '{name}'"
                )))
            }
        };
        Ok(data_type)
    }

    /// Integer family, the types that accept auto increment.
    #[must_use]
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            Self::TinyInt | Self::SmallInt | Self::MediumInt | Self::Int | Self::BigInt
        )
    }

    /// Geometry family.
    #[must_use]
    pub const fn is_geometry(self) -> bool {
        matches!(
            self,
            Self::Geometry
                | Self::Point
                | Self::LineString
                | Self::Polygon
                | Self::GeometryCollection
                | Self::MultiPoint
                | Self::MultiLineString
                | Self::MultiPolygon
                | Self::MultiPolygonZ
        )
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
