//! dbx CLI
//!
//! Inspect a SQLite database through the dbx catalog loaders and render its
//! tables as DDL for any supported dialect.

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use dbx_core::schema::{IndexOption, TableConstraints};
use dbx_core::{Index, IndexType, SchemaDialect, Session, Sqlite, Table};
use dbx_sqlite::SqliteExecutor;

/// Schema inspection for SQLite databases.
#[derive(Parser)]
#[command(name = "dbx")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database URL.
    #[arg(short, long, env = "DATABASE_URL", default_value = "sqlite:dbx.db")]
    database_url: String,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report whether a table exists.
    Exists {
        /// Table name.
        table: String,
    },

    /// List tables.
    Tables,

    /// Show the columns of a table.
    Describe {
        /// Table name.
        table: String,

        /// Print JSON instead of a listing.
        #[arg(long)]
        json: bool,
    },

    /// Show the keys and constraints of a table.
    Constraints {
        /// Table name.
        table: String,

        /// Print JSON instead of a listing.
        #[arg(long)]
        json: bool,
    },

    /// Print CREATE statements for a table in another dialect.
    Ddl {
        /// Table name.
        table: String,

        /// Target dialect.
        #[arg(long, value_enum, default_value_t = Target::Sqlite)]
        dialect: Target,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Target {
    Mysql,
    Postgres,
    Sqlite,
}

impl Target {
    fn dialect(self) -> &'static dyn SchemaDialect {
        match self {
            Self::Mysql => &dbx_core::MySql,
            Self::Postgres => &dbx_core::Postgres,
            Self::Sqlite => &dbx_core::Sqlite,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let executor = SqliteExecutor::connect(&cli.database_url)?;
    let session = Session::new(&Sqlite, &executor);

    match cli.command {
        Commands::Exists { table } => {
            let exists = session.table_exists(&table, None)?;
            println!("{}", if exists { "yes" } else { "no" });
            if !exists {
                std::process::exit(1);
            }
        }

        Commands::Tables => {
            for name in session.get_all_tables(&[])? {
                println!("{name}");
            }
        }

        Commands::Describe { table, json } => {
            let table = session.get_table(&table, None)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&table)?);
            } else {
                print_columns(&table);
            }
        }

        Commands::Constraints { table, json } => {
            let constraints = session.get_table_constraints(&table, None)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&constraints)?);
            } else {
                print_constraints(&constraints);
            }
        }

        Commands::Ddl { table, dialect } => {
            let mut loaded = session.get_table(&table, None)?;
            let constraints = session.get_table_constraints(&table, None)?;
            info!(table = %loaded.name, "rendering DDL");
            for sql in render_ddl(&mut loaded, &constraints, dialect.dialect())? {
                println!("{sql}");
            }
        }
    }

    Ok(())
}

fn print_columns(table: &Table) {
    println!("{:<24} {:<12} {:<8} {:<16} KEY", "COLUMN", "TYPE", "NULL", "DEFAULT");
    for column in &table.columns {
        let default = column
            .default
            .as_ref()
            .and_then(dbx_core::DefaultValue::literal_text)
            .or_else(|| column.use_current.then(|| String::from("CURRENT_TIMESTAMP")))
            .unwrap_or_default();
        let key = match (column.primary_key, column.auto_increment) {
            (true, true) => "PK AI",
            (true, false) => "PK",
            _ => "",
        };
        println!(
            "{:<24} {:<12} {:<8} {:<16} {key}",
            column.name,
            column.data_type.as_str(),
            if column.nullable { "yes" } else { "no" },
            default
        );
        if !column.allowed_values.is_empty() {
            println!("{:<24} values: {}", "", column.allowed_values.join(", "));
        }
    }
}

fn print_constraints(constraints: &TableConstraints) {
    if let Some(key) = &constraints.primary_key {
        println!("PRIMARY KEY ({})", key.columns.join(", "));
    }
    for unique in &constraints.uniques {
        println!("UNIQUE {} ({})", unique.name, unique.columns.join(", "));
    }
    for key in &constraints.foreign_keys {
        println!(
            "FOREIGN KEY {} ({}) REFERENCES {} ({}) ON UPDATE {} ON DELETE {}",
            key.name,
            key.columns.join(", "),
            key.foreign_table,
            key.foreign_columns.join(", "),
            key.on_update,
            key.on_delete
        );
    }
    for check in &constraints.checks {
        println!("CHECK {} {}", check.name, check.expression);
    }
}

/// Re-declares a loaded table and renders it for `dialect`.
fn render_ddl(
    table: &mut Table,
    constraints: &TableConstraints,
    dialect: &dyn SchemaDialect,
) -> anyhow::Result<Vec<String>> {
    table.added = true;
    for column in &mut table.columns {
        column.added = true;
        column.snapshot = None;
    }

    let mut statements = vec![dialect.compile_create(table)?];
    for unique in &constraints.uniques {
        let index = Index::new(
            IndexType::Unique,
            &unique.columns,
            [IndexOption::Name(unique.name.clone())],
        );
        statements.push(dialect.compile_index(table, &index)?);
    }
    Ok(statements)
}
