use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::Level;

use sql_handler::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version, about = "Run statements through a single sql-handler connection")]
struct Args {
    /// Backend to use; MySQL reads its settings from the MYSQL_* environment variables
    #[arg(long, value_enum)]
    backend: Option<DatabaseType>,
    /// Database file for the sqlite backend
    #[arg(long, default_value = ":memory:")]
    sqlite_path: String,
    #[arg(short, long)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a statement as-is
    Query { sql: String },
    /// Run a prepared statement; `\N` binds NULL
    Prepared {
        sql: String,
        /// One type code per parameter (i, d, s, b); defaults to all strings
        #[arg(long)]
        types: Option<String>,
        params: Vec<String>,
    },
    /// Scrub a value for a column type
    Sanitize {
        value: String,
        #[arg(long = "type", default_value = "text")]
        type_name: String,
        #[arg(long)]
        strict: bool,
        #[arg(long)]
        keep_html: bool,
    },
    /// Dump the MySQL database into a directory with mysqldump
    Backup {
        directory: String,
        /// Print the planned invocation instead of running it
        #[arg(long)]
        dry_run: bool,
    },
}

/// First compiled-in backend, MySQL preferred.
fn default_backend() -> Option<DatabaseType> {
    let mut enabled = Vec::new();
    #[cfg(feature = "mysql")]
    enabled.push(DatabaseType::Mysql);
    #[cfg(feature = "sqlite")]
    enabled.push(DatabaseType::Sqlite);
    enabled.first().copied()
}

fn build_handler(args: &Args) -> Result<SqlHandler, SqlHandlerError> {
    match args.backend.or_else(default_backend) {
        #[cfg(feature = "mysql")]
        Some(DatabaseType::Mysql) => SqlHandler::from_env(),
        #[cfg(feature = "sqlite")]
        Some(DatabaseType::Sqlite) => Ok(SqlHandler::sqlite(SqliteOptions::new(
            args.sqlite_path.clone(),
        ))),
        #[allow(unreachable_patterns)]
        _ => Err(SqlHandlerError::Unimplemented(
            "no database backend is enabled in this build".to_string(),
        )),
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    let rendered = serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string());
    println!("{rendered}");
}

async fn run(args: Args) -> Result<(), SqlHandlerError> {
    match &args.command {
        Command::Sanitize {
            value,
            type_name,
            strict,
            keep_html,
        } => {
            let sanitizer = Sanitizer::new(
                if *strict {
                    NumericMode::Strict
                } else {
                    NumericMode::Lenient
                },
                if *keep_html {
                    HtmlPolicy::Keep
                } else {
                    HtmlPolicy::StripTags
                },
            );
            print_json(&sanitizer.sanitize(&RowValues::Text(value.clone()), type_name.as_str()));
            Ok(())
        }
        Command::Backup { directory, dry_run } => {
            let opts = MysqlOptions::from_env()?;
            if *dry_run {
                let plan = BackupPlan::new(&opts, directory, &chrono::Local::now());
                let args: Vec<String> = plan
                    .args
                    .iter()
                    .map(|a| {
                        if a.starts_with("--password=") {
                            "--password=***".to_string()
                        } else {
                            a.clone()
                        }
                    })
                    .collect();
                println!("{} {} > {}", plan.program, args.join(" "), plan.output.display());
                return Ok(());
            }
            let output = SqlHandler::mysql(opts).backup(directory).await?;
            println!("{}", output.display());
            Ok(())
        }
        Command::Query { sql } => {
            let handler = build_handler(&args)?;
            let outcome = handler.execute(sql).await;
            handler.close().await;
            print_json(&outcome?);
            Ok(())
        }
        Command::Prepared { sql, types, params } => {
            let handler = build_handler(&args)?;
            let values: Vec<RowValues> = params
                .iter()
                .map(|p| {
                    if p == "\\N" {
                        RowValues::Null
                    } else {
                        RowValues::Text(p.clone())
                    }
                })
                .collect();
            let outcome = handler
                .execute_prepared(sql, &values, types.as_deref())
                .await;
            handler.close().await;
            print_json(&outcome?);
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(if args.verbose {
            Level::DEBUG
        } else {
            Level::WARN
        })
        .init();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err @ SqlHandlerError::Connection { .. }) => {
            eprintln!("{err}");
            ExitCode::from(2)
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
