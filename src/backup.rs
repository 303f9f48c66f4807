//! `mysqldump` invocation planning.

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use chrono::{DateTime, TimeZone};

use crate::config::MysqlOptions;
use crate::error::SqlHandlerError;

/// Dump tool looked up on `PATH`.
pub const DUMP_PROGRAM: &str = "mysqldump";

/// A fully resolved dump: program, arguments, and the file stdout is written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupPlan {
    pub program: String,
    pub args: Vec<String>,
    pub output: PathBuf,
}

impl BackupPlan {
    /// Plan a consistent single-transaction dump (routines and triggers included) of
    /// `opts.database` into `<directory>/<database>-<YYYY-MM-DD>_<unix-seconds>.sql`.
    ///
    /// Trailing slashes on `directory` are dropped. The same inputs always produce the
    /// same plan.
    #[must_use]
    pub fn new<Tz>(opts: &MysqlOptions, directory: &str, now: &DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let mut args = vec![
            format!("--user={}", opts.username),
            format!("--password={}", opts.password),
        ];
        match (&opts.socket, &opts.host) {
            (Some(socket), _) => args.push(format!("--socket={socket}")),
            (None, Some(host)) => {
                args.push(format!("--host={host}"));
                if let Some(port) = opts.port {
                    args.push(format!("--port={port}"));
                }
            }
            (None, None) => {
                if let Some(port) = opts.port {
                    args.push(format!("--port={port}"));
                }
            }
        }
        args.extend(
            ["--single-transaction", "--routines", "--triggers"]
                .iter()
                .map(|flag| (*flag).to_string()),
        );
        args.push(opts.database.clone());

        let output = PathBuf::from(format!(
            "{}/{}-{}_{}.sql",
            directory.trim_end_matches('/'),
            opts.database,
            now.format("%Y-%m-%d"),
            now.timestamp()
        ));

        Self {
            program: DUMP_PROGRAM.to_string(),
            args,
            output,
        }
    }

    #[must_use]
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Run the dump, streaming its stdout into [`BackupPlan::output`]. No shell is involved.
    ///
    /// # Errors
    /// Returns `SqlHandlerError::Io` if the file cannot be created or the tool cannot be
    /// spawned, and `SqlHandlerError::Backup` if the tool exits unsuccessfully.
    pub async fn run(&self) -> Result<PathBuf, SqlHandlerError> {
        let file = tokio::fs::File::create(&self.output).await?.into_std().await;
        tracing::debug!(program = %self.program, output = %self.output.display(), "starting dump");
        let outcome = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .stdout(Stdio::from(file))
            .stderr(Stdio::piped())
            .output()
            .await?;
        if !outcome.status.success() {
            let stderr = String::from_utf8_lossy(&outcome.stderr);
            return Err(SqlHandlerError::Backup(format!(
                "{} exited with {}: {}",
                self.program,
                outcome.status,
                stderr.trim()
            )));
        }
        Ok(self.output.clone())
    }
}
