//! Command-line query client wrapper.
//!
//! Runs `cypher-shell` (through `docker exec` by default) as a child
//! process via `tokio::process::Command` and returns its plain-text
//! output.

use std::time::Instant;

use tokio::process::Command;

use crate::config::{Neo4jSettings, ShellSettings};
use crate::error::{ExportError, Result};

/// Wrapper around the command-line client.
pub struct CypherShell {
    program: String,
    args: Vec<String>,
    user: String,
    password: String,
}

impl CypherShell {
    pub fn new(shell: &ShellSettings, neo4j: &Neo4jSettings) -> Self {
        Self {
            program: shell.program.clone(),
            args: shell.args.clone(),
            user: neo4j.user.clone(),
            password: neo4j.password.clone(),
        }
    }

    /// Arguments passed after the configured prefix, password included.
    fn query_args<'a>(&'a self, query: &'a str) -> [&'a str; 7] {
        [
            "-u",
            self.user.as_str(),
            "-p",
            self.password.as_str(),
            "--format",
            "plain",
            query,
        ]
    }

    /// Run one query and return the client's stdout.
    ///
    /// A non-zero exit status is logged and otherwise ignored: whatever
    /// the client printed is returned and parsed like any other result.
    /// Only a failure to start the process is an error.
    pub async fn run(&self, query: &str) -> Result<String> {
        let start = Instant::now();

        let output = Command::new(&self.program)
            .args(&self.args)
            .args(self.query_args(query))
            .output()
            .await
            .map_err(|e| ExportError::ClientLaunch {
                program: self.program.clone(),
                reason: e.to_string(),
            })?;

        let duration = start.elapsed();

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::warn!(
                program = %self.program,
                code = output.status.code().unwrap_or(-1),
                stderr = %stderr.trim(),
                "Query client exited with failure"
            );
        }

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();

        tracing::debug!(
            program = %self.program,
            bytes = stdout.len(),
            duration_ms = duration.as_millis(),
            "Query client finished"
        );

        Ok(stdout)
    }
}
