//! Statement script files.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use graphdump_core::MalformedRow;
use graphdump_manifest::ScriptDigest;

use crate::error::Result;

/// Header of the node script.
pub fn nodes_header() -> String {
    "// Node creation statements\n// Run this script against an empty database\n\n".to_string()
}

/// Header of the relationship script, naming the script to run first.
pub fn relationships_header(nodes_file: &str) -> String {
    format!("// Relationship creation statements\n// Run {nodes_file} first\n\n")
}

/// What one script ended up containing.
#[derive(Debug, Clone)]
pub struct ScriptSummary {
    pub path: PathBuf,
    pub statements: u64,
    pub malformed: u64,
    /// BLAKE3 hex digest of the written file.
    pub blake3: String,
}

impl ScriptSummary {
    pub fn digest(&self) -> ScriptDigest {
        ScriptDigest {
            file_name: self
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            statements: self.statements,
            malformed: self.malformed,
            blake3: self.blake3.clone(),
        }
    }
}

/// Writes one script: header first, then statements in order.
pub struct ScriptWriter {
    path: PathBuf,
    out: BufWriter<File>,
    statements: u64,
    malformed: u64,
}

impl ScriptWriter {
    /// Create (or truncate) the file and write its header.
    pub fn create(path: &Path, header: &str) -> Result<Self> {
        let mut out = BufWriter::new(File::create(path)?);
        out.write_all(header.as_bytes())?;
        Ok(Self {
            path: path.to_path_buf(),
            out,
            statements: 0,
            malformed: 0,
        })
    }

    pub fn write_statement(&mut self, statement: &str) -> Result<()> {
        self.out.write_all(statement.as_bytes())?;
        self.statements += 1;
        Ok(())
    }

    /// Leave a row out of the script, with a warning.
    pub fn skip(&mut self, row: &MalformedRow) {
        self.malformed += 1;
        tracing::warn!(
            file = %self.path.display(),
            line = %row.excerpt(),
            error = %row.error,
            "Skipping malformed row"
        );
    }

    /// Flush, close, and digest the file.
    pub fn finish(mut self) -> Result<ScriptSummary> {
        self.out.flush()?;
        drop(self.out);

        let blake3 = graphdump_manifest::hash::digest_file(&self.path)?;
        Ok(ScriptSummary {
            path: self.path,
            statements: self.statements,
            malformed: self.malformed,
            blake3,
        })
    }
}
