//! Error types for the graphdump-export crate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to launch query client {program}: {reason}")]
    ClientLaunch { program: String, reason: String },

    #[error("Graph error: {0}")]
    Graph(#[from] graphdump_graph::GraphError),

    #[error("Manifest error: {0}")]
    Manifest(#[from] graphdump_manifest::store::StoreError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ExportError>;
