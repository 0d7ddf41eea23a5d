//! Configuration for the graphdump exporter.
//!
//! Loaded from an optional `graphdump.toml` and `GRAPHDUMP__` environment
//! variables. Every key has a default, so an empty configuration runs
//! the export against a `neo4j` container exactly as the tool always has.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use graphdump_core::SourceKind;
use graphdump_graph::GraphConfig;

use crate::error::{ExportError, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Console log format.
    #[serde(default)]
    pub log_format: LogFormat,

    #[serde(default)]
    pub export: ExportSettings,

    #[serde(default)]
    pub shell: ShellSettings,

    #[serde(default)]
    pub neo4j: Neo4jSettings,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Where and how the statement scripts are written.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportSettings {
    /// Output directory, created if missing.
    #[serde(default = "default_dir")]
    pub dir: PathBuf,

    #[serde(default = "default_nodes_file")]
    pub nodes_file: String,

    #[serde(default = "default_relationships_file")]
    pub relationships_file: String,

    /// Node property used to match relationship endpoints on replay.
    #[serde(default = "default_identity_property")]
    pub identity_property: String,

    /// Which source records are read from.
    #[serde(default)]
    pub source: SourceKind,

    /// Record a hashed manifest of every run.
    #[serde(default = "default_true")]
    pub write_manifest: bool,
}

impl ExportSettings {
    pub fn nodes_path(&self) -> PathBuf {
        self.dir.join(&self.nodes_file)
    }

    pub fn relationships_path(&self) -> PathBuf {
        self.dir.join(&self.relationships_file)
    }

    pub fn manifest_dir(&self) -> PathBuf {
        self.dir.join("manifests")
    }
}

/// The command-line client invocation.
///
/// The client is run as `program args... -u <user> -p <password>
/// --format plain <query>`.
#[derive(Debug, Clone, Deserialize)]
pub struct ShellSettings {
    #[serde(default = "default_program")]
    pub program: String,

    #[serde(default = "default_args")]
    pub args: Vec<String>,
}

/// Credentials shared by both sources; `uri` is only used over Bolt.
#[derive(Debug, Clone, Deserialize)]
pub struct Neo4jSettings {
    #[serde(default = "default_uri")]
    pub uri: String,

    #[serde(default = "default_user")]
    pub user: String,

    #[serde(default = "default_password")]
    pub password: String,
}

impl Neo4jSettings {
    pub fn graph_config(&self) -> GraphConfig {
        GraphConfig {
            uri: self.uri.clone(),
            user: self.user.clone(),
            password: self.password.clone(),
            ..Default::default()
        }
    }
}

fn default_dir() -> PathBuf {
    PathBuf::from("neo4j_export")
}

fn default_nodes_file() -> String {
    "01_nodes.cypher".to_string()
}

fn default_relationships_file() -> String {
    "02_relationships.cypher".to_string()
}

fn default_identity_property() -> String {
    "iri".to_string()
}

fn default_true() -> bool {
    true
}

fn default_program() -> String {
    "docker".to_string()
}

fn default_args() -> Vec<String> {
    vec!["exec".into(), "neo4j".into(), "cypher-shell".into()]
}

fn default_uri() -> String {
    "bolt://localhost:7687".to_string()
}

fn default_user() -> String {
    "neo4j".to_string()
}

fn default_password() -> String {
    "neo4j_test_pass".to_string()
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            dir: default_dir(),
            nodes_file: default_nodes_file(),
            relationships_file: default_relationships_file(),
            identity_property: default_identity_property(),
            source: SourceKind::default(),
            write_manifest: default_true(),
        }
    }
}

impl Default for ShellSettings {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_args(),
        }
    }
}

impl Default for Neo4jSettings {
    fn default() -> Self {
        Self {
            uri: default_uri(),
            user: default_user(),
            password: default_password(),
        }
    }
}

impl AppConfig {
    /// Load from `<file_prefix>.toml` (optional) and `GRAPHDUMP__*` variables.
    pub fn load(file_prefix: &str) -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name(file_prefix).required(false))
            .add_source(
                config::Environment::with_prefix("GRAPHDUMP")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(" ")
                    .with_list_parse_key("shell.args")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ExportError::Config(e.to_string()))?;

        let app: AppConfig = cfg
            .try_deserialize()
            .map_err(|e| ExportError::Config(e.to_string()))?;
        app.validate()?;
        Ok(app)
    }

    /// Load from an explicit file, ignoring the environment.
    pub fn from_file(path: &Path) -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::File::from(path))
            .build()
            .map_err(|e| ExportError::Config(e.to_string()))?;

        let app: AppConfig = cfg
            .try_deserialize()
            .map_err(|e| ExportError::Config(e.to_string()))?;
        app.validate()?;
        Ok(app)
    }

    /// Reject values that would produce broken statements.
    pub fn validate(&self) -> Result<()> {
        if !graphdump_core::is_identifier(&self.export.identity_property) {
            return Err(ExportError::Config(format!(
                "export.identity_property must be a plain identifier, got {:?}",
                self.export.identity_property
            )));
        }
        if self.export.nodes_file == self.export.relationships_file {
            return Err(ExportError::Config(
                "export.nodes_file and export.relationships_file must differ".to_string(),
            ));
        }
        if self.shell.program.is_empty() {
            return Err(ExportError::Config("shell.program is empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.export.dir, PathBuf::from("neo4j_export"));
        assert_eq!(config.export.nodes_file, "01_nodes.cypher");
        assert_eq!(config.export.relationships_file, "02_relationships.cypher");
        assert_eq!(config.export.identity_property, "iri");
        assert_eq!(config.export.source, SourceKind::Shell);
        assert!(config.export.write_manifest);
        assert_eq!(config.shell.program, "docker");
        assert_eq!(config.shell.args, vec!["exec", "neo4j", "cypher-shell"]);
        assert_eq!(config.neo4j.user, "neo4j");
        assert_eq!(config.neo4j.password, "neo4j_test_pass");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_paths_join_export_dir() {
        let settings = ExportSettings {
            dir: PathBuf::from("/tmp/out"),
            ..Default::default()
        };
        assert_eq!(settings.nodes_path(), PathBuf::from("/tmp/out/01_nodes.cypher"));
        assert_eq!(
            settings.relationships_path(),
            PathBuf::from("/tmp/out/02_relationships.cypher")
        );
        assert_eq!(settings.manifest_dir(), PathBuf::from("/tmp/out/manifests"));
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graphdump.toml");
        std::fs::write(
            &path,
            r#"
log_format = "json"

[export]
dir = "/var/dump"
source = "bolt"
write_manifest = false

[shell]
program = "cypher-shell"
args = []

[neo4j]
password = "secret"
"#,
        )
        .unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.export.dir, PathBuf::from("/var/dump"));
        assert_eq!(config.export.source, SourceKind::Bolt);
        assert!(!config.export.write_manifest);
        assert_eq!(config.export.identity_property, "iri");
        assert_eq!(config.shell.program, "cypher-shell");
        assert!(config.shell.args.is_empty());
        assert_eq!(config.neo4j.password, "secret");
        assert_eq!(config.neo4j.user, "neo4j");
    }

    #[test]
    fn test_invalid_identity_property_rejected() {
        let mut config = AppConfig::default();
        config.export.identity_property = "iri}) DETACH DELETE (n".to_string();
        assert!(matches!(config.validate(), Err(ExportError::Config(_))));
    }

    #[test]
    fn test_same_file_names_rejected() {
        let mut config = AppConfig::default();
        config.export.relationships_file = config.export.nodes_file.clone();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_graph_config_carries_credentials() {
        let settings = Neo4jSettings::default();
        let graph = settings.graph_config();
        assert_eq!(graph.uri, "bolt://localhost:7687");
        assert_eq!(graph.password, "neo4j_test_pass");
    }
}
