//! Record sources: the command-line client or the Bolt driver.
//!
//! Both yield the same records so serialization and file writing are
//! shared. A source reports rows it recognised but could not parse as
//! [`MalformedRow`]s; rows that are not data at all are dropped here.

use graphdump_core::{MalformedRow, NodeRecord, RelationshipRecord, SourceKind};
use graphdump_graph::queries::{
    relationships_query, COUNT_NODES_QUERY, COUNT_RELATIONSHIPS_QUERY, NODES_QUERY,
};
use graphdump_graph::{Fetched, GraphClient};

use crate::error::Result;
use crate::plain;
use crate::shell::CypherShell;

/// Where records come from.
#[allow(async_fn_in_trait)]
pub trait RecordSource {
    fn kind(&self) -> SourceKind;

    /// Node count as reported by the source, for display.
    async fn node_count(&self) -> Result<String>;

    /// Relationship count as reported by the source, for display.
    async fn relationship_count(&self) -> Result<String>;

    async fn nodes(&self) -> Result<Vec<Fetched<NodeRecord>>>;

    async fn relationships(&self) -> Result<Vec<Fetched<RelationshipRecord>>>;
}

// ── Command-line client ──────────────────────────────────────────

/// Scrapes the plain-text output of the command-line client.
pub struct ShellSource {
    shell: CypherShell,
    identity: String,
}

impl ShellSource {
    pub fn new(shell: CypherShell, identity: &str) -> Self {
        Self {
            shell,
            identity: identity.to_string(),
        }
    }
}

impl RecordSource for ShellSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Shell
    }

    async fn node_count(&self) -> Result<String> {
        let output = self.shell.run(COUNT_NODES_QUERY).await?;
        Ok(plain::last_line(&output).to_string())
    }

    async fn relationship_count(&self) -> Result<String> {
        let output = self.shell.run(COUNT_RELATIONSHIPS_QUERY).await?;
        Ok(plain::last_line(&output).to_string())
    }

    async fn nodes(&self) -> Result<Vec<Fetched<NodeRecord>>> {
        let output = self.shell.run(NODES_QUERY).await?;
        Ok(scrape(&output, plain::parse_node_line))
    }

    async fn relationships(&self) -> Result<Vec<Fetched<RelationshipRecord>>> {
        let output = self.shell.run(&relationships_query(&self.identity)).await?;
        Ok(scrape(&output, plain::parse_relationship_line))
    }
}

/// Parse every data line of a result with `parse`.
fn scrape<T, F>(output: &str, parse: F) -> Vec<Fetched<T>>
where
    F: Fn(&str) -> std::result::Result<Option<T>, graphdump_core::RecordError>,
{
    let mut rows = Vec::new();
    for line in plain::data_lines(output) {
        match parse(line) {
            Ok(Some(record)) => rows.push(Ok(record)),
            Ok(None) => tracing::trace!(line, "Skipping non-data line"),
            Err(error) => rows.push(Err(MalformedRow::new(line, error))),
        }
    }
    rows
}

// ── Bolt driver ──────────────────────────────────────────────────

/// Reads row objects through the Neo4j driver.
pub struct BoltSource {
    client: GraphClient,
    identity: String,
}

impl BoltSource {
    pub fn new(client: GraphClient, identity: &str) -> Self {
        Self {
            client,
            identity: identity.to_string(),
        }
    }
}

impl RecordSource for BoltSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Bolt
    }

    async fn node_count(&self) -> Result<String> {
        Ok(self.client.count_nodes().await?.to_string())
    }

    async fn relationship_count(&self) -> Result<String> {
        Ok(self.client.count_relationships().await?.to_string())
    }

    async fn nodes(&self) -> Result<Vec<Fetched<NodeRecord>>> {
        Ok(self.client.fetch_nodes().await?)
    }

    async fn relationships(&self) -> Result<Vec<Fetched<RelationshipRecord>>> {
        Ok(self.client.fetch_relationships(&self.identity).await?)
    }
}
