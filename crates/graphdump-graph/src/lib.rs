//! graphdump-graph: Neo4j driver access for the structured export source.
//!
//! Reads nodes and relationships as row objects over Bolt instead of
//! scraping the command-line client's rendered tables.

pub mod client;
pub mod queries;

pub use client::{GraphClient, GraphConfig, GraphError};
pub use queries::Fetched;
