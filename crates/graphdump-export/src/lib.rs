//! graphdump-export: Dump a running Neo4j database as Cypher replay scripts.
//!
//! Reads every node and relationship (through the `cypher-shell` client or
//! the Bolt driver), renders them as CREATE statements in two scripts, and
//! records a hashed manifest of each run.

pub mod config;
pub mod cypher;
pub mod error;
pub mod export;
pub mod manifest;
pub mod plain;
pub mod report;
pub mod script;
pub mod shell;
pub mod source;
