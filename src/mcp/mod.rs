//! MCP server
//!
//! Exposes the SnapCal tools over the Model Context Protocol.

pub mod server;

pub use server::SnapCalService;
