//! cellpack-mcp: battery pack sizing for cylindrical cells, as a library, a
//! CLI and an MCP server
//!
//! Given a target usable capacity and voltage, the specs of one cell and a
//! loss margin, the sizer works out how many cells to wire in series (S) and
//! in parallel (P).
//!
//! # Modules
//!
//! - [`pack`]: Sizing inputs, the two sizing modes and the text report
//! - [`schematic`]: ASCII rendering of an S×P layout
//! - [`config`]: Configuration loading and validation
//! - [`error`]: Configuration error types
//! - [`mcp`]: MCP protocol implementation

pub mod config;
pub mod error;
pub mod mcp;
pub mod pack;
pub mod schematic;

pub use error::ConfigError;
