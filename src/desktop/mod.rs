//! Desktop companion: keeps the dashboard server running in the background, remembers
//! the user's data folder, and registers the stdio MCP server with the agent.
//!
//! The dashboard runs as a separate OS process (`contextbuddy web`); the only links are
//! the `CONTEXTBUDDY_DATA_PATH` environment variable and the shared JSON files.

pub mod agent;
pub mod settings;
pub mod shell;
pub mod supervisor;

pub use supervisor::{ServerState, ServerSupervisor};
