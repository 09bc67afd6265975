//! MCP server over stdio.
//!
//! The agent launches `contextbuddy serve` as a child process and speaks JSON-RPC over
//! its stdin/stdout. The same tool handler is also mounted on the dashboard server at
//! `/mcp` (see [`crate::web`]).

use crate::config::AppConfig;
use crate::storage::Store;
use crate::tools::ContextTools;
use anyhow::Result;
use rmcp::ServiceExt;

/// Start the MCP server over stdio transport.
pub async fn serve_stdio(config: AppConfig) -> Result<()> {
    let data_dir = config.resolved_data_dir();
    tracing::info!(data = %data_dir.display(), "starting ContextBuddy MCP server on stdio");

    let tools = ContextTools::new(Store::new(data_dir));
    let transport = rmcp::transport::stdio();

    let server = tools.serve(transport).await?;
    tracing::info!("MCP server running, waiting for client");

    server.waiting().await?;
    tracing::info!("MCP server shut down");

    Ok(())
}
