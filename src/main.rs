mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use contextbuddy::config::AppConfig;
use contextbuddy::storage::types::NoteType;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "contextbuddy", version, about = "Work-context memory for AI agents")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the MCP server (stdio transport)
    Serve,
    /// Start the dashboard HTTP server
    Web {
        /// Port to listen on (overrides config and CONTEXTBUDDY_PORT)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Capture filter hook: reads {"prompt": ...} on stdin, prints a capture tag or nothing
    Hook,
    /// Run the desktop shell (supervises the dashboard server)
    Shell,
    /// Search notes from the terminal
    Search {
        /// Case-insensitive text to look for in content and tags
        query: String,
        #[arg(long)]
        team: Option<String>,
        #[arg(long)]
        project: Option<String>,
        /// Note type: decision, note, action, idea, question
        #[arg(long = "type")]
        note_type: Option<NoteType>,
    },
    /// Export every collection as one JSON document
    Export {
        /// Write to this file instead of stdout
        #[arg(long, short)]
        output: Option<std::path::PathBuf>,
    },
    /// Check which documents exist and parse in the data folder
    Doctor,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // The hook must print one line or nothing and never fail the caller, so it runs
    // before logging is set up.
    if let Command::Hook = cli.command {
        cli::hook::run();
        return Ok(());
    }

    let mut config = AppConfig::load()?;

    // Log to stderr so stdout stays clean for MCP JSON-RPC.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve => {
            contextbuddy::server::serve_stdio(config).await?;
        }
        Command::Web { port } => {
            if let Some(port) = port {
                config.web.port = port;
            }
            contextbuddy::web::serve(config).await?;
        }
        Command::Hook => {}
        Command::Shell => {
            contextbuddy::desktop::shell::run(config).await?;
        }
        Command::Search {
            query,
            team,
            project,
            note_type,
        } => {
            cli::search::search(
                &config,
                cli::search::Filters {
                    query,
                    team,
                    project,
                    note_type,
                },
            )?;
        }
        Command::Export { output } => {
            cli::export::export(&config, output.as_deref())?;
        }
        Command::Doctor => {
            cli::doctor::doctor(&config)?;
        }
    }

    Ok(())
}
