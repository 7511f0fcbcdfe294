//! quantum-teleport CLI
//!
//! Drives a shared teleportation session against the server: create or
//! look up a session, claim a role, advance through the protocol, and
//! watch updates live over the push channel.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use qt_client::commands;
use qt_core::config::{self, ClientConfig};
use qt_protocol::Role;

#[derive(Parser)]
#[command(name = "qt")]
#[command(author, version, about = "quantum-teleport session client")]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Server address as host:port (overrides config)
    #[arg(short, long, global = true)]
    server: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new session
    Create,

    /// Show a session's current state
    Fetch {
        /// Session id
        session: String,
    },

    /// Claim a role and print its reconnection token
    Join {
        /// Session id
        session: String,
        /// Role to claim (alice or bob)
        role: Role,
        /// Reuse a previously issued token instead of contending
        #[arg(short, long)]
        token: Option<String>,
    },

    /// Perform the current step
    Advance {
        /// Session id
        session: String,
        /// Token proving role ownership
        #[arg(short, long)]
        token: String,
    },

    /// Release a role and invalidate its token
    Leave {
        /// Session id
        session: String,
        /// Token proving role ownership
        #[arg(short, long)]
        token: String,
    },

    /// Join interactively and watch the session live
    Run {
        /// Session id
        session: String,
        /// Role to claim (alice or bob)
        role: Role,
        /// Reconnect with a previously issued token (no new join)
        #[arg(short, long)]
        token: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config = load_client_config(&cli)?;

    match cli.command {
        Commands::Create => commands::create_command(&config).await,
        Commands::Fetch { session } => commands::fetch_command(&config, &session).await,
        Commands::Join {
            session,
            role,
            token,
        } => commands::join_command(&config, &session, role, token.as_deref()).await,
        Commands::Advance { session, token } => {
            commands::advance_command(&config, &session, &token).await
        }
        Commands::Leave { session, token } => {
            commands::leave_command(&config, &session, &token).await
        }
        Commands::Run {
            session,
            role,
            token,
        } => commands::run_command(&config, &session, role, token).await,
    }
}

fn load_client_config(cli: &Cli) -> Result<ClientConfig> {
    if let Some(server) = &cli.server {
        return Ok(ClientConfig::for_server(server));
    }

    let config = if let Some(path) = &cli.config {
        config::load_config(path)?
    } else {
        let default_path = config::default_config_path();
        if default_path.exists() {
            config::load_config(&default_path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {:?}: {}", default_path, e);
                ClientConfig::default()
            })
        } else {
            ClientConfig::default()
        }
    };

    Ok(config)
}
