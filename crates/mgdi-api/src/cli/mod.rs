//! CLI command definitions for the `mgdi` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod keys;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Multimodal assistant backend: vector memory, system prompts and a chat proxy.
#[derive(Parser)]
#[command(name = "mgdi", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Detailed output (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export spans to stdout via OpenTelemetry.
    #[arg(long, global = true, env = "MGDI_OTEL")]
    pub otel: bool,

    /// Config file (defaults to `config.toml` in the data directory).
    #[arg(long, global = true, env = "MGDI_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server.
    Serve {
        /// Port to listen on (overrides `server.port`).
        #[arg(long)]
        port: Option<u16>,

        /// Host to bind to (overrides `server.host`).
        #[arg(long)]
        host: Option<String>,
    },

    /// Manage API keys.
    Keys {
        #[command(subcommand)]
        action: KeysAction,
    },
}

#[derive(Subcommand)]
pub enum KeysAction {
    /// Issue a new API key for a user. The key is printed once.
    Create {
        /// User id the key authenticates as.
        #[arg(long)]
        user: String,

        /// Label for the key.
        #[arg(long, default_value = "default")]
        name: String,
    },

    /// List issued keys (never their plaintext).
    #[command(alias = "ls")]
    List,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_serve_overrides() {
        let cli = Cli::try_parse_from(["mgdi", "-vv", "serve", "--port", "9000"]).unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Serve { port, host } => {
                assert_eq!(port, Some(9000));
                assert!(host.is_none());
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn parses_key_create_with_default_name() {
        let cli = Cli::try_parse_from(["mgdi", "keys", "create", "--user", "alice", "--json"])
            .unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Keys {
                action: KeysAction::Create { user, name },
            } => {
                assert_eq!(user, "alice");
                assert_eq!(name, "default");
            }
            _ => panic!("expected keys create"),
        }
    }

    #[test]
    fn key_create_requires_user() {
        assert!(Cli::try_parse_from(["mgdi", "keys", "create"]).is_err());
    }
}
