use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI configuration parsed from command line arguments and environment variables
#[derive(Parser, Debug)]
#[command(name = "avniconf")]
#[command(
    author,
    version,
    about = "Reconcile declarative configuration against an Avni server"
)]
#[command(after_help = "Examples:
  avniconf apply config.json
  avniconf apply config.json --format json > summary.json
  avniconf resolve config.json")]
pub struct Config {
    /// Base URL of the Avni server
    #[arg(long, env = "AVNI_BASE_URL")]
    pub base_url: Option<String>,

    /// Auth token sent with every request
    #[arg(long, env = "AVNI_AUTH_TOKEN", hide_env_values = true)]
    pub auth_token: Option<String>,

    /// User name sent with every request
    #[arg(long, env = "AVNI_USER_NAME")]
    pub user_name: Option<String>,

    /// Organisation (implementation) name
    #[arg(long, env = "AVNI_ORG_NAME")]
    pub org_name: Option<String>,

    /// Organisation type; Production and UAT are refused
    #[arg(long, env = "AVNI_ORG_TYPE")]
    pub org_type: Option<String>,

    /// Custom path to settings.toml
    #[arg(long, value_name = "PATH", global = true)]
    pub settings: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create every missing entity declared in a configuration file
    #[command(after_help = "Examples:
  avniconf apply config.json
  avniconf apply config.json --skip-existence-check")]
    Apply {
        /// Configuration document (JSON)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format for the run summary
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Create without looking entities up first
        #[arg(long)]
        skip_existence_check: bool,
    },
    /// Show the parent assigned to each location, without contacting the server
    Resolve {
        /// Configuration document (JSON)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format for the resolved hierarchy
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report
    Text,
    /// Pretty-printed JSON
    Json,
}
