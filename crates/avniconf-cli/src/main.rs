use std::path::Path;
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::Parser;
use dotenvy::dotenv;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use avniconf_cli::{render_resolution, render_text, Command, Config, OutputFormat};
use avniconf_client::AvniClient;
use avniconf_core::{load_settings, resolve_hierarchy, ConfigDocument, ConfigOrchestrator, RunResult};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Load environment variables from .env file
    dotenv().ok();

    // Parse command line arguments
    let config = Config::parse();

    // Setup logging (stderr to keep stdout clean for reports)
    let level = if config.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    match &config.command {
        Command::Apply {
            file,
            format,
            skip_existence_check,
        } => apply(&config, file, *format, *skip_existence_check).await,
        Command::Resolve { file, format } => resolve(file, *format),
    }
}

/// Reconcile a configuration file against the server
async fn apply(
    config: &Config,
    file: &Path,
    format: OutputFormat,
    skip_existence_check: bool,
) -> anyhow::Result<ExitCode> {
    let settings = load_settings(config.settings.as_deref())?;

    let Some(base_url) = config
        .base_url
        .clone()
        .or_else(|| settings.server.base_url.clone())
    else {
        bail!("No server configured: pass --base-url, set AVNI_BASE_URL, or add server.base_url to settings.toml");
    };
    let Some(auth_token) = config.auth_token.clone() else {
        bail!("No auth token: pass --auth-token or set AVNI_AUTH_TOKEN");
    };

    let user_name = config
        .user_name
        .clone()
        .or_else(|| settings.server.user_name.clone());
    let org_name = config
        .org_name
        .clone()
        .or_else(|| settings.server.org_name.clone());
    let org_type = config
        .org_type
        .clone()
        .or_else(|| settings.server.org_type.clone());

    let mut reconcile = settings.reconcile_config();
    if skip_existence_check {
        reconcile.require_existence_check = false;
    }

    let client = AvniClient::new(&base_url, auth_token)
        .context("Invalid Avni server URL")?
        .with_config(settings.http_config())
        .with_user_name(user_name)
        .with_org_name(org_name)
        .with_name_match(reconcile.name_match);

    let document = read_document(file)?;

    let orchestrator = ConfigOrchestrator::new(client)
        .with_config(reconcile)
        .with_org_type(org_type);

    // Ctrl-C stops the run between entities
    let cancel: CancellationToken = orchestrator.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping after the current entity...");
            cancel.cancel();
        }
    });

    info!("Applying {} to {}", file.display(), base_url);
    let summary = orchestrator.run_value(&document).await;

    match format {
        OutputFormat::Text => print!("{}", render_text(&summary)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
    }

    Ok(match summary.result {
        RunResult::Success | RunResult::PartialSuccess if !summary.cancelled => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    })
}

/// Show the resolved location hierarchy without contacting the server
fn resolve(file: &Path, format: OutputFormat) -> anyhow::Result<ExitCode> {
    let document = ConfigDocument::from_value(&read_document(file)?)?;
    let resolution = resolve_hierarchy(document.locations);

    match format {
        OutputFormat::Text => print!("{}", render_resolution(&resolution)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&resolution)?),
    }

    Ok(ExitCode::SUCCESS)
}

fn read_document(file: &Path) -> anyhow::Result<Value> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("{} is not valid JSON", file.display()))
}
