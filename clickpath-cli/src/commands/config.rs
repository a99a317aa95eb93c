//! `clickpath config` command handler

use std::path::Path;

use serde::Serialize;
use tracing::info;

use clickpath_core::config::ClickpathConfig;

use crate::cli::{ConfigAction, ConfigArgs, OutputFormat};
use crate::error::CliError;

/// Execute the `config` command.
pub async fn execute(
    args: ConfigArgs,
    config_path: &Path,
    output_format: OutputFormat,
) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Init { force } => execute_init(config_path, force).await,
        ConfigAction::Check => execute_check(config_path, output_format).await,
    }
}

/// Write a default clickpath.toml to the configured path.
async fn execute_init(config_path: &Path, force: bool) -> Result<(), CliError> {
    if config_path.exists() && !force {
        return Err(CliError::Command(format!(
            "{} already exists, pass --force to overwrite",
            config_path.display()
        )));
    }

    let config = ClickpathConfig::default();
    let toml = toml::to_string_pretty(&config)
        .map_err(|e| CliError::Command(format!("failed to serialize default config: {e}")))?;
    tokio::fs::write(config_path, toml).await?;

    info!(path = %config_path.display(), "wrote default configuration");
    println!("wrote {}", config_path.display());
    Ok(())
}

/// Validation report for `config check`.
#[derive(Debug, Serialize)]
struct ConfigCheckReport {
    source: String,
    valid: bool,
    errors: Vec<String>,
}

/// Load and validate the configuration file, reporting any errors.
async fn execute_check(config_path: &Path, output_format: OutputFormat) -> Result<(), CliError> {
    info!(path = %config_path.display(), "validating configuration");

    let report = match ClickpathConfig::load(config_path).await {
        Ok(_) => ConfigCheckReport {
            source: config_path.display().to_string(),
            valid: true,
            errors: Vec::new(),
        },
        Err(e) => ConfigCheckReport {
            source: config_path.display().to_string(),
            valid: false,
            errors: vec![e.to_string()],
        },
    };

    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Csv => {
            println!("source: {}", report.source);
            println!("valid: {}", report.valid);
            for error in &report.errors {
                println!("error: {error}");
            }
        }
    }

    if !report.valid {
        return Err(CliError::Config("configuration is invalid".to_owned()));
    }

    Ok(())
}
