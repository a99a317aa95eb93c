//! Clickpath CLI — httpd 액세스 로그 파싱/시나리오 집계 명령줄 도구

use std::path::Path;

use clap::Parser;

mod cli;
mod commands;
mod error;
mod logging;
mod output;
mod pipeline;

use cli::{Cli, Commands, OutputFormat};
use error::CliError;

use clickpath_core::config::ClickpathConfig;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = load_config(&cli.config).await?;

    // CLI 인자가 설정 파일보다 우선
    if let Some(level) = &cli.log_level {
        config.general.log_level = level.clone();
    }
    config.validate()?;

    logging::init_tracing(&config.general)
        .map_err(|e| CliError::Command(e.to_string()))?;
    clickpath_core::metrics::describe_all();

    let output_format = cli.output.unwrap_or(match config.output.format.as_str() {
        "json" => OutputFormat::Json,
        _ => OutputFormat::Csv,
    });

    match cli.command {
        Commands::Parse(args) => commands::parse::execute(args, output_format, &config).await,
        Commands::Scenarios(args) => {
            commands::scenarios::execute(args, output_format, &config).await
        }
        Commands::Config(args) => {
            commands::config::execute(args, &cli.config, output_format).await
        }
    }
}

/// 설정을 로드합니다.
///
/// 기본 경로의 파일이 없으면 기본값 + 환경변수 오버라이드로 동작합니다 —
/// 설정 파일 없이도 `clickpath parse access.log`가 바로 동작해야 합니다.
/// 명시적으로 지정한 파일이 없으면 에러입니다.
async fn load_config(path: &Path) -> Result<ClickpathConfig, CliError> {
    if path.exists() {
        return Ok(ClickpathConfig::load(path).await?);
    }

    if path == Path::new("clickpath.toml") {
        let mut config = ClickpathConfig::default();
        config.apply_env_overrides();
        return Ok(config);
    }

    Err(CliError::Config(format!(
        "config file not found: {}",
        path.display()
    )))
}
