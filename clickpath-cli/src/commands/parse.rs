//! `clickpath parse` command handler

use tracing::info;

use clickpath_access_log::{LineParser, LogFormat, OverflowPolicy};
use clickpath_core::config::ClickpathConfig;

use crate::cli::{OutputFormat, ParseArgs};
use crate::error::CliError;
use crate::output::OutputWriter;
use crate::pipeline::{self, PipelineOptions};

/// Execute the `parse` command.
///
/// Reads the input line by line, parses each line with the configured
/// log format, and writes one row per HTTP request event. Parsing faults
/// become rows too unless suppressed.
pub async fn execute(
    args: ParseArgs,
    output_format: OutputFormat,
    config: &ClickpathConfig,
) -> Result<(), CliError> {
    let parser = build_parser(args.format.as_deref(), config)?;
    info!(
        input = %args.input.display(),
        format = parser.format().name(),
        "parsing access log"
    );

    let options = PipelineOptions {
        channel_capacity: config.access_log.channel_capacity,
        suppress_faults: args.quiet_faults || config.output.suppress_faults,
        session_cookie: config.scenario.session_cookie.clone(),
    };

    let mut writer = OutputWriter::stdout(output_format);
    let report = pipeline::run_parse(&args.input, &parser, &mut writer, &options).await?;

    info!(
        lines = report.lines,
        events = report.events,
        faults = report.faults,
        "parse finished"
    );
    Ok(())
}

/// Resolve a format name or specification into a configured parser.
///
/// Shared with the `scenarios` command.
pub fn build_parser(
    format_arg: Option<&str>,
    config: &ClickpathConfig,
) -> Result<LineParser, CliError> {
    let format_name = format_arg.unwrap_or(&config.access_log.format);
    let format = resolve_format(format_name)?;

    let overflow_policy = OverflowPolicy::from_str_loose(&config.access_log.overflow_policy)
        .ok_or_else(|| {
            CliError::Config(format!(
                "unknown overflow policy '{}', expected 'ignore' or 'warn'",
                config.access_log.overflow_policy
            ))
        })?;

    Ok(LineParser::new(format)
        .with_overflow_policy(overflow_policy)
        .with_max_line_length(config.access_log.max_line_length))
}

/// Resolve a preset name or compile a format specification string.
fn resolve_format(name: &str) -> Result<LogFormat, CliError> {
    match name.to_lowercase().as_str() {
        "common" => Ok(LogFormat::common()),
        "performance" | "performance_analysis" => Ok(LogFormat::performance_analysis()),
        _ => LogFormat::from_spec(name).map_err(CliError::from),
    }
}
