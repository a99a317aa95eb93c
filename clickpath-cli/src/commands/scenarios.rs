//! `clickpath scenarios` command handler

use tracing::info;

use clickpath_core::config::ClickpathConfig;
use clickpath_scenario::{AggregatorConfig, ScenarioAggregator};

use crate::cli::{OutputFormat, ScenariosArgs};
use crate::error::CliError;
use crate::output::OutputWriter;
use crate::pipeline::{self, PipelineOptions};

use super::parse::build_parser;

/// Execute the `scenarios` command.
///
/// Runs the full pipeline: parse each line, route the resulting HTTP
/// request events through the session-keyed scenario aggregator, and
/// write one row per closed business scenario. Open scenarios are
/// force-closed as INCOMPLETE at end of stream.
pub async fn execute(
    args: ScenariosArgs,
    output_format: OutputFormat,
    config: &ClickpathConfig,
) -> Result<(), CliError> {
    let parser = build_parser(args.format.as_deref(), config)?;

    let aggregator_config = AggregatorConfig::from_core(&config.scenario);
    aggregator_config.validate()?;
    let mut aggregator = ScenarioAggregator::new(aggregator_config);

    info!(
        input = %args.input.display(),
        format = parser.format().name(),
        session_cookie = %config.scenario.session_cookie,
        "aggregating business scenarios"
    );

    let options = PipelineOptions {
        channel_capacity: config.access_log.channel_capacity,
        suppress_faults: args.quiet_faults || config.output.suppress_faults,
        session_cookie: config.scenario.session_cookie.clone(),
    };

    let mut writer = OutputWriter::stdout(output_format);
    let report =
        pipeline::run_scenarios(&args.input, &parser, &mut aggregator, &mut writer, &options)
            .await?;

    info!(
        lines = report.lines,
        events = report.events,
        scenarios = report.scenarios,
        faults = report.faults,
        sessions = aggregator.session_count(),
        "scenario aggregation finished"
    );
    Ok(())
}
