//! Queue-based processing pipeline
//!
//! A reader task feeds raw lines through a bounded mpsc channel into the
//! synchronous parsing/aggregation core. Results flow as
//! [`StreamEvent`]s — normal output and fault events share the stream —
//! and are written row by row. End-of-stream is signalled by the channel
//! closing, which triggers forced completion of open scenarios before
//! the writer is flushed.
//!
//! ```text
//! reader task -> mpsc<RawLine> -> LineParser -> (ScenarioAggregator) -> OutputWriter
//! ```

use std::path::{Path, PathBuf};

use bytes::Bytes;
use metrics::{counter, gauge};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use clickpath_access_log::LineParser;
use clickpath_core::metrics as metric_names;
use clickpath_core::pipeline::{RequestParser, StreamEvent};
use clickpath_scenario::ScenarioAggregator;

use crate::error::CliError;
use crate::output::{OutputWriter, RequestRow, ScenarioRow};

/// One raw line read from the input.
#[derive(Debug, Clone)]
pub struct RawLine {
    /// Raw line bytes (without the trailing newline)
    pub data: Bytes,
    /// 1-based line number
    pub number: u64,
}

/// Pipeline run options derived from configuration and CLI flags.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Capacity of the reader -> processor channel
    pub channel_capacity: usize,
    /// Drop fault rows instead of writing them
    pub suppress_faults: bool,
    /// Session cookie name used for the jsessionid output column
    pub session_cookie: String,
}

/// Counters reported after a pipeline run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PipelineReport {
    /// Lines read from the input
    pub lines: u64,
    /// Lines parsed into HTTP request events
    pub events: u64,
    /// Fault events (parsing + aggregation)
    pub faults: u64,
    /// Business scenarios closed
    pub scenarios: u64,
}

/// Run the parse pipeline: one output row per HTTP request event.
pub async fn run_parse(
    input: &Path,
    parser: &LineParser,
    writer: &mut OutputWriter,
    options: &PipelineOptions,
) -> Result<PipelineReport, CliError> {
    let (tx, mut rx) = mpsc::channel::<RawLine>(options.channel_capacity);
    let reader = spawn_reader(input.to_owned(), tx);

    let mut report = PipelineReport::default();
    while let Some(raw) = rx.recv().await {
        report.lines += 1;
        counter!(metric_names::ACCESS_LOG_LINES_TOTAL).increment(1);

        let line = String::from_utf8_lossy(&raw.data);
        let stream_event = match parser.parse_line(&line, raw.number) {
            Ok(event) => {
                report.events += 1;
                counter!(metric_names::ACCESS_LOG_EVENTS_TOTAL).increment(1);
                StreamEvent::Http(event)
            }
            Err(fault) => {
                report.faults += 1;
                counter!(metric_names::ACCESS_LOG_FAULTS_TOTAL).increment(1);
                StreamEvent::Fault(fault)
            }
        };

        write_request_row(writer, &stream_event, options)?;
    }

    join_reader(reader).await?;
    writer.flush()?;
    Ok(report)
}

/// Run the scenario pipeline: parse, aggregate per session, emit one row
/// per closed business scenario.
///
/// Recoverable problems flow through as fault rows; a fatal aggregation
/// error (marker type conflict) aborts the whole run.
pub async fn run_scenarios(
    input: &Path,
    parser: &LineParser,
    aggregator: &mut ScenarioAggregator,
    writer: &mut OutputWriter,
    options: &PipelineOptions,
) -> Result<PipelineReport, CliError> {
    let (tx, mut rx) = mpsc::channel::<RawLine>(options.channel_capacity);
    let reader = spawn_reader(input.to_owned(), tx);

    let mut report = PipelineReport::default();
    while let Some(raw) = rx.recv().await {
        report.lines += 1;
        counter!(metric_names::ACCESS_LOG_LINES_TOTAL).increment(1);

        let line = String::from_utf8_lossy(&raw.data);
        match parser.parse_line(&line, raw.number) {
            Ok(event) => {
                report.events += 1;
                counter!(metric_names::ACCESS_LOG_EVENTS_TOTAL).increment(1);

                for output in aggregator.update(&event)? {
                    let stream_event = StreamEvent::from(output);
                    count_scenario_output(&stream_event, &mut report);
                    write_scenario_row(writer, &stream_event, options)?;
                }
                gauge!(metric_names::SCENARIO_OPEN).set(aggregator.open_scenario_count() as f64);
            }
            Err(fault) => {
                report.faults += 1;
                counter!(metric_names::ACCESS_LOG_FAULTS_TOTAL).increment(1);
                write_scenario_row(writer, &StreamEvent::Fault(fault), options)?;
            }
        }
    }

    join_reader(reader).await?;

    // End of stream: force-close open scenarios, then flush downstream
    for scenario in aggregator.finish() {
        let stream_event = StreamEvent::Scenario(scenario);
        count_scenario_output(&stream_event, &mut report);
        write_scenario_row(writer, &stream_event, options)?;
    }
    gauge!(metric_names::SCENARIO_OPEN).set(0.0);

    writer.flush()?;
    Ok(report)
}

/// Write a stream event as a request row (parse mode).
fn write_request_row(
    writer: &mut OutputWriter,
    event: &StreamEvent,
    options: &PipelineOptions,
) -> Result<(), CliError> {
    match event {
        StreamEvent::Http(http) => {
            writer.write_row(&RequestRow::from_event(http, &options.session_cookie))
        }
        StreamEvent::Fault(fault) if !options.suppress_faults => {
            writer.write_row(&RequestRow::from_fault(fault))
        }
        StreamEvent::Fault(_) | StreamEvent::Scenario(_) => Ok(()),
    }
}

/// Write a stream event as a scenario row (scenarios mode).
///
/// HTTP request events are intermediate in this mode and produce no row.
fn write_scenario_row(
    writer: &mut OutputWriter,
    event: &StreamEvent,
    options: &PipelineOptions,
) -> Result<(), CliError> {
    match event {
        StreamEvent::Scenario(scenario) => writer.write_row(&ScenarioRow::from_event(scenario)),
        StreamEvent::Fault(fault) if !options.suppress_faults => {
            writer.write_row(&ScenarioRow::from_fault(fault))
        }
        StreamEvent::Fault(_) | StreamEvent::Http(_) => Ok(()),
    }
}

fn count_scenario_output(event: &StreamEvent, report: &mut PipelineReport) {
    match event {
        StreamEvent::Scenario(_) => {
            report.scenarios += 1;
            counter!(metric_names::SCENARIO_CLOSED_TOTAL).increment(1);
        }
        StreamEvent::Fault(_) => {
            report.faults += 1;
            counter!(metric_names::SCENARIO_FAULTS_TOTAL).increment(1);
        }
        StreamEvent::Http(_) => {}
    }
}

/// Spawn the reader task feeding raw lines into the channel.
///
/// `-` reads from stdin, anything else is opened as a file.
fn spawn_reader(path: PathBuf, tx: mpsc::Sender<RawLine>) -> JoinHandle<Result<u64, CliError>> {
    tokio::spawn(async move {
        let reader: Box<dyn AsyncRead + Unpin + Send> = if path.as_os_str() == "-" {
            Box::new(tokio::io::stdin())
        } else {
            Box::new(tokio::fs::File::open(&path).await?)
        };

        let mut lines = BufReader::new(reader).lines();
        let mut number = 0u64;
        while let Some(line) = lines.next_line().await? {
            number += 1;
            let raw = RawLine {
                data: Bytes::from(line),
                number,
            };
            if tx.send(raw).await.is_err() {
                // receiver dropped, stop reading
                break;
            }
        }
        Ok(number)
    })
}

async fn join_reader(handle: JoinHandle<Result<u64, CliError>>) -> Result<u64, CliError> {
    handle
        .await
        .map_err(|e| CliError::Command(format!("reader task failed: {e}")))?
}
