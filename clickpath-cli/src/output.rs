//! Output formatting abstraction for CSV vs JSON rendering
//!
//! All event rows flow through [`OutputWriter`] which handles format
//! switching. Fault events are rendered as regular rows with the `fault`
//! column filled, so data-quality problems stay visible in the output
//! stream next to the rows they relate to.

use std::io::Write;
use std::time::SystemTime;

use serde::Serialize;

use clickpath_core::event::{FaultEvent, HttpEvent, ScenarioEvent};

use crate::cli::OutputFormat;
use crate::error::CliError;

/// One output row per HTTP request event (or per parsing fault).
#[derive(Debug, Serialize)]
pub struct RequestRow {
    /// Source line number
    pub line: Option<u64>,
    /// Request timestamp (unix epoch milliseconds)
    pub timestamp_ms: Option<u64>,
    pub remote_host: Option<String>,
    pub remote_user: Option<String>,
    pub method: Option<String>,
    pub path: Option<String>,
    pub http_version: Option<String>,
    pub status: Option<u16>,
    pub original_status: Option<u16>,
    pub bytes: Option<u64>,
    /// Request processing time in microseconds
    pub duration_us: Option<u64>,
    pub thread: Option<String>,
    pub jsessionid: Option<String>,
    /// Fault message when this row represents a parsing fault
    pub fault: Option<String>,
}

impl RequestRow {
    /// Build a row from a parsed HTTP request event.
    pub fn from_event(event: &HttpEvent, session_cookie: &str) -> Self {
        let request = &event.request;
        Self {
            line: event.line_number,
            timestamp_ms: request.timestamp.and_then(epoch_millis),
            remote_host: request.remote_host.clone(),
            remote_user: request.remote_user.clone(),
            method: request.method.clone(),
            path: request.path.clone(),
            http_version: request.http_version.clone(),
            status: request.status_code,
            original_status: request.original_status_code,
            bytes: request.response_bytes,
            duration_us: request
                .duration
                .map(|d| u64::try_from(d.as_micros()).unwrap_or(u64::MAX)),
            thread: request.thread_name.clone(),
            jsessionid: request.cookie(session_cookie).map(ToOwned::to_owned),
            fault: None,
        }
    }

    /// Build a fault row.
    pub fn from_fault(fault: &FaultEvent) -> Self {
        Self {
            line: fault.line_number,
            timestamp_ms: None,
            remote_host: None,
            remote_user: None,
            method: None,
            path: None,
            http_version: None,
            status: None,
            original_status: None,
            bytes: None,
            duration_us: None,
            thread: None,
            jsessionid: None,
            fault: Some(fault.message.clone()),
        }
    }
}

/// One output row per closed business scenario (or per aggregation fault).
#[derive(Debug, Serialize)]
pub struct ScenarioRow {
    /// Scenario begin timestamp (unix epoch milliseconds)
    pub timestamp_ms: Option<u64>,
    #[serde(rename = "type")]
    pub scenario_type: Option<String>,
    pub state: Option<String>,
    pub requests: Option<u64>,
    pub successful_requests: Option<u64>,
    /// Sum of member request durations in milliseconds
    pub duration_ms: Option<u64>,
    pub jsessionid: Option<String>,
    pub iteration_id: Option<String>,
    /// Fault message when this row represents an aggregation fault
    pub fault: Option<String>,
}

impl ScenarioRow {
    /// Build a row from a closed scenario event.
    pub fn from_event(event: &ScenarioEvent) -> Self {
        let summary = &event.summary;
        Self {
            timestamp_ms: summary.begin.and_then(epoch_millis),
            scenario_type: summary.scenario_type.clone(),
            state: Some(summary.state.to_string()),
            requests: Some(summary.request_count),
            successful_requests: Some(summary.successful_request_count),
            duration_ms: Some(u64::try_from(summary.duration.as_millis()).unwrap_or(u64::MAX)),
            jsessionid: Some(summary.jsessionid.clone()),
            iteration_id: summary.iteration_id.clone(),
            fault: None,
        }
    }

    /// Build a fault row.
    pub fn from_fault(fault: &FaultEvent) -> Self {
        Self {
            timestamp_ms: None,
            scenario_type: None,
            state: None,
            requests: None,
            successful_requests: None,
            duration_ms: None,
            jsessionid: None,
            iteration_id: None,
            fault: Some(fault.message.clone()),
        }
    }
}

fn epoch_millis(time: SystemTime) -> Option<u64> {
    time.duration_since(SystemTime::UNIX_EPOCH)
        .ok()
        .and_then(|d| u64::try_from(d.as_millis()).ok())
}

/// Abstraction for writing event rows in different formats.
///
/// CSV mode writes a header line derived from the row struct on the first
/// row. JSON mode writes one object per line (JSON Lines).
pub struct OutputWriter {
    inner: Inner,
}

enum Inner {
    Csv(csv::Writer<Box<dyn Write + Send>>),
    Json(Box<dyn Write + Send>),
}

impl OutputWriter {
    /// Create a writer targeting stdout.
    pub fn stdout(format: OutputFormat) -> Self {
        Self::from_writer(format, Box::new(std::io::stdout()))
    }

    /// Create a writer targeting an arbitrary sink (used by tests).
    pub fn from_writer(format: OutputFormat, sink: Box<dyn Write + Send>) -> Self {
        let inner = match format {
            OutputFormat::Csv => Inner::Csv(csv::Writer::from_writer(sink)),
            OutputFormat::Json => Inner::Json(sink),
        };
        Self { inner }
    }

    /// Write one row.
    pub fn write_row<T: Serialize>(&mut self, row: &T) -> Result<(), CliError> {
        match &mut self.inner {
            Inner::Csv(writer) => writer.serialize(row)?,
            Inner::Json(sink) => {
                serde_json::to_writer(&mut *sink, row)?;
                writeln!(sink)?;
            }
        }
        Ok(())
    }

    /// Flush buffered output.
    pub fn flush(&mut self) -> Result<(), CliError> {
        match &mut self.inner {
            Inner::Csv(writer) => writer.flush()?,
            Inner::Json(sink) => sink.flush()?,
        }
        Ok(())
    }
}
