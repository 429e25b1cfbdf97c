use std::io::Write;
use std::sync::Mutex;

use tracing::error;

use crate::error::GatherError;
use crate::types::{FieldValue, Fields, MetricPoint, Tags};

/// Receives emitted points. Performs no validation.
pub trait MetricEmitter: Send + Sync {
    fn add_fields(&self, measurement: &str, fields: Fields, tags: Tags);
}

/// Receives non-fatal errors raised while gathering.
pub trait ErrorSink: Send + Sync {
    fn add_error(&self, err: GatherError);
}

pub trait Accumulator: MetricEmitter + ErrorSink {}

impl<T: MetricEmitter + ErrorSink> Accumulator for T {}

/// Collects points and errors in memory.
#[derive(Debug, Default)]
pub struct MemoryAccumulator {
    points: Mutex<Vec<MetricPoint>>,
    errors: Mutex<Vec<GatherError>>,
}

impl MemoryAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn points(&self) -> Vec<MetricPoint> {
        self.points.lock().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn points_for(&self, measurement: &str) -> Vec<MetricPoint> {
        self.points()
            .into_iter()
            .filter(|p| p.measurement == measurement)
            .collect()
    }

    pub fn error_messages(&self) -> Vec<String> {
        self.errors
            .lock()
            .map(|errs| errs.iter().map(|e| e.to_string()).collect())
            .unwrap_or_default()
    }

    pub fn error_count(&self) -> usize {
        self.errors.lock().map(|errs| errs.len()).unwrap_or(0)
    }
}

impl MetricEmitter for MemoryAccumulator {
    fn add_fields(&self, measurement: &str, fields: Fields, tags: Tags) {
        if let Ok(mut points) = self.points.lock() {
            points.push(MetricPoint {
                measurement: measurement.to_string(),
                fields,
                tags,
            });
        }
    }
}

impl ErrorSink for MemoryAccumulator {
    fn add_error(&self, err: GatherError) {
        if let Ok(mut errors) = self.errors.lock() {
            errors.push(err);
        }
    }
}

/// Writes points to stdout as influx line protocol and logs errors.
#[derive(Debug, Default)]
pub struct LineProtocolWriter;

impl MetricEmitter for LineProtocolWriter {
    fn add_fields(&self, measurement: &str, fields: Fields, tags: Tags) {
        let line = format_line(measurement, &fields, &tags);
        let mut out = std::io::stdout().lock();
        if let Err(e) = writeln!(out, "{}", line) {
            error!("write metric: {}", e);
        }
    }
}

impl ErrorSink for LineProtocolWriter {
    fn add_error(&self, err: GatherError) {
        error!("{}", err);
    }
}

pub fn format_line(measurement: &str, fields: &Fields, tags: &Tags) -> String {
    let mut line = escape(measurement, &[',', ' ']);
    for (k, v) in tags {
        line.push(',');
        line.push_str(&escape(k, &[',', '=', ' ']));
        line.push('=');
        line.push_str(&escape(v, &[',', '=', ' ']));
    }
    line.push(' ');
    let rendered: Vec<String> = fields
        .iter()
        .map(|(k, v)| format!("{}={}", escape(k, &[',', '=', ' ']), format_value(v)))
        .collect();
    line.push_str(&rendered.join(","));
    line
}

fn format_value(v: &FieldValue) -> String {
    match v {
        FieldValue::Int(i) => format!("{}i", i),
        FieldValue::Float(f) => f.to_string(),
        FieldValue::Bool(b) => b.to_string(),
        FieldValue::Str(s) => format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")),
    }
}

fn escape(s: &str, special: &[char]) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
