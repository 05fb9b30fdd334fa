//! Apollo tracing (version 1) built from flat timing records.
//!
//! Timing records are millisecond offsets from the start of a request. The
//! trace reports nanoseconds, as the Apollo tracing format requires.

use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use smol_str::SmolStr;

use crate::path::{Path, PathSegment};

/// Record category for the whole operation.
pub const CATEGORY_OPERATION: &str = "operation";
/// Record category for document parsing and validation.
pub const CATEGORY_DOCUMENT: &str = "document";
/// Record category for a field resolver.
pub const CATEGORY_FIELD: &str = "field";

/// Subject of the document record that times parsing.
pub const SUBJECT_PARSING: &str = "Building document";
/// Subject of the document record that times validation.
pub const SUBJECT_VALIDATION: &str = "Validating document";

/// One timing measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerfRecord {
    pub category: SmolStr,
    pub subject: SmolStr,
    /// Milliseconds since the request started.
    pub start: f64,
    /// Milliseconds since the request started.
    pub end: f64,
    /// Free-form details; field records carry `fieldName`, `path`,
    /// `typeName` and `returnTypeName`.
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl PerfRecord {
    pub fn new(category: impl Into<SmolStr>, subject: impl Into<SmolStr>, start: f64, end: f64) -> Self {
        Self {
            category: category.into(),
            subject: subject.into(),
            start,
            end,
            metadata: Map::new(),
        }
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Elapsed milliseconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    pub fn meta_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }

    /// Reads a list of path steps; string steps that parse as indices become
    /// [`PathSegment::Index`].
    pub fn meta_path(&self, key: &str) -> Path {
        let Some(Value::Array(steps)) = self.metadata.get(key) else {
            return Path::new();
        };
        steps
            .iter()
            .filter_map(|step| match step {
                Value::String(step) => Some(PathSegment::parse(step)),
                Value::Number(index) => index
                    .as_u64()
                    .and_then(|index| usize::try_from(index).ok())
                    .map(PathSegment::Index),
                _ => None,
            })
            .collect()
    }
}

/// The `tracing` extension payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApolloTrace {
    pub version: u32,
    #[serde(serialize_with = "rfc3339")]
    pub start_time: DateTime<Utc>,
    #[serde(serialize_with = "rfc3339")]
    pub end_time: DateTime<Utc>,
    /// Total operation time in nanoseconds.
    pub duration: i64,
    pub parsing: PhaseTrace,
    pub validation: PhaseTrace,
    pub execution: ExecutionTrace,
}

/// Timing of a document phase, in nanoseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseTrace {
    pub start_offset: i64,
    pub duration: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExecutionTrace {
    pub resolvers: Vec<ResolverTrace>,
}

/// Timing of one field resolver, in nanoseconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolverTrace {
    pub path: Path,
    pub parent_type: Option<String>,
    pub field_name: Option<String>,
    pub return_type: Option<String>,
    pub start_offset: i64,
    pub duration: i64,
}

fn rfc3339<S: Serializer>(time: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&time.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Converts milliseconds to whole nanoseconds.
pub fn convert_time(milliseconds: f64) -> i64 {
    (milliseconds * 1_000_000.0) as i64
}

/// Builds the trace for a request that started at `start`.
///
/// The first `operation` record gives the total duration; `document` records
/// give the parsing and validation phases; every `field` record becomes a
/// resolver entry, in record order.
pub fn create_trace(records: &[PerfRecord], start: DateTime<Utc>) -> ApolloTrace {
    let operation_ms = records
        .iter()
        .find(|record| record.category == CATEGORY_OPERATION)
        .map_or(0.0, PerfRecord::duration);
    let duration = convert_time(operation_ms);

    let phase = |subject: &str| {
        records
            .iter()
            .find(|record| record.category == CATEGORY_DOCUMENT && record.subject == subject)
            .map(|record| PhaseTrace {
                start_offset: convert_time(record.start),
                duration: convert_time(record.duration()),
            })
            .unwrap_or_default()
    };

    let resolvers = records
        .iter()
        .filter(|record| record.category == CATEGORY_FIELD)
        .map(|record| ResolverTrace {
            path: record.meta_path("path"),
            parent_type: record.meta_str("typeName").map(str::to_string),
            field_name: record.meta_str("fieldName").map(str::to_string),
            return_type: record.meta_str("returnTypeName").map(str::to_string),
            start_offset: convert_time(record.start),
            duration: convert_time(record.duration()),
        })
        .collect::<Vec<_>>();

    tracing::trace!(resolvers = resolvers.len(), duration, "apollo trace built");

    ApolloTrace {
        version: 1,
        start_time: start,
        end_time: start + TimeDelta::nanoseconds(duration),
        duration,
        parsing: phase(SUBJECT_PARSING),
        validation: phase(SUBJECT_VALIDATION),
        execution: ExecutionTrace { resolvers },
    }
}

/// Adds a `tracing` entry to a response's `extensions` map.
///
/// Does nothing when there are no records.
pub fn enrich_with_apollo_tracing(
    extensions: &mut Map<String, Value>,
    records: &[PerfRecord],
    start: DateTime<Utc>,
) -> Result<(), serde_json::Error> {
    if records.is_empty() {
        return Ok(());
    }
    let trace = serde_json::to_value(create_trace(records, start))?;
    extensions.insert("tracing".to_string(), trace);
    Ok(())
}
