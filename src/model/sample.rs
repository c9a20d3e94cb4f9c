//! Line parser
//!
//! Turns one raw line of input into a [`Sample`]: an ordered mapping from
//! series name to value. A line is chartable when it is either a bare JSON
//! number or a flat JSON object whose members are all numbers.

use serde_json::Value;
use thiserror::Error;

/// Series name used when a line holds a bare number instead of an object.
pub const DEFAULT_SERIES_KEY: &str = "value";

/// One decoded input line.
///
/// Entries keep the order in which their keys appeared in the line.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    entries: Vec<(String, f64)>,
}

impl Sample {
    /// Build a sample from `(name, value)` pairs.
    pub fn new(entries: Vec<(String, f64)>) -> Self {
        Self { entries }
    }

    /// A single-entry sample under [`DEFAULT_SERIES_KEY`].
    pub fn scalar(value: f64) -> Self {
        Self::new(vec![(DEFAULT_SERIES_KEY.to_string(), value)])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| *value)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn entries(&self) -> &[(String, f64)] {
        &self.entries
    }
}

/// Why a line produced no data.
#[derive(Debug, Error)]
pub enum LineError {
    #[error("Failed to parse line `{line}`: {source}")]
    InvalidJson {
        line: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Decoded JSON is not a chartable data-type: {line}")]
    NotChartable { line: String },
}

/// Decode one line of input.
///
/// The function holds no state; whether the result is consistent with
/// earlier lines is the aggregator's concern.
pub fn parse_line(line: &str) -> Result<Sample, LineError> {
    let value: Value = serde_json::from_str(line).map_err(|source| LineError::InvalidJson {
        line: line.to_string(),
        source,
    })?;

    let not_chartable = || LineError::NotChartable {
        line: line.to_string(),
    };

    match value {
        Value::Number(number) => number.as_f64().map(Sample::scalar).ok_or_else(not_chartable),
        Value::Object(members) if !members.is_empty() => {
            let mut entries = Vec::with_capacity(members.len());
            for (key, member) in members {
                match member.as_f64() {
                    Some(value) => entries.push((key, value)),
                    None => return Err(not_chartable()),
                }
            }
            Ok(Sample::new(entries))
        }
        _ => Err(not_chartable()),
    }
}
