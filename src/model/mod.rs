//! Data model: decoded samples and the per-series history built from them.

pub mod sample;
pub mod series;

pub use sample::{parse_line, LineError, Sample, DEFAULT_SERIES_KEY};
pub use series::{normalize, Drift, Schema, SeriesSet};
