//! Ingestion: from lines on STDIN to render passes.

pub mod aggregator;
pub mod cadence;
pub mod error;

pub use aggregator::{run, Aggregator, LineOutcome, LineReader, RunReport};
pub use cadence::RenderCadence;
pub use error::IngestError;
