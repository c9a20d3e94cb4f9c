use thiserror::Error;

use crate::model::LineError;
use crate::config::MAX_GRID_DIMENSION;
use crate::view::layout::GridError;

/// Fatal errors that end an ingestion run.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("No valid data detected in first line of STDIN (input was empty)")]
    EmptyInput,

    #[error("No valid data detected in first line of STDIN")]
    InvalidFirstLine(#[source] LineError),

    #[error("Number of subplots ({capacity}) is less than the number of data points ({series})")]
    GridTooSmall { capacity: usize, series: usize },

    #[error(
        "Subplot grid {horizontal}x{vertical} exceeds {max} rows or columns",
        max = MAX_GRID_DIMENSION
    )]
    GridTooLarge { vertical: usize, horizontal: usize },

    #[error(
        "Line {line_number} does not match the series established by the first line \
         (missing: [{}], unexpected: [{}]); STDIN data must be consistent",
        .missing.join(", "),
        .unexpected.join(", ")
    )]
    SchemaDrift {
        line_number: usize,
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    #[error("Failed to read STDIN: {0}")]
    Io(#[from] std::io::Error),

    #[error("Render surface failed: {0:#}")]
    Surface(anyhow::Error),
}

impl From<GridError> for IngestError {
    fn from(err: GridError) -> Self {
        match err {
            GridError::TooSmall { capacity, series } => {
                IngestError::GridTooSmall { capacity, series }
            }
            GridError::TooLarge {
                vertical,
                horizontal,
            } => IngestError::GridTooLarge {
                vertical,
                horizontal,
            },
        }
    }
}

impl IngestError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        1
    }
}
