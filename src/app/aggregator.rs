//! Streaming aggregator
//!
//! Reads one line at a time, keeps the time axis and the per-series buffers
//! aligned, and decides when the render surface gets to draw.

use std::io::BufRead;
use std::time::Instant;

use super::cadence::RenderCadence;
use super::error::IngestError;
use crate::config::ChartConfig;
use crate::model::{parse_line, LineError, SeriesSet};
use crate::services::diagnostics::Diagnostics;
use crate::services::time_source::SharedTimeSource;
use crate::view::layout::SubplotGrid;
use crate::view::surface::{RenderPass, RenderSurface};

/// Line-at-a-time reader that tolerates invalid UTF-8.
///
/// Bytes that are not UTF-8 are replaced rather than failing the read, so
/// such a line turns into a parse diagnostic instead of an I/O error.
pub struct LineReader<R> {
    input: R,
    buf: Vec<u8>,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(input: R) -> Self {
        Self {
            input,
            buf: Vec::new(),
        }
    }

    /// Next line without its `\n` or `\r\n`, or `None` at end of input.
    pub fn next_line(&mut self) -> std::io::Result<Option<String>> {
        self.buf.clear();
        if self.input.read_until(b'\n', &mut self.buf)? == 0 {
            return Ok(None);
        }
        if self.buf.last() == Some(&b'\n') {
            self.buf.pop();
            if self.buf.last() == Some(&b'\r') {
                self.buf.pop();
            }
        }
        Ok(Some(String::from_utf8_lossy(&self.buf).into_owned()))
    }
}

/// What [`Aggregator::ingest`] did with a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    /// No chartable data; reported and dropped
    Skipped,
    /// Appended to every series
    Accepted,
    /// Appended, then a render pass ran
    Rendered,
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub series: SeriesSet,
    pub skipped_lines: usize,
    /// Render passes, the final one included
    pub render_passes: usize,
}

pub struct Aggregator<S: RenderSurface, D: Diagnostics> {
    series: SeriesSet,
    grid: Option<SubplotGrid>,
    normalize: bool,
    cadence: RenderCadence,
    clock: SharedTimeSource,
    started_at: Instant,
    lines_read: usize,
    skipped_lines: usize,
    surface: S,
    diagnostics: D,
}

impl<S: RenderSurface, D: Diagnostics> Aggregator<S, D> {
    /// Fix the schema from `first_line` and resolve the subplot grid.
    ///
    /// A first line without chartable data is reported and is fatal.
    pub fn initialize(
        config: &ChartConfig,
        first_line: &str,
        surface: S,
        mut diagnostics: D,
        clock: SharedTimeSource,
        started_at: Instant,
    ) -> Result<Self, IngestError> {
        let sample = match parse_line(first_line) {
            Ok(sample) => sample,
            Err(err) => {
                diagnostics.report(&err.to_string());
                tracing::error!("First line has no chartable data: {}", err);
                return Err(IngestError::InvalidFirstLine(err));
            }
        };

        let series = SeriesSet::seed(&sample);
        let grid = SubplotGrid::resolve(&config.subplots, series.schema().len())?;
        tracing::info!(
            series = series.schema().len(),
            names = ?series.schema().names(),
            grid = ?grid,
            "Schema established"
        );

        Ok(Self {
            series,
            grid,
            normalize: config.normalize,
            cadence: RenderCadence::new(config, started_at),
            clock,
            started_at,
            lines_read: 1,
            skipped_lines: 0,
            surface,
            diagnostics,
        })
    }

    /// Feed one line read after the first.
    pub fn ingest(&mut self, line: &str) -> Result<LineOutcome, IngestError> {
        self.lines_read += 1;

        let sample = match parse_line(line) {
            Ok(sample) => sample,
            Err(err) => {
                self.skip(&err);
                return Ok(LineOutcome::Skipped);
            }
        };

        let now = self.clock.now();
        let time = self.cadence.axis_time(self.started_at, now);
        if let Err(drift) = self.series.push(time, &sample) {
            tracing::error!(
                line = self.lines_read,
                missing = ?drift.missing,
                unexpected = ?drift.unexpected,
                "Schema drift"
            );
            return Err(IngestError::SchemaDrift {
                line_number: self.lines_read,
                missing: drift.missing,
                unexpected: drift.unexpected,
            });
        }

        if self.cadence.is_due(now) {
            self.render_pass()?;
            return Ok(LineOutcome::Rendered);
        }
        Ok(LineOutcome::Accepted)
    }

    /// Run the final pass, then hand the chart to the surface until it is
    /// closed.
    pub fn finish(mut self) -> Result<RunReport, IngestError> {
        self.render_pass()?;

        let pass = RenderPass::build(
            &self.series,
            self.grid,
            self.normalize,
            self.skipped_lines,
        );
        self.surface.present(&pass).map_err(IngestError::Surface)?;
        tracing::info!(
            samples = self.series.len(),
            skipped = self.skipped_lines,
            passes = self.cadence.passes(),
            "Input finished"
        );

        Ok(RunReport {
            render_passes: self.cadence.passes(),
            skipped_lines: self.skipped_lines,
            series: self.series,
        })
    }

    pub fn series(&self) -> &SeriesSet {
        &self.series
    }

    pub fn skipped_lines(&self) -> usize {
        self.skipped_lines
    }

    fn skip(&mut self, err: &LineError) {
        self.skipped_lines += 1;
        tracing::warn!(line = self.lines_read, "Skipping line: {}", err);
        self.diagnostics.report(&err.to_string());
    }

    fn render_pass(&mut self) -> Result<(), IngestError> {
        let began = self.clock.now();
        let pass = RenderPass::build(
            &self.series,
            self.grid,
            self.normalize,
            self.skipped_lines,
        );
        self.surface.render(&pass).map_err(IngestError::Surface)?;
        let ended = self.clock.now();

        self.cadence.record_pass(began, ended);
        tracing::debug!(
            samples = self.series.len(),
            "Render pass took {:?}",
            ended.saturating_duration_since(began)
        );
        Ok(())
    }
}

/// Ingest `input` to the end and present the result on `surface`.
pub fn run<R, S, D>(
    input: R,
    config: &ChartConfig,
    surface: S,
    diagnostics: D,
    clock: SharedTimeSource,
) -> Result<RunReport, IngestError>
where
    R: BufRead,
    S: RenderSurface,
    D: Diagnostics,
{
    let started_at = clock.now();
    let mut reader = LineReader::new(input);

    let first_line = reader.next_line()?.ok_or(IngestError::EmptyInput)?;
    let mut aggregator =
        Aggregator::initialize(config, &first_line, surface, diagnostics, clock, started_at)?;

    while let Some(line) = reader.next_line()? {
        aggregator.ingest(&line)?;
    }

    aggregator.finish()
}
