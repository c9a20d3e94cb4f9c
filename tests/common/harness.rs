//! Drives the aggregator on a scripted timeline with a recording surface.

use std::sync::Arc;
use std::time::Duration;

use livechart::app::{Aggregator, IngestError, LineOutcome, RunReport};
use livechart::config::ChartConfig;
use livechart::services::diagnostics::DeferredDiagnostics;
use livechart::services::time_source::{TestTimeSource, TimeSource};
use livechart::view::layout::SubplotGrid;
use livechart::view::surface::{RenderPass, RenderSurface};

/// Owned copy of a [`RenderPass`].
#[derive(Debug, Clone, PartialEq)]
pub struct PassSnapshot {
    pub times: Vec<f64>,
    pub series: Vec<(String, Vec<f64>)>,
    pub titles: Vec<Option<String>>,
    pub grid: Option<SubplotGrid>,
    pub skipped_lines: usize,
    pub legend: bool,
}

impl PassSnapshot {
    pub fn capture(pass: &RenderPass<'_>) -> Self {
        Self {
            times: pass.times.to_vec(),
            series: pass
                .series
                .iter()
                .map(|view| (view.name.to_string(), view.values.to_vec()))
                .collect(),
            titles: pass
                .series
                .iter()
                .map(|view| view.title().map(str::to_string))
                .collect(),
            grid: pass.grid,
            skipped_lines: pass.skipped_lines,
            legend: pass.needs_legend(),
        }
    }

    pub fn values(&self, name: &str) -> Option<&[f64]> {
        self.series
            .iter()
            .find(|(series, _)| series == name)
            .map(|(_, values)| values.as_slice())
    }
}

/// Records every pass; each render advances the clock by `render_cost`.
pub struct RecordingSurface {
    clock: Arc<TestTimeSource>,
    render_cost: Duration,
    pub passes: Vec<PassSnapshot>,
    pub presented: Vec<PassSnapshot>,
}

impl RecordingSurface {
    pub fn new(clock: Arc<TestTimeSource>, render_cost: Duration) -> Self {
        Self {
            clock,
            render_cost,
            passes: Vec::new(),
            presented: Vec::new(),
        }
    }
}

impl RenderSurface for RecordingSurface {
    fn render(&mut self, pass: &RenderPass<'_>) -> anyhow::Result<()> {
        self.passes.push(PassSnapshot::capture(pass));
        self.clock.advance(self.render_cost);
        Ok(())
    }

    fn present(&mut self, pass: &RenderPass<'_>) -> anyhow::Result<()> {
        self.presented.push(PassSnapshot::capture(pass));
        Ok(())
    }
}

/// Everything a scripted run produced.
pub struct StreamOutcome {
    pub result: Result<RunReport, IngestError>,
    pub outcomes: Vec<LineOutcome>,
    pub surface: RecordingSurface,
    pub diagnostics: Vec<String>,
}

impl StreamOutcome {
    pub fn report(&self) -> &RunReport {
        match &self.result {
            Ok(report) => report,
            Err(err) => panic!("run failed: {err}"),
        }
    }

    pub fn final_pass(&self) -> &PassSnapshot {
        self.surface.presented.last().expect("nothing presented")
    }
}

/// Feed `timeline` to an aggregator. Each entry is the delay in
/// milliseconds before the line arrives, and the line itself.
pub fn stream(
    config: &ChartConfig,
    timeline: &[(u64, &str)],
    render_cost: Duration,
) -> StreamOutcome {
    let clock = TestTimeSource::shared();
    let mut surface = RecordingSurface::new(clock.clone(), render_cost);
    let mut diagnostics = DeferredDiagnostics::new();
    let mut outcomes = Vec::new();

    let result = drive(
        config,
        timeline,
        &clock,
        &mut surface,
        &mut diagnostics,
        &mut outcomes,
    );

    StreamOutcome {
        result,
        outcomes,
        surface,
        diagnostics: diagnostics.pending(),
    }
}

/// Lines arriving back to back.
pub fn instant(lines: &[&'static str]) -> Vec<(u64, &'static str)> {
    lines.iter().map(|line| (0, *line)).collect()
}

fn drive(
    config: &ChartConfig,
    timeline: &[(u64, &str)],
    clock: &Arc<TestTimeSource>,
    surface: &mut RecordingSurface,
    diagnostics: &mut DeferredDiagnostics,
    outcomes: &mut Vec<LineOutcome>,
) -> Result<RunReport, IngestError> {
    let started_at = clock.now();
    let mut lines = timeline.iter();

    let (delay, first) = lines.next().ok_or(IngestError::EmptyInput)?;
    clock.advance(Duration::from_millis(*delay));
    let mut aggregator = Aggregator::initialize(
        config,
        first,
        surface,
        diagnostics,
        clock.clone(),
        started_at,
    )?;

    for (delay, line) in lines {
        clock.advance(Duration::from_millis(*delay));
        outcomes.push(aggregator.ingest(line)?);
    }

    aggregator.finish()
}
