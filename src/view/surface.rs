//! The seam between the ingest loop and whatever draws the chart.

use std::borrow::Cow;

use crate::model::series::{display_values, SeriesSet};
use crate::view::layout::{GridCell, SubplotGrid};

/// Everything one render pass needs.
#[derive(Debug, Clone)]
pub struct RenderPass<'a> {
    /// Shared time axis, seconds since ingestion start
    pub times: &'a [f64],
    /// One entry per series, in schema order
    pub series: Vec<SeriesView<'a>>,
    /// Subplot grid, `None` when all series share one chart
    pub grid: Option<SubplotGrid>,
    /// Lines skipped so far because they held no chartable data
    pub skipped_lines: usize,
}

/// One series as it should be drawn.
#[derive(Debug, Clone)]
pub struct SeriesView<'a> {
    pub name: &'a str,
    /// Stored values, or their normalized copy
    pub values: Cow<'a, [f64]>,
    pub cell: Option<GridCell>,
}

impl SeriesView<'_> {
    /// Subplot title; series sharing one chart are named in the legend instead.
    pub fn title(&self) -> Option<&str> {
        self.cell.map(|_| self.name)
    }
}

impl<'a> RenderPass<'a> {
    /// Snapshot `series` for drawing, normalizing on the fly if asked to.
    pub fn build(
        series: &'a SeriesSet,
        grid: Option<SubplotGrid>,
        normalize: bool,
        skipped_lines: usize,
    ) -> Self {
        let views = series
            .iter()
            .enumerate()
            .map(|(index, (name, values))| SeriesView {
                name,
                values: display_values(values, normalize),
                cell: grid.map(|grid| grid.cell(index)),
            })
            .collect();

        Self {
            times: series.times(),
            series: views,
            grid,
            skipped_lines,
        }
    }

    /// Whether a legend is needed to tell series apart.
    pub fn needs_legend(&self) -> bool {
        self.grid.is_none() && self.series.len() > 1
    }
}

/// Display capability the aggregator renders into.
pub trait RenderSurface {
    /// Draw one pass. Called at the render cadence and once more when the
    /// input ends.
    fn render(&mut self, pass: &RenderPass<'_>) -> anyhow::Result<()>;

    /// Show the final chart and block until the surface is closed.
    fn present(&mut self, pass: &RenderPass<'_>) -> anyhow::Result<()>;
}

impl<S: RenderSurface + ?Sized> RenderSurface for &mut S {
    fn render(&mut self, pass: &RenderPass<'_>) -> anyhow::Result<()> {
        (**self).render(pass)
    }

    fn present(&mut self, pass: &RenderPass<'_>) -> anyhow::Result<()> {
        (**self).present(pass)
    }
}

impl<S: RenderSurface + ?Sized> RenderSurface for Box<S> {
    fn render(&mut self, pass: &RenderPass<'_>) -> anyhow::Result<()> {
        (**self).render(pass)
    }

    fn present(&mut self, pass: &RenderPass<'_>) -> anyhow::Result<()> {
        (**self).present(pass)
    }
}
