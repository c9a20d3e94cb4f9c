//! Render surface without a terminal.
//!
//! Counts render passes and, once the input ends, writes the final series as
//! one JSON document.

use std::io::Write;

use anyhow::Result;
use serde::Serialize;

use super::layout::SubplotGrid;
use super::surface::{RenderPass, RenderSurface};

/// Final state of a run as written by [`HeadlessSurface::present`].
#[derive(Debug, Serialize)]
pub struct Summary<'a> {
    pub time: &'a [f64],
    pub series: Vec<SeriesSummary<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid: Option<SubplotGrid>,
    pub skipped_lines: usize,
}

#[derive(Debug, Serialize)]
pub struct SeriesSummary<'a> {
    pub name: &'a str,
    pub values: &'a [f64],
}

impl<'a> Summary<'a> {
    pub fn from_pass(pass: &'a RenderPass<'a>) -> Self {
        Self {
            time: pass.times,
            series: pass
                .series
                .iter()
                .map(|view| SeriesSummary {
                    name: view.name,
                    values: view.values.as_ref(),
                })
                .collect(),
            grid: pass.grid,
            skipped_lines: pass.skipped_lines,
        }
    }
}

pub struct HeadlessSurface<W: Write> {
    out: W,
    passes: usize,
}

impl<W: Write> HeadlessSurface<W> {
    pub fn new(out: W) -> Self {
        Self { out, passes: 0 }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RenderSurface for HeadlessSurface<W> {
    fn render(&mut self, pass: &RenderPass<'_>) -> Result<()> {
        self.passes += 1;
        tracing::trace!(
            "Headless pass {} with {} samples",
            self.passes,
            pass.times.len()
        );
        Ok(())
    }

    fn present(&mut self, pass: &RenderPass<'_>) -> Result<()> {
        serde_json::to_writer(&mut self.out, &Summary::from_pass(pass))?;
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}
