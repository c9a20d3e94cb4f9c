//! Terminal render surface
//!
//! Draws each pass with ratatui while input streams in, then holds the final
//! chart on screen until the user closes it with `q`, `Esc` or `Ctrl-C`.

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{backend::Backend, Terminal};

use super::chart::{self, Phase};
use super::surface::{RenderPass, RenderSurface};
use crate::services::terminal_modes::TerminalModes;

const EVENT_POLL_TIMEOUT: Duration = Duration::from_millis(250);

/// Source of terminal input events for the final display.
pub trait EventSource {
    /// Prepare to read keys. Called once before the first event is requested.
    fn begin(&mut self) -> Result<()>;

    /// Next event, or `None` if nothing arrived within `timeout`.
    fn next_event(&mut self, timeout: Duration) -> Result<Option<Event>>;
}

/// Reads events from the controlling terminal through crossterm.
///
/// Owns the [`TerminalModes`] of the session, so dropping it restores the
/// terminal.
#[derive(Debug)]
pub struct CrosstermEvents {
    modes: TerminalModes,
}

impl CrosstermEvents {
    pub fn new(modes: TerminalModes) -> Self {
        Self { modes }
    }
}

impl EventSource for CrosstermEvents {
    fn begin(&mut self) -> Result<()> {
        self.modes.enable_raw_mode()
    }

    fn next_event(&mut self, timeout: Duration) -> Result<Option<Event>> {
        if event::poll(timeout)? {
            Ok(Some(event::read()?))
        } else {
            Ok(None)
        }
    }
}

/// Whether `key` closes the final display.
pub fn is_close_key(key: &KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

/// [`RenderSurface`] drawing into a ratatui terminal.
pub struct TerminalSurface<B: Backend, E: EventSource> {
    terminal: Terminal<B>,
    events: E,
}

impl<B: Backend, E: EventSource> TerminalSurface<B, E> {
    pub fn new(terminal: Terminal<B>, events: E) -> Self {
        Self { terminal, events }
    }

    pub fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }

    fn draw(&mut self, pass: &RenderPass<'_>, phase: Phase) -> Result<()> {
        self.terminal
            .draw(|frame| chart::draw(frame, pass, phase))?;
        Ok(())
    }
}

impl<B: Backend, E: EventSource> RenderSurface for TerminalSurface<B, E> {
    fn render(&mut self, pass: &RenderPass<'_>) -> Result<()> {
        self.draw(pass, Phase::Streaming)
    }

    fn present(&mut self, pass: &RenderPass<'_>) -> Result<()> {
        self.events.begin()?;
        self.draw(pass, Phase::Finished)?;
        tracing::debug!("Input closed, waiting for the display to be closed");

        loop {
            match self.events.next_event(EVENT_POLL_TIMEOUT)? {
                Some(Event::Key(key)) if is_close_key(&key) => {
                    tracing::debug!("Display closed with {:?}", key.code);
                    return Ok(());
                }
                Some(Event::Resize(width, height)) => {
                    tracing::trace!("Resized to {}x{}", width, height);
                    self.draw(pass, Phase::Finished)?;
                }
                _ => {}
            }
        }
    }
}
