//! Terminal mode management
//!
//! While samples stream in, the chart is drawn on the alternate screen with
//! the cursor hidden and raw mode left off, so `Ctrl-C` still raises SIGINT.
//! The final blocking display switches raw mode on to read keys from the
//! controlling terminal. `TerminalModes` tracks what was enabled and undoes
//! exactly that.

use anyhow::Result;
use crossterm::{
    cursor::{Hide, Show},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use std::io::{stdout, Write};

/// Tracks which terminal modes have been enabled and provides cleanup.
#[derive(Debug, Default)]
pub struct TerminalModes {
    raw_mode: bool,
    alternate_screen: bool,
    cursor_hidden: bool,
}

impl TerminalModes {
    /// Create a new TerminalModes with nothing enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter the alternate screen and hide the cursor.
    ///
    /// On error, undoes any partially enabled modes.
    pub fn enable() -> Result<Self> {
        let mut modes = Self::new();

        if let Err(e) = stdout().execute(EnterAlternateScreen) {
            tracing::error!("Failed to enter alternate screen: {}", e);
            return Err(e.into());
        }
        modes.alternate_screen = true;
        tracing::debug!("Entered alternate screen");

        if let Err(e) = stdout().execute(Hide) {
            tracing::warn!("Failed to hide cursor: {}", e);
        } else {
            modes.cursor_hidden = true;
        }

        Ok(modes)
    }

    /// Switch raw mode on; a no-op if it already is.
    pub fn enable_raw_mode(&mut self) -> Result<()> {
        if self.raw_mode {
            return Ok(());
        }
        enable_raw_mode()?;
        self.raw_mode = true;
        tracing::debug!("Enabled raw mode");
        Ok(())
    }

    /// Restore terminal to original state by disabling all enabled modes.
    ///
    /// Safe to call multiple times.
    pub fn undo(&mut self) {
        if self.raw_mode {
            let _ = disable_raw_mode();
            self.raw_mode = false;
            tracing::debug!("Disabled raw mode");
        }

        if self.cursor_hidden {
            let _ = stdout().execute(Show);
            self.cursor_hidden = false;
        }

        // Leave alternate screen last
        if self.alternate_screen {
            let _ = stdout().execute(LeaveAlternateScreen);
            self.alternate_screen = false;
            tracing::debug!("Left alternate screen");
        }

        let _ = stdout().flush();
    }
}

impl Drop for TerminalModes {
    fn drop(&mut self) {
        self.undo();
    }
}

/// Unconditionally restore terminal state without tracking.
///
/// For the panic hook and the interrupt handler, which have no access to
/// the `TerminalModes` instance.
pub fn emergency_cleanup() {
    let _ = disable_raw_mode();
    let _ = stdout().execute(Show);
    let _ = stdout().execute(LeaveAlternateScreen);
    let _ = stdout().flush();
}
