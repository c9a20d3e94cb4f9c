//! Interrupt handling
//!
//! A user interrupt is a clean way to stop watching a stream: the handler
//! restores the terminal, flushes queued diagnostics and exits with `0`.

use super::diagnostics::DeferredDiagnostics;
use super::terminal_modes;

/// Exit code used when the user interrupts the run.
pub const INTERRUPT_EXIT_CODE: i32 = 0;

/// Install the SIGINT handler.
///
/// `diagnostics` is the queue the ingest loop reports into; whatever is
/// still pending is written to stderr before the process exits. Terminal
/// modes are reset only when `restore_terminal` is set.
pub fn install_interrupt_handler(
    diagnostics: Option<DeferredDiagnostics>,
    restore_terminal: bool,
) -> anyhow::Result<()> {
    ctrlc::set_handler(move || {
        tracing::info!("Interrupted, exiting");
        if restore_terminal {
            terminal_modes::emergency_cleanup();
        }
        if let Some(diagnostics) = &diagnostics {
            diagnostics.flush();
        }
        std::process::exit(INTERRUPT_EXIT_CODE);
    })?;
    Ok(())
}
