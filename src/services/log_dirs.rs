//! Log file location
//!
//! Logs live in `$XDG_STATE_HOME/livechart/logs/` (via `dirs::state_dir`),
//! falling back to the system temp directory on platforms without a state
//! dir. Each run writes `livechart-{PID}.log`; logs left behind by dead
//! processes are removed once they are a day old.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::{Duration, SystemTime};

/// Minimum age for log files to be cleaned up (24 hours)
const CLEANUP_AGE: Duration = Duration::from_secs(24 * 60 * 60);

const LOG_PREFIX: &str = "livechart-";

static LOG_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Base log directory, created on first use.
pub fn log_dir() -> &'static PathBuf {
    LOG_DIR.get_or_init(|| {
        let fallback = std::env::temp_dir().join("livechart-logs");
        let dir = dirs::state_dir()
            .map(|state| state.join("livechart").join("logs"))
            .unwrap_or_else(|| fallback.clone());

        if let Err(e) = fs::create_dir_all(&dir) {
            tracing::warn!("Failed to create log directory {:?}: {}", dir, e);
            let _ = fs::create_dir_all(&fallback);
            return fallback;
        }

        dir
    })
}

/// `{log_dir}/livechart-{PID}.log`
pub fn main_log_path() -> PathBuf {
    log_dir().join(format!("{LOG_PREFIX}{}.log", std::process::id()))
}

/// Remove day-old log files whose process is gone.
pub fn cleanup_stale_logs() {
    cleanup_stale_logs_in_dir(log_dir(), std::process::id());
}

fn cleanup_stale_logs_in_dir(dir: &Path, current_pid: u32) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let file_name = entry.file_name();
        let Some(pid) = extract_pid_from_filename(&file_name.to_string_lossy()) else {
            continue;
        };
        if pid == current_pid {
            continue;
        }

        if entry.file_type().map(|t| t.is_file()).unwrap_or(false)
            && is_file_older_than(&entry.path(), CLEANUP_AGE)
            && !is_process_running(pid)
        {
            if let Err(e) = fs::remove_file(entry.path()) {
                tracing::debug!("Failed to clean up stale log {:?}: {}", entry.path(), e);
            } else {
                tracing::debug!("Cleaned up stale log file: {:?}", entry.path());
            }
        }
    }
}

fn is_file_older_than(path: &Path, age: Duration) -> bool {
    let Ok(modified) = fs::metadata(path).and_then(|m| m.modified()) else {
        return false;
    };

    SystemTime::now()
        .duration_since(modified)
        .map(|elapsed| elapsed > age)
        .unwrap_or(false)
}

/// PID from a name like `livechart-12345.log`
fn extract_pid_from_filename(name: &str) -> Option<u32> {
    name.strip_prefix(LOG_PREFIX)?
        .strip_suffix(".log")?
        .parse()
        .ok()
}

fn is_process_running(pid: u32) -> bool {
    #[cfg(unix)]
    {
        // Signal 0 only probes for existence
        unsafe {
            libc::kill(pid as libc::pid_t, 0) == 0
                || std::io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
        }
    }

    #[cfg(not(unix))]
    {
        let _ = pid;
        true
    }
}
