//! Tracing subscriber setup
//!
//! The TUI modes own the terminal, so they only log when given a file.
//! Headless training logs to stdout next to its progress banners.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::error::{Error, Result};

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info";

/// Where log events go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stdout,
    File(PathBuf),
    Disabled,
}

impl LogTarget {
    /// Pick the target for a mode
    ///
    /// An explicit file always wins. Without one, terminal UIs stay silent
    /// and headless runs log to stdout.
    pub fn for_mode(uses_terminal_ui: bool, log_file: Option<&Path>) -> Self {
        match (log_file, uses_terminal_ui) {
            (Some(path), _) => LogTarget::File(path.to_path_buf()),
            (None, true) => LogTarget::Disabled,
            (None, false) => LogTarget::Stdout,
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber
///
/// Does nothing if a subscriber is already installed.
pub fn init(target: &LogTarget) -> Result<()> {
    let installed = match target {
        LogTarget::Disabled => return Ok(()),
        LogTarget::Stdout => tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_target(false)
            .try_init(),
        LogTarget::File(path) => {
            let file = File::create(path).map_err(|source| Error::Io {
                operation: format!("create log file {}", path.display()),
                source,
            })?;
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
    };

    // A second init (e.g. from tests) keeps the first subscriber
    if let Err(err) = installed {
        tracing::debug!("subscriber already installed: {}", err);
    }
    Ok(())
}
