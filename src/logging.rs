//! File-based logging setup
//!
//! The terminal belongs to the TUI, so logs only go to a file, and only when
//! one is requested via `--log-file` or the `POKEDEX_LOG` environment variable.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable naming a log file when `--log-file` is absent
pub const LOG_ENV_VAR: &str = "POKEDEX_LOG";

/// Picks the log file: the command-line path wins over the environment
pub fn resolve_log_path(cli_path: Option<&Path>) -> Option<PathBuf> {
    cli_path
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(LOG_ENV_VAR).map(PathBuf::from))
        .filter(|path| !path.as_os_str().is_empty())
}

/// Opens `path` for appending, creating parent directories as needed
pub fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Initialize tracing with file output.
///
/// Does nothing when `path` is `None`. The filter comes from `RUST_LOG`,
/// defaulting to `info`.
pub fn init_tracing(path: Option<&Path>) -> io::Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = open_log_file(path)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let file_layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .with_level(true);

    // A subscriber may already be installed (e.g. by a test harness)
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init();
    Ok(())
}
