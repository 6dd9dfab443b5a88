//! Process-wide logging initialisation.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use tracing_subscriber::EnvFilter;

static LOG_FILE: OnceLock<PathBuf> = OnceLock::new();

/// Initialise logging for the process, writing to a timestamp-named file
/// under `log_dir`. Returns the path of the active log file.
///
/// Explicit init-once semantics: a second call changes nothing and returns
/// the path chosen by the first.
pub fn init_logging(log_dir: &Path) -> std::io::Result<PathBuf> {
    if let Some(existing) = LOG_FILE.get() {
        return Ok(existing.clone());
    }

    fs::create_dir_all(log_dir)?;
    let path = log_dir.join(format!(
        "recorder {}.log",
        chrono::Local::now().format("%Y-%m-%d %H-%M-%S")
    ));
    let file = fs::File::create(&path)?;

    let result = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .try_init();
    if result.is_err() {
        // A subscriber was installed elsewhere in the process; logs keep
        // flowing there and the file stays empty.
        eprintln!("logging already initialised outside the recorder");
    }

    let _ = LOG_FILE.set(path.clone());
    Ok(path)
}
