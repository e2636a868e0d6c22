use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "infinity.log";

/// Route tracing output to a file under `dir`; the terminal belongs to the UI.
///
/// `RUST_LOG` wins over the default level. Keep the returned guard alive for
/// as long as logs should be flushed.
pub fn init(dir: &Path, verbose: bool) -> Result<(WorkerGuard, PathBuf)> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::never(dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {e}"))?;

    Ok((guard, dir.join(LOG_FILE)))
}

fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "infinity=debug,infinity_loader=debug"
    } else {
        "infinity=info,infinity_loader=info"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_raises_level() {
        assert!(default_directive(true).contains("debug"));
        assert!(!default_directive(false).contains("debug"));
        assert!(EnvFilter::try_new(default_directive(true)).is_ok());
    }
}
