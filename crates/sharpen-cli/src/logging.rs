//! Log setup: stderr always, plus an optional plain-text file.
//!
//! `RUST_LOG` overrides the level picked from `-v`/`-q`.

use anyhow::{Context, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Console verbosity from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verbosity {
    verbose: u8,
    quiet: bool,
}

impl Verbosity {
    pub fn new(verbose: u8, quiet: bool) -> Self {
        Self { verbose, quiet }
    }

    /// Base filter directive.
    pub fn level(&self) -> &'static str {
        if self.quiet {
            return "warn";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }

    /// Flags that reproduce this verbosity in a child process.
    pub fn to_args(&self) -> Vec<String> {
        if self.quiet {
            vec!["--quiet".into()]
        } else {
            (0..self.verbose).map(|_| "--verbose".to_string()).collect()
        }
    }
}

/// Installs the global subscriber.
///
/// Keep the returned guard alive until exit so the file sink is flushed.
pub fn init(verbosity: Verbosity, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(verbosity.level()))
        .context("Invalid log filter")?;

    let console = fmt::layer()
        .with_target(verbosity.verbose > 0)
        .with_writer(std::io::stderr);

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
            let name = path
                .file_name()
                .with_context(|| format!("Log path has no file name: {}", path.display()))?;
            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_target(true)
                .with_thread_names(true)
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .try_init()
        .context("Logger initialization failed")?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels() {
        assert_eq!(Verbosity::new(0, false).level(), "info");
        assert_eq!(Verbosity::new(1, false).level(), "debug");
        assert_eq!(Verbosity::new(5, false).level(), "trace");
        assert_eq!(Verbosity::new(0, true).level(), "warn");
    }

    #[test]
    fn test_child_args() {
        assert_eq!(Verbosity::new(2, false).to_args(), vec!["--verbose", "--verbose"]);
        assert_eq!(Verbosity::new(0, true).to_args(), vec!["--quiet"]);
        assert!(Verbosity::new(0, false).to_args().is_empty());
    }
}
