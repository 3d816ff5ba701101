use anyhow::{Result, anyhow};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install a file-backed subscriber. Stdout and stderr belong to the TUI, so nothing
/// is written to the terminal. Keep the guard alive until exit or buffered lines
/// are lost.
pub fn init_logger() -> Result<WorkerGuard> {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| default_directive());

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("sentiment")
        .filename_suffix("log")
        .build(log_dir()?)?;
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_new(&log_level)?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true),
        )
        .try_init()?;

    Ok(guard)
}

/// Like `init_logger`, but a failure only disables logging.
pub fn init_or_warn() -> Option<WorkerGuard> {
    keep_running(init_logger())
}

fn keep_running(installed: Result<WorkerGuard>) -> Option<WorkerGuard> {
    match installed {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("warning: logging disabled: {}", e);
            None
        }
    }
}

/// Debug for this crate's own targets, info for everything else.
fn default_directive() -> String {
    let crate_target = module_path!().split("::").next().unwrap_or("sentiment");
    format!("info,{}=debug", crate_target)
}

fn log_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_local_dir()
        .ok_or_else(|| anyhow!("Could not determine data directory"))?;

    Ok(data_dir.join("sentiment-tui").join("logs"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive_targets_this_crate() {
        let root = module_path!().split("::").next().unwrap();
        assert_eq!(default_directive(), format!("info,{}=debug", root));
        assert_eq!(default_directive(), "info,sentiment=debug");
    }

    #[test]
    fn test_failed_logger_does_not_stop_startup() {
        let guard = keep_running(Err(anyhow!("Could not determine data directory")));
        assert!(guard.is_none());
    }

    #[test]
    fn test_default_directive_parses() {
        assert!(EnvFilter::try_new(default_directive()).is_ok());
    }
}
