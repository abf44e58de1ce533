//! Run-scoped logging context.
//!
//! Each run appends to `{input_dir}/logs/{stem}.log` and mirrors events to
//! stderr (filtered by `RUST_LOG`, default `warn`). ERROR events stay out of
//! the stderr mirror: they carry the run error, which `main` prints.
//!
//! The subscriber is never installed globally: callers execute the run inside
//! [`RunLog::in_scope`], and the log file is closed when the `RunLog` is
//! dropped.

use std::fs::{OpenOptions, create_dir_all};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{Dispatch, Level};
use tracing_subscriber::filter::{EnvFilter, LevelFilter, filter_fn};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::prelude::*;

use crate::error::AppError;

/// Target used for critical-severity events.
pub const CRITICAL_TARGET: &str = "critical";

/// Emit an ERROR event under the `critical` target.
#[macro_export]
macro_rules! critical {
    ($($arg:tt)+) => {
        ::tracing::error!(target: $crate::logging::CRITICAL_TARGET, $($arg)+)
    };
}

/// Logging handle for one run.
pub struct RunLog {
    dispatch: Dispatch,
    path: PathBuf,
}

impl RunLog {
    /// `{input_dir}/logs/{stem}.log`.
    pub fn log_path(input: &Path) -> PathBuf {
        let dir = input.parent().unwrap_or_else(|| Path::new(""));
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "curvefit".to_string());
        dir.join("logs").join(format!("{stem}.log"))
    }

    /// Open (append) the log file for `input` and build the run's subscriber.
    pub fn open(input: &Path) -> Result<Self, AppError> {
        Self::open_with_stderr(input, io::stderr)
    }

    fn open_with_stderr<W>(input: &Path, stderr: W) -> Result<Self, AppError>
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        let path = Self::log_path(input);
        if let Some(dir) = path.parent() {
            create_dir_all(dir).map_err(|source| AppError::Logging {
                path: path.clone(),
                source,
            })?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| AppError::Logging {
                path: path.clone(),
                source,
            })?;

        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_timer(ChronoLocal::rfc_3339())
            .with_filter(LevelFilter::INFO);

        let stderr_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let stderr_layer = tracing_subscriber::fmt::layer()
            .with_writer(stderr)
            .with_target(false)
            .with_filter(filter_fn(|meta| *meta.level() != Level::ERROR))
            .with_filter(stderr_filter);

        let subscriber = tracing_subscriber::registry()
            .with(file_layer)
            .with(stderr_layer);

        Ok(Self {
            dispatch: Dispatch::new(subscriber),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `f` with this log as the current subscriber.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tracing::{info, warn};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    #[test]
    fn log_path_sits_in_logs_dir_next_to_input() {
        assert_eq!(
            RunLog::log_path(Path::new("/data/run1/points.csv")),
            PathBuf::from("/data/run1/logs/points.log")
        );
        assert_eq!(
            RunLog::log_path(Path::new("points.csv")),
            PathBuf::from("logs/points.log")
        );
    }

    #[test]
    fn events_are_appended_to_the_run_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("series.csv");

        {
            let log = RunLog::open(&input).unwrap();
            log.in_scope(|| info!("first run"));
        }
        {
            let log = RunLog::open(&input).unwrap();
            log.in_scope(|| {
                info!("second run");
                crate::critical!("something broke");
            });
        }

        let text = std::fs::read_to_string(dir.path().join("logs").join("series.log")).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3, "{text}");
        assert!(lines[0].contains("INFO") && lines[0].contains("first run"));
        assert!(lines[1].contains("second run"));
        assert!(lines[2].contains("ERROR") && lines[2].contains("critical"));
        assert!(lines[2].contains("something broke"));
    }

    #[test]
    fn stderr_mirror_leaves_errors_to_main() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("mirror.csv");
        let captured = Captured::default();

        let sink = captured.clone();
        let log = RunLog::open_with_stderr(&input, move || sink.clone()).unwrap();
        log.in_scope(|| {
            warn!("skipping a short row");
            tracing::error!("Poor fit");
            crate::critical!("write failed");
        });

        let stderr = captured.text();
        assert!(stderr.contains("skipping a short row"), "{stderr}");
        assert!(!stderr.contains("Poor fit"), "{stderr}");
        assert!(!stderr.contains("write failed"), "{stderr}");

        let file = std::fs::read_to_string(log.path()).unwrap();
        assert!(file.contains("Poor fit") && file.contains("write failed"), "{file}");
    }
}
