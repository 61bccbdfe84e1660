/*!
 * Logging Module
 * Subscriber setup for the API: console, rolling files, request middleware
 */
pub mod middleware;

use std::{io, path::PathBuf};
use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Crates whose noise is capped regardless of `LOG_LEVEL`.
const DEPENDENCY_DIRECTIVES: &str = "tower_http=debug,axum=debug,sqlx=warn,lettre=info";

/// What `init` needs from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct LogSettings {
    pub production: bool,
    pub level: String,
    pub dir: PathBuf,
}

impl LogSettings {
    /// `ENVIRONMENT`, `LOG_LEVEL` and `LOG_DIR`; the level defaults to
    /// `info` in production and `debug` elsewhere.
    pub fn from_env() -> Self {
        let production = std::env::var("ENVIRONMENT").is_ok_and(|e| e == "production");
        let level = std::env::var("LOG_LEVEL")
            .ok()
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| if production { "info" } else { "debug" }.to_string());
        let dir = std::env::var("LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("logs"));

        Self {
            production,
            level,
            dir,
        }
    }

    /// Directive used when `RUST_LOG` is unset.
    pub fn filter_directive(&self) -> String {
        format!(
            "{}={},{}",
            env!("CARGO_CRATE_NAME"),
            self.level.trim(),
            DEPENDENCY_DIRECTIVES
        )
    }
}

/// Initialize the logging system.
///
/// Hold the returned guards for the lifetime of the process; dropping them
/// stops the background writers.
pub fn init() -> Vec<WorkerGuard> {
    let settings = LogSettings::from_env();

    // A missing log directory only costs the file output
    if let Err(e) = std::fs::create_dir_all(&settings.dir) {
        eprintln!("cannot create log directory {}: {}", settings.dir.display(), e);
    }

    // Everything, and errors on their own
    let (file_writer, file_guard) = non_blocking(rolling::daily(&settings.dir, "app.log"));
    let (error_writer, error_guard) = non_blocking(rolling::daily(&settings.dir, "error.log"));
    let (console_writer, console_guard) = non_blocking(io::stdout());

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.filter_directive()));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if settings.production {
        // JSON everywhere so the host's collector can parse it
        let file_layer = fmt::layer()
            .json()
            .with_writer(file_writer)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true);

        let error_layer = fmt::layer()
            .json()
            .with_writer(error_writer)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_filter(tracing_subscriber::filter::LevelFilter::ERROR);

        let console_layer = fmt::layer()
            .json()
            .with_writer(console_writer)
            .with_target(false);

        subscriber
            .with(file_layer)
            .with(error_layer)
            .with(console_layer)
            .init();
    } else {
        // Pretty console, plain file; error.log stays empty in development
        let file_layer = fmt::layer()
            .with_writer(file_writer)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false);

        let console_layer = fmt::layer()
            .with_writer(console_writer)
            .with_target(true)
            .pretty();

        subscriber.with(file_layer).with(console_layer).init();
        drop(error_writer);
    }

    tracing::info!(
        production = settings.production,
        level = %settings.level,
        dir = %settings.dir.display(),
        "Logging initialized"
    );

    vec![file_guard, error_guard, console_guard]
}
