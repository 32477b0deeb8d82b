//! Logging and error reporting
//!
//! - Structured logging via `tracing` with an `EnvFilter`
//! - stderr output for humans, optional daily-rolling JSON file for machines
//! - `log` records bridged into `tracing`
//! - miette-rendered reports for failures surfaced by the binary

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::OnceLock;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::core::generation::{ErrorKind, GenerationFailure};

const LOG_FILE_NAME: &str = "contentgen.log";

static TERMINAL_CAPS: OnceLock<TerminalCapabilities> = OnceLock::new();

fn get_terminal_caps() -> &'static TerminalCapabilities {
    TERMINAL_CAPS.get_or_init(TerminalCapabilities::detect)
}

// ============================================================================
// Configuration
// ============================================================================

/// `[logging]` config section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,
    /// Write a JSON log file alongside stderr output
    pub json_file: bool,
    /// Override the log directory
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_file: false,
            log_dir: None,
        }
    }
}

impl LoggingConfig {
    /// Resolved log directory (override or XDG data dir)
    pub fn log_dir(&self) -> PathBuf {
        self.log_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .map(|d| d.join("contentgen").join("logs"))
                .unwrap_or_else(|| PathBuf::from("logs"))
        })
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.level))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

// ============================================================================
// Terminal Capability Detection
// ============================================================================

/// Detected terminal capabilities
#[derive(Debug, Clone)]
pub struct TerminalCapabilities {
    pub supports_unicode: bool,
    pub is_interactive: bool,
}

impl TerminalCapabilities {
    pub fn detect() -> Self {
        use is_terminal::IsTerminal;

        let is_interactive = io::stderr().is_terminal();

        // Unicode support heuristic
        let supports_unicode = std::env::var("TERM")
            .map(|t| !t.contains("dumb"))
            .unwrap_or(true)
            && std::env::var("LANG")
                .map(|l| l.contains("UTF-8") || l.contains("utf8"))
                .unwrap_or(true);

        Self {
            supports_unicode,
            is_interactive,
        }
    }

    pub fn should_colorize(&self) -> bool {
        self.is_interactive && std::env::var_os("NO_COLOR").is_none()
    }
}

// ============================================================================
// Logging Initialization
// ============================================================================

/// Build the subscriber without installing it.
///
/// Returns the stderr layer (stdout is reserved for command output) plus an
/// optional JSON file layer with daily rotation. The guard flushes the file
/// writer on drop.
pub fn build_subscriber(
    config: &LoggingConfig,
) -> (impl tracing::Subscriber + Send + Sync + 'static, Option<WorkerGuard>) {
    let mut guard = None;

    let file_layer = if config.json_file {
        let log_dir = config.log_dir();
        if !log_dir.exists() {
            if let Err(e) = fs::create_dir_all(&log_dir) {
                eprintln!("Failed to create logs directory: {}", e);
            }
        }

        let file_appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE_NAME);
        let (non_blocking, file_guard) = tracing_appender::non_blocking(file_appender);
        guard = Some(file_guard);

        Some(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .json()
                .with_file(true)
                .with_line_number(true)
                .with_target(true)
                .with_filter(config.filter()),
        )
    } else {
        None
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(get_terminal_caps().should_colorize())
        .with_target(false)
        .with_filter(config.filter());

    let subscriber = tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer);

    (subscriber, guard)
}

/// Initialize logging.
///
/// Installs [`build_subscriber`] globally, bridges `log` records into
/// `tracing`, and sets the miette report hook.
///
/// The returned guard must be kept alive for the life of the process.
pub fn init(config: &LoggingConfig) -> Option<WorkerGuard> {
    let (subscriber, guard) = build_subscriber(config);

    if let Err(e) = subscriber.try_init() {
        eprintln!("Logging already initialized: {}", e);
    }

    // Redirect `log` macros to `tracing`; a no-op when the subscriber did it already
    if let Err(e) = tracing_log::LogTracer::init() {
        tracing::debug!("LogTracer not installed: {}", e);
    }

    init_miette();

    if config.json_file {
        log::info!(
            "Logging initialized. Writing to: {:?} (daily rolling)",
            config.log_dir().join(LOG_FILE_NAME)
        );
    }

    guard
}

/// Configure miette for error reporting
pub fn init_miette() {
    let caps = get_terminal_caps();

    miette::set_hook(Box::new(move |_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .unicode(caps.supports_unicode)
                .context_lines(3)
                .tab_width(4)
                .break_words(true)
                .color(caps.should_colorize())
                .build(),
        )
    }))
    .ok(); // Ignore if already set
}

// ============================================================================
// Error Reports
// ============================================================================

/// A pipeline failure rendered for a terminal user
#[derive(Debug, Error, Diagnostic)]
#[error("Generation failed ({kind}): {message}")]
#[diagnostic(code("contentgen::generation"))]
pub struct GenerationReport {
    pub kind: ErrorKind,
    pub message: String,

    #[help]
    pub suggestion: Option<String>,
}

impl From<&GenerationFailure> for GenerationReport {
    fn from(failure: &GenerationFailure) -> Self {
        Self {
            kind: failure.kind,
            message: failure.message.clone(),
            suggestion: failure.diagnostics.suggestion.clone(),
        }
    }
}
