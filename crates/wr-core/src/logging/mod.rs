//! Structured logging for the winrate analyzer.
//!
//! Two output modes, both on stderr:
//! - human-readable lines for interactive use
//! - JSONL for agents and scripted pipelines
//!
//! stdout is reserved for command payloads.
//!
//! # Usage
//!
//! ```ignore
//! use wr_core::logging::{init_logging, LogConfig, LogContext, Stage, event_names};
//!
//! init_logging(&LogConfig::from_env(None, None));
//! let ctx = LogContext::new(generate_run_id(), "invest");
//! let _run = ctx.span().entered();
//! log_event!(INFO, event_names::RUN_STARTED, Stage::Init, "starting", odds = 2.0);
//! ```

pub mod config;
pub mod events;
pub mod layer;

pub use config::{LogConfig, LogFormat, LogLevel};
pub use events::{event_names, Level, LogContext, Stage};
pub use layer::JsonlLayer;

use std::io::IsTerminal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber.
///
/// `RUST_LOG` directives, when present and valid, replace the level from
/// `config`. Calling this twice is a no-op for the second call.
pub fn init_logging(config: &LogConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("wr_core={}", config.level)));

    let result = match config.format {
        LogFormat::Human => {
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(std::io::stderr().is_terminal());
            if config.timestamps {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt_layer)
                    .try_init()
            } else {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt_layer.without_time())
                    .try_init()
            }
        }
        LogFormat::Jsonl => tracing_subscriber::registry()
            .with(filter)
            .with(JsonlLayer::stderr())
            .try_init(),
    };
    // A subscriber already installed (tests, embedding callers) keeps priority.
    let _ = result;
}

/// Unique ID for this invocation, e.g. `run-1f0c2a9d8e7b`.
pub fn generate_run_id() -> String {
    let uuid = uuid::Uuid::new_v4().simple().to_string();
    format!("run-{}", &uuid[..12])
}

/// Emit an event with a stable name and stage.
///
/// ```ignore
/// log_event!(DEBUG, event_names::ENGINE_UPDATED, Stage::Ingest, "posterior updated",
///     wins = 3u64, losses = 1u64);
/// ```
#[macro_export]
macro_rules! log_event {
    (INFO, $event:expr, $stage:expr, $msg:expr $(, $key:ident = $val:expr)* $(,)?) => {
        tracing::info!(event = $event, stage = %$stage, $($key = $val,)* "{}", $msg)
    };
    (DEBUG, $event:expr, $stage:expr, $msg:expr $(, $key:ident = $val:expr)* $(,)?) => {
        tracing::debug!(event = $event, stage = %$stage, $($key = $val,)* "{}", $msg)
    };
    (WARN, $event:expr, $stage:expr, $msg:expr $(, $key:ident = $val:expr)* $(,)?) => {
        tracing::warn!(event = $event, stage = %$stage, $($key = $val,)* "{}", $msg)
    };
    (ERROR, $event:expr, $stage:expr, $msg:expr $(, $key:ident = $val:expr)* $(,)?) => {
        tracing::error!(event = $event, stage = %$stage, $($key = $val,)* "{}", $msg)
    };
}
