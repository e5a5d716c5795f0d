//! Stable event vocabulary for structured logs.
//!
//! Every event carries an `event` name from [`event_names`] and a [`Stage`];
//! the JSONL layer lifts both to top-level keys.

use serde::{Deserialize, Serialize};

/// Log levels as they appear in JSONL output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<tracing::Level> for Level {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE => Level::Trace,
            tracing::Level::DEBUG => Level::Debug,
            tracing::Level::INFO => Level::Info,
            tracing::Level::WARN => Level::Warn,
            tracing::Level::ERROR => Level::Error,
        }
    }
}

/// Phases of an analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Startup and configuration loading.
    Init,
    /// Feeding observations into the posterior.
    Ingest,
    /// Posterior queries (mean, interval, density).
    Infer,
    /// Monte Carlo work.
    Simulate,
    /// Kelly sizing, ruin risk, expected value.
    Advise,
    /// Rendering the final payload.
    Report,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Init => "init",
            Stage::Ingest => "ingest",
            Stage::Infer => "infer",
            Stage::Simulate => "simulate",
            Stage::Advise => "advise",
            Stage::Report => "report",
        };
        f.write_str(s)
    }
}

/// Standard event names used in logging.
pub mod event_names {
    // Run lifecycle
    pub const RUN_STARTED: &str = "run.started";
    pub const RUN_FINISHED: &str = "run.finished";

    // Config
    pub const CONFIG_LOADED: &str = "config.loaded";
    pub const CONFIG_DEFAULT_USED: &str = "config.default_used";
    pub const CONFIG_ERROR: &str = "config.error";

    // Posterior engine
    pub const ENGINE_CREATED: &str = "engine.created";
    pub const ENGINE_UPDATED: &str = "engine.updated";
    pub const ENGINE_RESET: &str = "engine.reset";
    pub const INFER_PREDICTED: &str = "infer.predicted";

    // Monte Carlo runner
    pub const SIMULATE_STARTED: &str = "simulate.started";
    pub const SIMULATE_FINISHED: &str = "simulate.finished";

    // Stake advisor
    pub const ADVISOR_KELLY_COMPUTED: &str = "advisor.kelly_computed";
    pub const ADVISOR_RISK_SIMULATED: &str = "advisor.risk_simulated";
    pub const ADVISOR_RISK_SHORT_CIRCUIT: &str = "advisor.risk_short_circuit";
    pub const ADVISOR_NO_EDGE: &str = "advisor.no_edge";
    pub const ADVISOR_EV_COMPUTED: &str = "advisor.ev_computed";

    pub const REPORT_GENERATED: &str = "report.generated";
    pub const SESSION_ADDED: &str = "session.added";

    pub const INTERNAL_ERROR: &str = "internal_error";
}

/// Correlation data shared by every event of one CLI invocation.
#[derive(Debug, Clone)]
pub struct LogContext {
    pub run_id: String,
    /// Subcommand being executed.
    pub command: String,
}

impl LogContext {
    pub fn new(run_id: impl Into<String>, command: impl Into<String>) -> Self {
        LogContext {
            run_id: run_id.into(),
            command: command.into(),
        }
    }

    /// Root span for the run; the JSONL layer copies its `run_id` onto
    /// every event emitted inside it.
    pub fn span(&self) -> tracing::Span {
        tracing::info_span!("run", run_id = %self.run_id, command = %self.command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_display_matches_serde() {
        for stage in [
            Stage::Init,
            Stage::Ingest,
            Stage::Infer,
            Stage::Simulate,
            Stage::Advise,
            Stage::Report,
        ] {
            let json = serde_json::to_string(&stage).unwrap();
            assert_eq!(json, format!("\"{}\"", stage));
        }
    }

    #[test]
    fn test_level_from_tracing() {
        assert_eq!(Level::from(tracing::Level::INFO), Level::Info);
        assert_eq!(Level::from(tracing::Level::DEBUG), Level::Debug);
        assert_eq!(Level::from(tracing::Level::WARN), Level::Warn);
    }

    #[test]
    fn test_event_names_are_dotted() {
        assert_eq!(event_names::ENGINE_UPDATED, "engine.updated");
        assert_eq!(
            event_names::ADVISOR_RISK_SHORT_CIRCUIT,
            "advisor.risk_short_circuit"
        );
    }

    #[test]
    fn test_log_context() {
        let ctx = LogContext::new("run-abc", "invest");
        assert_eq!(ctx.run_id, "run-abc");
        assert_eq!(ctx.command, "invest");
    }
}
