//! Command payloads and their Markdown / one-line renderings.
//!
//! Renderers return strings; the binary decides where they go. JSON output is
//! the payload wrapped in an [`envelope`].

use std::fmt::Write as _;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use wr_common::SCHEMA_VERSION;

use crate::advisor::{InvestmentReport, StakeAnalysis};
use crate::advisory::display;
use crate::engine::{PosteriorSummary, Prediction, PredictiveMoments};
use crate::session::{OverallStats, SessionRecord};

/// Result of `winrate analyze`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Analysis {
    pub sessions: Vec<SessionRecord>,
    pub overall: OverallStats,
    pub posterior: PosteriorSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction: Option<Prediction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<TargetConfidence>,
}

/// Posterior confidence that the true rate beats a target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TargetConfidence {
    pub target: f64,
    pub probability: f64,
}

/// Result of `winrate predict`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Forecast {
    pub prediction: Prediction,
    /// Closed-form reference for the simulated figures.
    pub analytic: PredictiveMoments,
}

/// One sampled point of the posterior density.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DensityPoint {
    pub x: f64,
    pub density: f64,
}

impl From<(f64, f64)> for DensityPoint {
    fn from((x, density): (f64, f64)) -> Self {
        DensityPoint { x, density }
    }
}

/// Wrap a payload with the fields every JSON response carries.
pub fn envelope<T: Serialize>(
    command: &str,
    run_id: &str,
    config_hash: &str,
    payload: &T,
) -> serde_json::Result<serde_json::Value> {
    Ok(json!({
        "schema_version": SCHEMA_VERSION,
        "run_id": run_id,
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "command": command,
        "config_hash": config_hash,
        "result": serde_json::to_value(payload)?,
    }))
}

fn pct(p: f64) -> String {
    format!("{:.1}%", p * 100.0)
}

fn interval(ci: (f64, f64)) -> String {
    format!("[{}, {}]", pct(ci.0), pct(ci.1))
}

// ---------------------------------------------------------------------------
// analyze
// ---------------------------------------------------------------------------

pub fn analysis_md(analysis: &Analysis) -> String {
    let mut out = String::new();
    let o = &analysis.overall;
    let _ = writeln!(out, "# winrate analyze");
    let _ = writeln!(out);
    let _ = writeln!(out, "## Sessions");
    let _ = writeln!(out);
    let _ = writeln!(out, "| Session | Wins | Losses | Win rate |");
    let _ = writeln!(out, "|---|---:|---:|---:|");
    for s in &analysis.sessions {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} |",
            s.name,
            s.wins,
            s.losses,
            pct(s.win_rate)
        );
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "## Overall");
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "- Games: {} ({} W / {} L over {} sessions)",
        o.total_games, o.total_wins, o.total_losses, o.total_sessions
    );
    let _ = writeln!(out, "- Simple win rate: {}", pct(o.simple_win_rate));
    let _ = writeln!(out, "- Bayesian win rate: {}", pct(o.bayesian_win_rate));
    let _ = writeln!(out, "- 95% credible interval: {}", interval(o.credible_interval));
    let _ = writeln!(
        out,
        "- Posterior: Beta({:.2}, {:.2}), std {:.4}",
        analysis.posterior.posterior_alpha,
        analysis.posterior.posterior_beta,
        analysis.posterior.posterior_std
    );
    if let Some(target) = &analysis.target {
        let _ = writeln!(
            out,
            "- P(win rate > {}): {}",
            pct(target.target),
            pct(target.probability)
        );
    }
    if let Some(pred) = &analysis.prediction {
        let _ = writeln!(out);
        out.push_str(&prediction_section(pred));
    }
    out
}

pub fn analysis_summary(analysis: &Analysis) -> String {
    let o = &analysis.overall;
    let mut line = format!(
        "games={} win_rate={} ci95={}",
        o.total_games,
        pct(o.bayesian_win_rate),
        interval(o.credible_interval)
    );
    if let Some(t) = &analysis.target {
        let _ = write!(line, " p_above_{:.2}={:.3}", t.target, t.probability);
    }
    if let Some(p) = &analysis.prediction {
        let _ = write!(line, " next{}={:.1}±{:.1}", p.n_games, p.expected_wins, p.std_wins);
    }
    line
}

// ---------------------------------------------------------------------------
// predict
// ---------------------------------------------------------------------------

fn prediction_section(pred: &Prediction) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "## Next {} games", pred.n_games);
    let _ = writeln!(out);
    let _ = writeln!(out, "- Expected wins: {:.1}", pred.expected_wins);
    let _ = writeln!(out, "- Median wins: {:.1}", pred.median_wins);
    let _ = writeln!(out, "- Std dev: {:.2}", pred.std_wins);
    let _ = writeln!(out, "- Range: {} - {}", pred.min_wins, pred.max_wins);
    let _ = writeln!(out, "- Simulations: {}", pred.n_simulations);
    out
}

pub fn forecast_md(forecast: &Forecast) -> String {
    let mut out = String::from("# winrate predict\n\n");
    out.push_str(&prediction_section(&forecast.prediction));
    let _ = writeln!(
        out,
        "- Analytic mean / std: {:.2} / {:.2}",
        forecast.analytic.mean,
        forecast.analytic.variance.sqrt()
    );
    out
}

pub fn forecast_summary(forecast: &Forecast) -> String {
    let p = &forecast.prediction;
    format!(
        "next{} expected={:.1} median={:.1} std={:.2} range={}..{}",
        p.n_games, p.expected_wins, p.median_wins, p.std_wins, p.min_wins, p.max_wins
    )
}

// ---------------------------------------------------------------------------
// density
// ---------------------------------------------------------------------------

pub fn density_md(points: &[DensityPoint]) -> String {
    let mut out = String::from("# winrate density\n\n| x | density |\n|---:|---:|\n");
    for p in points {
        let _ = writeln!(out, "| {:.4} | {:.6} |", p.x, p.density);
    }
    out
}

/// Header plus one `x,density` row per point.
pub fn density_csv(points: &[DensityPoint]) -> String {
    let mut out = String::from("x,density\n");
    for p in points {
        let _ = writeln!(out, "{},{}", p.x, p.density);
    }
    out
}

// ---------------------------------------------------------------------------
// invest
// ---------------------------------------------------------------------------

fn stake_section(out: &mut String, title: &str, bankroll: f64, stake: &StakeAnalysis) {
    let risk = &stake.risk;
    let ev = &stake.expected_value;
    let _ = writeln!(out, "## {title}");
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "- Stake: {:.2} ({} of bankroll {:.2})",
        stake.bet_size,
        pct(risk.bet_to_bankroll_ratio),
        bankroll
    );
    let _ = writeln!(
        out,
        "- Risk of ruin over {} games: {} ({}) - {}",
        risk.n_games,
        pct(risk.risk_of_ruin),
        risk.risk_level,
        display::risk_text(risk)
    );
    let _ = writeln!(
        out,
        "- Expected value: {:+.2} ({:+.2}%), {:.0}% interval [{:+.2}, {:+.2}]",
        ev.expected_value,
        ev.ev_percentage,
        ev.credible_level * 100.0,
        ev.ev_credible_interval.0,
        ev.ev_credible_interval.1
    );
    let _ = writeln!(out, "- {}", display::ev_text(ev.advice));
    let _ = writeln!(out);
}

pub fn report_md(report: &InvestmentReport) -> String {
    let mut out = String::new();
    let k = &report.kelly_analysis;
    let _ = writeln!(out, "# winrate invest");
    let _ = writeln!(out);
    let _ = writeln!(out, "- Bankroll: {:.2}", report.bankroll);
    let _ = writeln!(out, "- Odds: {:.2}", report.win_odds);
    let _ = writeln!(out, "- Win probability: {}", pct(report.win_probability));
    let _ = writeln!(
        out,
        "- {:.0}% credible interval: {}",
        report.credible_level * 100.0,
        interval(report.credible_interval)
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "## Kelly");
    let _ = writeln!(out);
    let _ = writeln!(out, "- Fraction: {:.4}", k.kelly_fraction);
    let _ = writeln!(out, "- Full stake: {:.2}%", k.recommended_bet_percentage);
    let _ = writeln!(out, "- Conservative stake: {:.2}%", k.conservative_bet_percentage);
    let _ = writeln!(out, "- Growth rate: {:.5}", k.expected_growth_rate);
    let _ = writeln!(out, "- {}", display::kelly_text(k.advice));
    let _ = writeln!(out);
    if let Some(full) = &report.full_kelly {
        stake_section(&mut out, "Full Kelly", report.bankroll, full);
    }
    if let Some(half) = &report.half_kelly {
        stake_section(&mut out, "Conservative Kelly", report.bankroll, half);
    }
    let _ = writeln!(out, "## Recommendation");
    let _ = writeln!(out);
    for line in display::overall_lines(&report.recommendation) {
        let _ = writeln!(out, "{line}");
    }
    out
}

pub fn report_summary(report: &InvestmentReport) -> String {
    let head = format!(
        "p={} kelly={:.4}",
        pct(report.win_probability),
        report.kelly_analysis.kelly_fraction
    );
    match &report.half_kelly {
        Some(half) => format!(
            "{head} stake={:.2} risk={} ev={:+.2}%",
            half.bet_size, half.risk.risk_level, half.expected_value.ev_percentage
        ),
        None => format!("{head} decision=do_not_bet"),
    }
}
