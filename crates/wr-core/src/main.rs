//! winrate CLI entry point.
//!
//! Bayesian win-rate estimation and bankroll advice from win/loss records.
//! Command payloads go to stdout; logs and errors go to stderr.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::field::display;
use wr_common::{format_error_human, Error, OutputFormat, StructuredError, SCHEMA_VERSION};
use wr_config::{load_config, ConfigSource, LoadedConfig};
use wr_core::advisor::{InvestmentReport, StakeAdvisor};
use wr_core::engine::PosteriorEngine;
use wr_core::exit_codes::ExitCode;
use wr_core::log_event;
use wr_core::logging::config::ENV_LOG_FORMAT;
use wr_core::logging::{
    event_names, generate_run_id, init_logging, LogConfig, LogContext, LogFormat, LogLevel, Stage,
};
use wr_core::output::{self, Analysis, DensityPoint, Forecast, TargetConfidence};
use wr_core::session::SessionLog;
use wr_core::simulate::SimulationConfig;

/// Winrate Analyzer - Bayesian win-rate estimation and stake advice
#[derive(Parser)]
#[command(name = "winrate")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "json")]
    format: OutputFormat,

    /// Path to priors.json (overrides WINRATE_PRIORS and config dirs)
    #[arg(long, global = true)]
    priors: Option<PathBuf>,

    /// Path to policy.json (overrides WINRATE_POLICY and config dirs)
    #[arg(long, global = true)]
    policy: Option<PathBuf>,

    /// Fixed seed for reproducible simulations
    #[arg(long, global = true, env = "WINRATE_SEED")]
    seed: Option<u64>,

    /// Simulation worker threads
    #[arg(long, global = true)]
    workers: Option<usize>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease verbosity (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze win/loss sessions: rates, credible interval, forecast
    Analyze(AnalyzeArgs),

    /// Investment report: Kelly stake, ruin risk and expected value
    Invest(InvestArgs),

    /// Posterior-predictive forecast of wins over the next games
    Predict(PredictArgs),

    /// Posterior density points for an external plotter
    Density(DensityArgs),

    /// Configuration management
    Config(ConfigArgs),

    /// Print the JSON Schema of a command payload
    Schema(SchemaArgs),

    /// Print version information
    Version,
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Analyze(_) => "analyze",
            Commands::Invest(_) => "invest",
            Commands::Predict(_) => "predict",
            Commands::Density(_) => "density",
            Commands::Config(_) => "config",
            Commands::Schema(_) => "schema",
            Commands::Version => "version",
        }
    }
}

/// One win/loss record.
#[derive(Args, Debug)]
struct ObservationArgs {
    /// Observed wins
    #[arg(long, allow_negative_numbers = true)]
    wins: i64,

    /// Observed losses
    #[arg(long, allow_negative_numbers = true)]
    losses: i64,
}

#[derive(Args, Debug)]
struct AnalyzeArgs {
    /// Wins per session, comma separated
    #[arg(long, value_delimiter = ',', required = true, allow_negative_numbers = true)]
    wins: Vec<i64>,

    /// Losses per session, comma separated
    #[arg(long, value_delimiter = ',', required = true, allow_negative_numbers = true)]
    losses: Vec<i64>,

    /// Session names, comma separated (defaults to "Session N")
    #[arg(long, value_delimiter = ',')]
    names: Vec<String>,

    /// Also forecast wins over this many future games
    #[arg(long)]
    predict: Option<u64>,

    /// Report the probability that the true win rate exceeds this value
    #[arg(long)]
    target: Option<f64>,
}

#[derive(Args, Debug)]
struct InvestArgs {
    #[command(flatten)]
    observations: ObservationArgs,

    /// Decimal odds: total return per unit staked on a win
    #[arg(long)]
    odds: f64,

    /// Bankroll to size stakes against
    #[arg(long, default_value_t = 1000.0)]
    bankroll: f64,
}

#[derive(Args, Debug)]
struct PredictArgs {
    #[command(flatten)]
    observations: ObservationArgs,

    /// Number of future games
    #[arg(long)]
    games: u64,

    /// Simulation draws (defaults to the policy value)
    #[arg(long)]
    simulations: Option<usize>,
}

#[derive(Args, Debug)]
struct DensityArgs {
    #[command(flatten)]
    observations: ObservationArgs,

    /// Number of evenly spaced points over [0, 1]
    #[arg(long, default_value_t = 101)]
    points: usize,
}

#[derive(Args, Debug)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show the resolved configuration and where it came from
    Show,
    /// Validate priors and policy, exit non-zero when unusable
    Check,
}

#[derive(Args, Debug)]
struct SchemaArgs {
    /// Payload to describe
    #[arg(long, value_enum, default_value = "report")]
    kind: SchemaKind,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SchemaKind {
    Report,
    Analysis,
    Forecast,
    Density,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            let code = if err.use_stderr() {
                ExitCode::ArgsError
            } else {
                ExitCode::Clean
            };
            std::process::exit(code.as_i32());
        }
    };

    init_logging(&log_config(&cli.global));

    let ctx = LogContext::new(generate_run_id(), cli.command.name());
    let span = ctx.span();
    let exit_code = {
        let _run = span.enter();
        log_event!(
            INFO,
            event_names::RUN_STARTED,
            Stage::Init,
            "starting command",
            version = env!("CARGO_PKG_VERSION")
        );

        let result = match &cli.command {
            Commands::Analyze(args) => run_analyze(&cli.global, &ctx, args),
            Commands::Invest(args) => run_invest(&cli.global, &ctx, args),
            Commands::Predict(args) => run_predict(&cli.global, &ctx, args),
            Commands::Density(args) => run_density(&cli.global, &ctx, args),
            Commands::Config(args) => match args.command {
                ConfigCommands::Show => run_config_show(&cli.global, &ctx),
                ConfigCommands::Check => run_config_check(&cli.global, &ctx),
            },
            Commands::Schema(args) => run_schema(args),
            Commands::Version => {
                print_version(&cli.global);
                Ok(ExitCode::Clean)
            }
        };
        let code = result.unwrap_or_else(|err| report_error(&cli.global, &err));

        log_event!(
            INFO,
            event_names::RUN_FINISHED,
            Stage::Report,
            "command finished",
            exit_code = code.as_i32()
        );
        code
    };

    std::process::exit(exit_code.as_i32());
}

/// `-q` wins over `-v`; JSON payloads get JSONL logs unless the format is
/// set through the environment.
fn log_config(global: &GlobalOpts) -> LogConfig {
    let cli_level = if global.quiet {
        Some(LogLevel::Error)
    } else if global.verbose > 0 {
        Some(LogLevel::Warn.more_verbose(global.verbose))
    } else {
        None
    };
    let config = LogConfig::from_env(cli_level, None);
    if global.format == OutputFormat::Json && std::env::var_os(ENV_LOG_FORMAT).is_none() {
        config.with_format(LogFormat::Jsonl)
    } else {
        config
    }
}

/// Outcome of a command that ran to completion.
type CmdResult = Result<ExitCode, CmdError>;

/// Failures are either domain errors or output that could not be produced.
enum CmdError {
    Domain(Error),
    Output(serde_json::Error),
}

impl From<Error> for CmdError {
    fn from(err: Error) -> Self {
        CmdError::Domain(err)
    }
}

impl From<wr_config::ConfigError> for CmdError {
    fn from(err: wr_config::ConfigError) -> Self {
        CmdError::Domain(err.into())
    }
}

fn report_error(global: &GlobalOpts, err: &CmdError) -> ExitCode {
    match err {
        CmdError::Domain(err) => {
            let code = ExitCode::from(err);
            match global.format {
                OutputFormat::Json => {
                    let structured =
                        StructuredError::from(err).with_context("exit_code", code.code_name());
                    eprintln!("{}", structured.to_json());
                }
                _ => eprintln!("{}", format_error_human(err, !global.no_color)),
            }
            code
        }
        CmdError::Output(err) => {
            log_event!(
                ERROR,
                event_names::INTERNAL_ERROR,
                Stage::Report,
                "failed to render output",
                error = display(err)
            );
            eprintln!("winrate: failed to render output: {err}");
            ExitCode::InternalError
        }
    }
}

fn load(global: &GlobalOpts) -> Result<LoadedConfig, CmdError> {
    let mut config = match load_config(global.priors.as_deref(), global.policy.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            log_event!(
                ERROR,
                event_names::CONFIG_ERROR,
                Stage::Init,
                "configuration unusable",
                kind = display(err.kind()),
                error = display(&err)
            );
            return Err(err.into());
        }
    };

    if config.paths.priors_source == ConfigSource::BuiltinDefault
        && config.paths.policy_source == ConfigSource::BuiltinDefault
    {
        log_event!(
            DEBUG,
            event_names::CONFIG_DEFAULT_USED,
            Stage::Init,
            "no config files found, using built-in defaults"
        );
    } else {
        log_event!(
            INFO,
            event_names::CONFIG_LOADED,
            Stage::Init,
            "configuration loaded",
            priors_source = display(config.paths.priors_source),
            policy_source = display(config.paths.policy_source),
            config_id = config.snapshot.short_id()
        );
    }

    if let Some(seed) = global.seed {
        config.policy.simulation.seed = Some(seed);
    }
    if let Some(workers) = global.workers {
        config.policy.simulation.workers = Some(workers);
    }
    Ok(config)
}

fn engine_with(config: &LoadedConfig, obs: &ObservationArgs) -> Result<PosteriorEngine, Error> {
    let mut engine = PosteriorEngine::from_priors(&config.priors)?;
    engine.update(obs.wins, obs.losses)?;
    Ok(engine)
}

/// Print a JSON envelope, Markdown or a one-line summary.
fn emit<T: Serialize>(
    global: &GlobalOpts,
    ctx: &LogContext,
    config: &LoadedConfig,
    payload: &T,
    md: impl FnOnce(&T) -> String,
    summary: impl FnOnce(&T) -> String,
) -> Result<(), CmdError> {
    match global.format {
        OutputFormat::Json => {
            let value = output::envelope(
                &ctx.command,
                &ctx.run_id,
                &config.snapshot.combined_hash,
                payload,
            )
            .map_err(CmdError::Output)?;
            let text = serde_json::to_string_pretty(&value).map_err(CmdError::Output)?;
            println!("{text}");
        }
        OutputFormat::Md => print!("{}", md(payload)),
        OutputFormat::Summary => println!("{}", summary(payload).trim_end()),
    }
    Ok(())
}

fn usage_error(global: &GlobalOpts, message: &str) -> ExitCode {
    let code = ExitCode::ArgsError;
    match global.format {
        OutputFormat::Json => eprintln!(
            "{}",
            serde_json::json!({ "error": message, "exit_code": code.code_name() })
        ),
        _ => eprintln!("winrate: {message}"),
    }
    code
}

// ============================================================================
// Command implementations
// ============================================================================

fn run_analyze(global: &GlobalOpts, ctx: &LogContext, args: &AnalyzeArgs) -> CmdResult {
    if args.wins.len() != args.losses.len() {
        return Ok(usage_error(
            global,
            &format!(
                "--wins has {} sessions but --losses has {}",
                args.wins.len(),
                args.losses.len()
            ),
        ));
    }
    if !args.names.is_empty() && args.names.len() != args.wins.len() {
        return Ok(usage_error(
            global,
            "--names must list one name per session",
        ));
    }

    let config = load(global)?;
    let mut log = SessionLog::new(PosteriorEngine::from_priors(&config.priors)?);
    for (i, (&wins, &losses)) in args.wins.iter().zip(&args.losses).enumerate() {
        log.add_session(wins, losses, args.names.get(i).map(String::as_str))?;
    }

    let target = match args.target {
        Some(target) => Some(TargetConfidence {
            target,
            probability: log.confidence_above(target)?,
        }),
        None => None,
    };
    let prediction = match args.predict {
        Some(n_games) => Some(log.predict_future(
            n_games,
            config.policy.simulation.predictive_simulations,
            &SimulationConfig::from_policy(&config.policy.simulation),
        )?),
        None => None,
    };

    let analysis = Analysis {
        sessions: log.sessions().to_vec(),
        overall: log.overall_stats(),
        posterior: log.engine().summary(),
        prediction,
        target,
    };
    emit(global, ctx, &config, &analysis, output::analysis_md, output::analysis_summary)?;
    Ok(ExitCode::Clean)
}

fn run_invest(global: &GlobalOpts, ctx: &LogContext, args: &InvestArgs) -> CmdResult {
    let config = load(global)?;
    let engine = engine_with(&config, &args.observations)?;
    let report = StakeAdvisor::with_policy(&engine, config.policy.clone())
        .generate_investment_report(args.bankroll, args.odds)?;

    emit(global, ctx, &config, &report, output::report_md, output::report_summary)?;
    Ok(if report.is_no_bet() {
        ExitCode::NoBet
    } else {
        ExitCode::Clean
    })
}

fn run_predict(global: &GlobalOpts, ctx: &LogContext, args: &PredictArgs) -> CmdResult {
    let config = load(global)?;
    let engine = engine_with(&config, &args.observations)?;
    let simulations = args
        .simulations
        .unwrap_or(config.policy.simulation.predictive_simulations);
    let forecast = Forecast {
        prediction: engine.predict_next_n(
            args.games,
            simulations,
            &SimulationConfig::from_policy(&config.policy.simulation),
        )?,
        analytic: engine.predictive_moments(args.games),
    };

    emit(global, ctx, &config, &forecast, output::forecast_md, output::forecast_summary)?;
    Ok(ExitCode::Clean)
}

fn run_density(global: &GlobalOpts, ctx: &LogContext, args: &DensityArgs) -> CmdResult {
    if args.points == 0 {
        return Ok(usage_error(global, "--points must be at least 1"));
    }
    let config = load(global)?;
    let engine = engine_with(&config, &args.observations)?;
    let points: Vec<DensityPoint> = engine
        .probability_density(args.points)
        .map(DensityPoint::from)
        .collect();

    emit(
        global,
        ctx,
        &config,
        &points,
        |p| output::density_md(p),
        |p| output::density_csv(p),
    )?;
    Ok(ExitCode::Clean)
}

fn run_config_show(global: &GlobalOpts, ctx: &LogContext) -> CmdResult {
    let config = load(global)?;
    let snapshot = &config.snapshot;

    match global.format {
        OutputFormat::Json => {
            let response = serde_json::json!({
                "schema_version": SCHEMA_VERSION,
                "run_id": ctx.run_id,
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "snapshot": snapshot,
                "priors": &config.priors,
                "policy": &config.policy,
            });
            let text = serde_json::to_string_pretty(&response).map_err(CmdError::Output)?;
            println!("{text}");
        }
        OutputFormat::Summary => {
            println!(
                "[{}] config: priors={} policy={}",
                snapshot.short_id(),
                snapshot
                    .priors_path
                    .as_deref()
                    .unwrap_or("built-in defaults"),
                snapshot
                    .policy_path
                    .as_deref()
                    .unwrap_or("built-in defaults")
            );
        }
        OutputFormat::Md => {
            println!("# winrate config show");
            println!();
            println!("## Priors");
            match &snapshot.priors_path {
                Some(path) => {
                    println!("Source: {} ({})", path, snapshot.priors_source);
                    println!("Hash: {}", snapshot.priors_hash.as_deref().unwrap_or("n/a"));
                }
                None => println!("Source: **built-in defaults** (no priors.json found)"),
            }
            println!(
                "Prior: Beta({}, {})",
                config.priors.prior_alpha, config.priors.prior_beta
            );
            println!();
            println!("## Policy");
            match &snapshot.policy_path {
                Some(path) => {
                    println!("Source: {} ({})", path, snapshot.policy_source);
                    println!("Hash: {}", snapshot.policy_hash.as_deref().unwrap_or("n/a"));
                }
                None => println!("Source: **built-in defaults** (no policy.json found)"),
            }
            println!("Credible level: {}", config.policy.credible_level);
            println!("Half-Kelly multiplier: {}", config.policy.half_kelly_multiplier);
            println!("Ruin trials: {}", config.policy.simulation.ruin_trials);
            println!();
            println!("Config id: {}", snapshot.short_id());
        }
    }
    Ok(ExitCode::Clean)
}

fn run_config_check(global: &GlobalOpts, ctx: &LogContext) -> CmdResult {
    let config = load(global)?;
    match global.format {
        OutputFormat::Json => {
            let response = serde_json::json!({
                "schema_version": SCHEMA_VERSION,
                "run_id": ctx.run_id,
                "status": "ok",
                "priors_source": config.paths.priors_source.to_string(),
                "policy_source": config.paths.policy_source.to_string(),
                "config_hash": config.snapshot.combined_hash,
            });
            let text = serde_json::to_string_pretty(&response).map_err(CmdError::Output)?;
            println!("{text}");
        }
        _ => println!("config ok ({})", config.snapshot.short_id()),
    }
    Ok(ExitCode::Clean)
}

fn run_schema(args: &SchemaArgs) -> CmdResult {
    let schema = match args.kind {
        SchemaKind::Report => schemars::schema_for!(InvestmentReport),
        SchemaKind::Analysis => schemars::schema_for!(Analysis),
        SchemaKind::Forecast => schemars::schema_for!(Forecast),
        SchemaKind::Density => schemars::schema_for!(Vec<DensityPoint>),
    };
    let text = serde_json::to_string_pretty(&schema).map_err(CmdError::Output)?;
    println!("{text}");
    Ok(ExitCode::Clean)
}

fn print_version(global: &GlobalOpts) {
    match global.format {
        OutputFormat::Json => {
            let version_info = serde_json::json!({
                "schema_version": SCHEMA_VERSION,
                "winrate_version": env!("CARGO_PKG_VERSION"),
                "rust_version": env!("CARGO_PKG_RUST_VERSION"),
            });
            println!("{version_info:#}");
        }
        _ => {
            println!("winrate {}", env!("CARGO_PKG_VERSION"));
            println!("schema version: {}", SCHEMA_VERSION);
        }
    }
}
