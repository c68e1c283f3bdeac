//! Command-line entry point for the WSL forecaster
//!
//! Each pipeline step is a subcommand: split a raw match history, train and
//! calibrate a model, evaluate it on the held-out matches, predict fixtures
//! and serve predictions over HTTP.

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};
use wsl_forecast::artifact::{save_evaluation, ModelArtifact, TrainingSummary};
use wsl_forecast::calibration::{evaluate_walk_forward, Calibrator};
use wsl_forecast::config::AppConfig;
use wsl_forecast::data::fixtures::average_home_win_probability;
use wsl_forecast::data::{
    chronological_split, load_matches, predict_fixtures, read_fixtures, save_matches,
    write_predictions,
};
use wsl_forecast::metrics::MetricsCollector;
use wsl_forecast::service::{InferenceServer, ServerConfig};

const TRAIN_FILE: &str = "train.csv";
const VAL_FILE: &str = "val.csv";
const TEST_FILE: &str = "test.csv";

/// WSL Forecast - Elo match outcome forecasting
#[derive(Parser)]
#[command(
    name = "wsl-forecast",
    version,
    about = "Elo ratings and Davidson outcome probabilities for league football",
    long_about = "Fits Elo ratings to a chronological match history, calibrates K, home \
                 advantage and the Davidson draw parameter on a validation split, and \
                 predicts home-win/draw/away-win probabilities for upcoming fixtures."
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        global = true,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        global = true,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Enable debug mode
    #[arg(short, long, global = true, help = "Enable debug mode with verbose logging")]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a match history and split it into train/val/test CSVs
    Preprocess {
        #[arg(long, value_name = "FILE")]
        input: PathBuf,

        #[arg(long, value_name = "DIR")]
        output_dir: PathBuf,

        #[arg(long, value_name = "PCT")]
        train_pct: Option<f64>,

        #[arg(long, value_name = "PCT")]
        val_pct: Option<f64>,
    },

    /// Calibrate over the parameter grid and write the model artifact
    Train {
        #[arg(long, value_name = "DIR")]
        data_dir: PathBuf,

        #[arg(long, value_name = "DIR")]
        model_dir: PathBuf,

        #[arg(long, help = "Score grid points one at a time")]
        serial: bool,
    },

    /// Walk-forward evaluation of a trained model on the test split
    Evaluate {
        #[arg(long, value_name = "DIR")]
        data_dir: PathBuf,

        #[arg(long, value_name = "DIR")]
        model_dir: PathBuf,

        #[arg(long, value_name = "DIR", help = "Where to write evaluation.json")]
        output_dir: Option<PathBuf>,
    },

    /// Predict one match or a fixtures file
    Predict(PredictArgs),

    /// Serve predictions over HTTP
    Serve {
        #[arg(long, value_name = "DIR")]
        model_dir: PathBuf,

        #[arg(long, value_name = "HOST")]
        host: Option<String>,

        #[arg(long, value_name = "PORT")]
        port: Option<u16>,
    },
}

#[derive(ClapArgs)]
struct PredictArgs {
    #[arg(long, value_name = "DIR")]
    model_dir: PathBuf,

    #[arg(long, requires = "away", conflicts_with = "fixtures")]
    home: Option<String>,

    #[arg(long, requires = "home")]
    away: Option<String>,

    #[arg(long, value_name = "FILE", requires = "output")]
    fixtures: Option<PathBuf>,

    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Gameweek label for fixtures that carry none
    #[arg(long, default_value = "")]
    gameweek: String,
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Load configuration from a file or the environment, then apply CLI overrides
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    match &args.command {
        Command::Preprocess {
            train_pct, val_pct, ..
        } => {
            if let Some(train_pct) = train_pct {
                config.data.train_pct = *train_pct;
            }
            if let Some(val_pct) = val_pct {
                config.data.val_pct = *val_pct;
            }
        }
        Command::Train { serial: true, .. } => config.calibration.parallel = false,
        Command::Serve { host, port, .. } => {
            if let Some(host) = host {
                config.service.host = host.clone();
            }
            if let Some(port) = port {
                config.service.port = *port;
            }
        }
        _ => {}
    }

    wsl_forecast::config::validate_config(&config)?;
    Ok(config)
}

fn preprocess(config: &AppConfig, input: &Path, output_dir: &Path) -> Result<()> {
    let records = load_matches(input)?;
    let split = chronological_split(records, config.data.train_pct, config.data.val_pct)?;

    save_matches(&output_dir.join(TRAIN_FILE), &split.train)?;
    save_matches(&output_dir.join(VAL_FILE), &split.val)?;
    save_matches(&output_dir.join(TEST_FILE), &split.test)?;

    info!(
        "Split into {} train, {} validation, {} test matches under {}",
        split.train.len(),
        split.val.len(),
        split.test.len(),
        output_dir.display()
    );
    Ok(())
}

fn train(config: &AppConfig, data_dir: &Path, model_dir: &Path) -> Result<()> {
    let train_matches = load_matches(&data_dir.join(TRAIN_FILE))?;
    let val_matches = load_matches(&data_dir.join(VAL_FILE))?;

    let result = Calibrator::new(config.calibration.clone()).train(&train_matches, &val_matches)?;

    let artifact = ModelArtifact::from_model(&result.model);
    artifact.save(model_dir)?;
    TrainingSummary::from(&result).save(model_dir)?;

    info!(
        "Trained model {} (K={}, home_adv={}, nu={}, val_score={:.5})",
        artifact.model_id,
        result.best_config.k,
        result.best_config.home_adv,
        result.best_config.nu,
        result.best_score
    );
    Ok(())
}

fn evaluate(data_dir: &Path, model_dir: &Path, output_dir: &Path) -> Result<()> {
    let mut model = ModelArtifact::load(model_dir)?.into_model()?;
    let test_matches = load_matches(&data_dir.join(TEST_FILE))?;

    let report = evaluate_walk_forward(&mut model, &test_matches)?;
    save_evaluation(output_dir, &report)?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn predict(args: &PredictArgs) -> Result<()> {
    let model = ModelArtifact::load(&args.model_dir)?.into_model()?;

    match (&args.home, &args.away, &args.fixtures, &args.output) {
        (Some(home), Some(away), _, _) => {
            let prediction = model.predict(home, away);
            println!("{}", serde_json::to_string_pretty(&prediction)?);
        }
        (_, _, Some(fixtures_path), Some(output_path)) => {
            let file = File::open(fixtures_path)
                .with_context(|| format!("Failed to open {}", fixtures_path.display()))?;
            let fixtures = read_fixtures(BufReader::new(file))?;
            let rows = predict_fixtures(&model, &fixtures, &args.gameweek);

            if let Some(parent) = output_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let out = File::create(output_path)
                .with_context(|| format!("Failed to create {}", output_path.display()))?;
            write_predictions(out, &rows)?;

            info!(
                "Wrote {} predictions to {} (average home-win probability {:.3})",
                rows.len(),
                output_path.display(),
                average_home_win_probability(&rows)
            );
        }
        _ => anyhow::bail!("Either --home/--away or --fixtures/--output is required"),
    }
    Ok(())
}

async fn serve(config: &AppConfig, model_dir: &Path) -> Result<()> {
    let artifact = ModelArtifact::load(model_dir)?;
    let model_id = artifact.model_id.to_string();
    let model = Arc::new(artifact.into_model()?);
    let collector = Arc::new(MetricsCollector::new()?);

    let server = Arc::new(InferenceServer::new(
        ServerConfig {
            host: config.service.host.clone(),
            port: config.service.port,
        },
        model,
        model_id,
        collector,
    ));

    let shutdown = {
        let server = server.clone();
        tokio::spawn(async move {
            wait_for_shutdown_signal().await;
            server.stop();
        })
    };

    let served = server.start().await;
    shutdown.abort();
    served
}

/// Wait for shutdown signals (SIGINT, SIGTERM)
async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C) signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    info!("{} v{}", config.service.name, wsl_forecast::VERSION);

    match &args.command {
        Command::Preprocess {
            input, output_dir, ..
        } => preprocess(&config, input, output_dir),
        Command::Train {
            data_dir,
            model_dir,
            ..
        } => train(&config, data_dir, model_dir),
        Command::Evaluate {
            data_dir,
            model_dir,
            output_dir,
        } => evaluate(
            data_dir,
            model_dir,
            output_dir.as_deref().unwrap_or(model_dir),
        ),
        Command::Predict(predict_args) => predict(predict_args),
        Command::Serve { model_dir, .. } => serve(&config, model_dir).await,
    }
}
