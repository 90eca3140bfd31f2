use clap::{Args, Parser, Subcommand};
use config::{CommonConfig, Config, ConfigError};
use metrics_exporter_statsd::StatsdBuilder;
use secrets_sync::{LoadError, StoreError};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

mod config;

#[derive(Parser)]
#[command(name = "sync-overview", about = "Load the secrets sync overview")]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Load the overview once and print it as JSON
    Load(ConfigArgs),
    /// Parse and validate a config file
    CheckConfig(ConfigArgs),
    /// Print the metrics this tool can emit
    ListMetrics,
}

#[derive(Args)]
struct ConfigArgs {
    #[arg(long, short)]
    config: PathBuf,
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("could not build record store: {0}")]
    Store(#[from] StoreError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("could not start runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("could not encode overview: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("could not install metrics recorder: {0}")]
    Metrics(String),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        CliCommand::Load(args) => {
            let config = load_config(&args)?;
            let _sentry = init_observability(&config.common)?;
            let loader = config.secrets_sync.build_loader()?;

            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            let overview = rt.block_on(loader.load())?;

            println!("{}", serde_json::to_string_pretty(&overview)?);
        }
        CliCommand::CheckConfig(args) => {
            load_config(&args)?;
            println!("{}: ok", args.config.display());
        }
        CliCommand::ListMetrics => {
            let all: Vec<_> = aggregator::metrics_defs::ALL_METRICS
                .iter()
                .chain(secrets_sync::metrics_defs::ALL_METRICS)
                .copied()
                .collect();
            print!("{}", shared::metrics_defs::describe_all(&all));
        }
    }
    Ok(())
}

fn load_config(args: &ConfigArgs) -> Result<Config, ConfigError> {
    let config = Config::from_file(&args.config)?;
    config.validate()?;
    Ok(config)
}

/// Sets up logging, Sentry and the statsd exporter.
///
/// The returned guard flushes pending Sentry events when dropped and must be
/// held until the program exits.
fn init_observability(
    common: &CommonConfig,
) -> Result<Option<sentry::ClientInitGuard>, CliError> {
    let sentry_guard = match &common.logging {
        Some(logging) => Some(sentry::init(sentry::ClientOptions {
            dsn: Some(logging.dsn()?),
            release: sentry::release_name!(),
            ..Default::default()
        })),
        None => None,
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            sentry_guard
                .is_some()
                .then(sentry::integrations::tracing::layer),
        )
        .init();

    if let Some(metrics_config) = &common.metrics {
        let recorder = StatsdBuilder::from(&metrics_config.statsd_host, metrics_config.statsd_port)
            .build(Some(metrics_config.prefix.as_str()))
            .map_err(|e| CliError::Metrics(e.to_string()))?;
        metrics::set_global_recorder(recorder).map_err(|e| CliError::Metrics(e.to_string()))?;
        tracing::info!(
            host = %metrics_config.statsd_host,
            port = metrics_config.statsd_port,
            "Sending metrics to statsd"
        );
    }

    Ok(sentry_guard)
}
