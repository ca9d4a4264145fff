use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use ionocond::config::RunConfig;
use ionocond::models::reference::reference_problem_def;
use ionocond::pipeline;
use ionocond::processing::csv_writer;
use ionocond::processing::summary::RunSummary;

/// Ionospheric Hall and Pedersen conductivity
#[derive(Parser)]
#[command(name = "ionocond")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Hall and Pedersen conductivity over a model grid", long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute conductivities over the reference profile
    Run {
        /// JSON run configuration; defaults are used when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Output directory, overrides the configuration
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Write the default configuration as JSON
    InitConfig { path: PathBuf },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Run { config, output } => run(config, output),
        Commands::InitConfig { path } => {
            RunConfig::default().save_to_file(&path)?;
            tracing::info!("Default configuration written to {}", path.display());
            Ok(())
        }
    }
}

fn run(config_path: Option<PathBuf>, output: Option<PathBuf>) -> anyhow::Result<()> {
    let mut config = match config_path {
        Some(path) => RunConfig::from_file(&path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => RunConfig::default(),
    };
    if let Some(dir) = output {
        config.output.directory = dir;
    }
    config.validate()?;

    let out_dir = config.output.directory.clone();
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    tracing::info!(
        keys = config.grid.num_keys(),
        "building reference profile"
    );
    let inputs = reference_problem_def(&config.grid, config.composition_unit)?;
    let result = pipeline::run(&inputs, &config.constants)?;

    let mut summary = RunSummary::from_run(&inputs, &result);

    if config.output.write_intermediate {
        let path = out_dir.join("aligned.csv");
        csv_writer::write_table(&path, &result.table()?)?;
        tracing::info!("Intermediate table saved to {}", path.display());
    }

    let conductivity = if config.output.drop_non_finite {
        result.conductivity.finite()
    } else {
        result.conductivity.clone()
    };
    let path = out_dir.join("conductivity.csv");
    csv_writer::write_table(&path, &conductivity.to_table())?;
    summary.add_export_info(conductivity.len());
    tracing::info!("Conductivity saved to {}", path.display());

    let path = out_dir.join("run_summary.txt");
    summary.write_to_file(&path)?;
    summary.log_summary();
    tracing::info!("Summary saved to {}", path.display());

    Ok(())
}
