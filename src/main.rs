use clap::{Parser, Subcommand};
use std::process::ExitCode;
use std::sync::Arc;

use conjscan::catalog::CatalogStore;
use conjscan::config::Config;
use conjscan::conjunction::ConjunctionStore;
use conjscan::ingestion::{IngestionLogStore, IngestionService, SpaceTrackClient};
use conjscan::schedule::{run_ingestion_schedule, CronExpr};
use conjscan::screening::Screener;
use conjscan::web::{run_server, AppState};

#[derive(Parser)]
#[command(name = "conjscan")]
#[command(about = "Satellite conjunction screening service")]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server and the ingestion scheduler
    Serve,
    /// Run a one-shot catalog sync
    Sync,
    /// Run a one-shot screening pass
    Screen,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let config = match Config::from_file(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error reading config {}: {}", cli.config, e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Serve => serve(config),
        Commands::Sync => sync(config),
        Commands::Screen => screen(config),
    }
}

fn build_state(config: &Config) -> Result<AppState, Box<dyn std::error::Error>> {
    let base = &config.data.base_dir;
    let catalog = Arc::new(CatalogStore::open(base)?);
    let conjunctions = Arc::new(ConjunctionStore::open(base)?);

    let client = SpaceTrackClient::new(config.ingestion.spacetrack.clone())?;
    let logs = IngestionLogStore::open(base)?;
    let ingestion = Arc::new(IngestionService::new(
        client,
        catalog.clone(),
        logs,
        config.ingestion.batch_size,
    ));

    let screener = Arc::new(Screener::new(
        catalog.clone(),
        conjunctions.clone(),
        config.screening.clone(),
    ));

    Ok(AppState {
        catalog,
        conjunctions,
        ingestion,
        screener,
    })
}

fn serve(config: Config) -> ExitCode {
    let state = match build_state(&config) {
        Ok(state) => state,
        Err(e) => {
            eprintln!("Startup error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let cron = match CronExpr::parse(&config.ingestion.schedule) {
        Ok(cron) => cron,
        Err(e) => {
            eprintln!("Invalid ingestion schedule: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    runtime.block_on(async {
        tokio::spawn(run_ingestion_schedule(state.ingestion.clone(), cron));

        match run_server(&config.web.bind, state).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Server error: {}", e);
                ExitCode::FAILURE
            }
        }
    })
}

fn sync(config: Config) -> ExitCode {
    let state = match build_state(&config) {
        Ok(state) => state,
        Err(e) => {
            eprintln!("Startup error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let report = runtime.block_on(state.ingestion.sync());
    println!(
        "Sync {}: {} processed, {} created, {} updated, {} skipped, {} deleted",
        if report.successful { "completed" } else { "FAILED" },
        report.objects_processed,
        report.objects_created,
        report.objects_updated,
        report.objects_skipped,
        report.objects_deleted
    );

    if report.successful {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn screen(config: Config) -> ExitCode {
    let state = match build_state(&config) {
        Ok(state) => state,
        Err(e) => {
            eprintln!("Startup error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match state.screener.run(chrono::Utc::now()) {
        Ok(report) => {
            println!(
                "Screening completed in {}ms: {} satellites, {} candidate pairs, {} detections, {} events, {} conjunctions",
                report.duration_ms,
                report.satellites,
                report.candidate_pairs,
                report.detections,
                report.events,
                report.conjunctions
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Screening error: {}", e);
            ExitCode::FAILURE
        }
    }
}
