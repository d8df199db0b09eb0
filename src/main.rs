use std::sync::Arc;

use clap::Parser;
use worklog::cli::commands::Cli;
use worklog::integrations::summary;
use worklog::io::{config_io, logging};
use worklog::store::{RecordStore, SqliteStore};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env is fine
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config_path = match &cli.config {
        Some(p) => p.clone(),
        None => config_io::default_config_path()?,
    };
    let config = config_io::read_config(&config_path)?;

    let log_path = config_io::resolve_log_path(&config, cli.log_file.as_deref())?;
    let _log_guard = logging::init_logging(&log_path, &config.log.level)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), config = %config_path.display(), "worklog starting");

    let db_path = config_io::resolve_store_path(&config, cli.db.as_deref())?;
    let store: Arc<dyn RecordStore> = Arc::new(SqliteStore::open(&db_path)?);
    tracing::info!(db = %db_path.display(), "store opened");

    if cli.summarize || config.summary.enabled {
        // Detached: the job must not hold up quitting
        let _ = summary::spawn_startup_summary(
            Arc::clone(&store),
            config.summary.clone(),
            config.notify.clone(),
        );
    }

    let result = worklog::tui::run(store, &config.ui);
    match &result {
        Ok(()) => tracing::info!("worklog exiting"),
        Err(e) => tracing::error!(error = %e, "session ended with error"),
    }
    result
}
