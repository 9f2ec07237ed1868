//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `proofstore_core` linkage.
//! - Report the repository catalog size for the configured database.

use proofstore_core::{init_logging, ProofService, SqliteProofStore, StoreConfig};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("proofstore_core ping={}", proofstore_core::ping());
    println!("proofstore_core version={}", proofstore_core::core_version());

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("proofstore_cli: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    let config = StoreConfig::from_env().map_err(|err| err.to_string())?;
    if let Some(log_dir) = config.log_dir.as_ref() {
        init_logging(config.log_level, log_dir).map_err(|err| err.to_string())?;
    }

    let store = SqliteProofStore::open(&config.db_path)
        .map_err(|err| format!("open {} failed: {err}", config.db_path.display()))?;
    let service = ProofService::new(store);

    let catalog = service.get_repo_proofs().map_err(|err| err.to_string())?;
    let admins = service.admins().map_err(|err| err.to_string())?;
    let attempts = service
        .get_all_attempted_repo_proofs()
        .map_err(|err| err.to_string())?;
    println!("db_path={}", config.db_path.display());
    println!(
        "admins={} repo_proofs={} attempted_repo_proofs={}",
        admins.len(),
        catalog.len(),
        attempts.len()
    );
    log::info!(
        "event=cli_summary module=cli status=ok repo_proofs={} attempted_repo_proofs={}",
        catalog.len(),
        attempts.len()
    );

    service.close().map_err(|err| err.to_string())
}
