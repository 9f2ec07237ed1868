//! Persistence core for submitted logic proofs.
//! Stores proof attempts and answers the user and repository listings.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, StoreConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::identity::SubmitterIdentity;
pub use model::proof::{
    CompletionStatus, EntryType, Proof, ProofId, ProofType, PLACEHOLDER_PROOF_NAME,
    REPOSITORY_NAME_PREFIX,
};
pub use repo::proof_repo::{ProofRepository, RepoError, RepoResult, SqliteProofStore};
pub use service::proof_service::ProofService;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
