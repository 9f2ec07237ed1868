//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the data access contract for proofs and the admin allow-list.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository APIs surface storage, encoding and data-shape failures as
//!   distinct `RepoError` variants.

pub mod proof_repo;
