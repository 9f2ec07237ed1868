//! Domain model for submitted logic proofs.
//!
//! # Responsibility
//! - Define the canonical proof record exchanged with callers.
//! - Define the identity capability used to scope per-user queries.
//!
//! # Invariants
//! - `(user_submitted, proof_name)` identifies at most one stored proof.
//! - Proof content (premises, body, conclusion) is opaque text to this crate.

pub mod identity;
pub mod proof;
