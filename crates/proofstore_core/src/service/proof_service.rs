//! Proof use-case service.
//!
//! # Responsibility
//! - Provide the store entry points used by request handlers.
//! - Resolve caller identities into the submitter filter.
//! - Emit metadata-only diagnostics for every operation.
//!
//! # Invariants
//! - Service APIs never bypass repository persistence contracts.
//! - A failed admin allow-list rebuild never returns to the caller.
//! - Identities and proof content are never written to logs.

use crate::model::identity::SubmitterIdentity;
use crate::model::proof::{Proof, ProofId};
use crate::repo::proof_repo::{ProofRepository, RepoResult};
use log::{debug, error, info};
use std::collections::BTreeSet;
use std::time::Instant;

/// Use-case service wrapper for proof storage.
pub struct ProofService<R: ProofRepository> {
    repo: R,
}

impl<R: ProofRepository> ProofService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Borrows the wrapped repository.
    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Inserts or replaces `proof`, returning its stable id.
    pub fn store(&self, proof: &Proof) -> RepoResult<ProofId> {
        observe("proof_store", || self.repo.store(proof))
    }

    /// Lists the user's unfinished proofs, excluding placeholder rows.
    pub fn get_user_proofs<U>(&self, user: &U) -> RepoResult<Vec<Proof>>
    where
        U: SubmitterIdentity + ?Sized,
    {
        observe("user_proofs", || {
            self.repo.get_user_proofs(user.submitter_identity())
        })
    }

    /// Lists the user's completed proofs.
    pub fn get_user_completed_proofs<U>(&self, user: &U) -> RepoResult<Vec<Proof>>
    where
        U: SubmitterIdentity + ?Sized,
    {
        observe("user_completed_proofs", || {
            self.repo.get_user_completed_proofs(user.submitter_identity())
        })
    }

    /// Lists the public catalog of repository problems.
    pub fn get_repo_proofs(&self) -> RepoResult<Vec<Proof>> {
        observe("repo_proofs", || self.repo.get_repo_proofs())
    }

    /// Lists every attempt at a problem an admin has submitted.
    pub fn get_all_attempted_repo_proofs(&self) -> RepoResult<Vec<Proof>> {
        observe("attempted_repo_proofs", || {
            self.repo.get_all_attempted_repo_proofs()
        })
    }

    /// Replaces the admin allow-list with exactly `admins`.
    ///
    /// # Panics
    /// - Panics when the allow-list cannot be rebuilt. Every admin-scoped read
    ///   depends on it, so the session must not continue.
    pub fn update_admins<I, S>(&self, admins: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let admins = admins.into_iter().map(Into::into).collect::<BTreeSet<_>>();
        if let Err(err) = observe("admins_update", || self.repo.update_admins(&admins)) {
            panic!("admin allow-list rebuild failed: {err}");
        }
        info!(
            "event=admins_update module=service status=applied admin_count={}",
            admins.len()
        );
    }

    /// Current admin allow-list, for diagnostics.
    pub fn admins(&self) -> RepoResult<Vec<String>> {
        observe("admins_list", || self.repo.admins())
    }

    /// Deletes every stored proof.
    pub fn empty(&self) -> RepoResult<()> {
        observe("proofs_empty", || self.repo.empty())
    }

    /// Releases the store. Consumes the service.
    pub fn close(self) -> RepoResult<()> {
        observe("store_close", || self.repo.close())
    }
}

trait Outcome {
    fn summary(&self) -> String;
}

impl Outcome for Vec<Proof> {
    fn summary(&self) -> String {
        format!("rows={}", self.len())
    }
}

impl Outcome for Vec<String> {
    fn summary(&self) -> String {
        format!("rows={}", self.len())
    }
}

impl Outcome for ProofId {
    fn summary(&self) -> String {
        format!("proof_id={self}")
    }
}

impl Outcome for () {
    fn summary(&self) -> String {
        String::new()
    }
}

fn observe<T: Outcome>(event: &'static str, op: impl FnOnce() -> RepoResult<T>) -> RepoResult<T> {
    let started_at = Instant::now();
    match op() {
        Ok(value) => {
            debug!(
                "event={} module=service status=ok duration_ms={} {}",
                event,
                started_at.elapsed().as_millis(),
                value.summary()
            );
            Ok(value)
        }
        Err(err) => {
            error!(
                "event={} module=service status=error duration_ms={} error={}",
                event,
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}
