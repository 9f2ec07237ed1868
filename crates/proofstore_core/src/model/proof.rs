//! Proof domain model.
//!
//! # Responsibility
//! - Define the record persisted for every submitted proof attempt.
//! - Fix the wire shape shared with the web front end.
//!
//! # Invariants
//! - `id` and `time_submitted` are assigned by the store; caller values are
//!   ignored on write.
//! - `premise`, `logic` and `rules` keep element order and exact text.

use serde::{Deserialize, Serialize};

/// Store-assigned surrogate key.
pub type ProofId = i64;

/// Name prefix marking proofs started from a repository problem.
pub const REPOSITORY_NAME_PREFIX: &str = "Repository - ";

/// Placeholder proof name that user-facing listings never return.
pub const PLACEHOLDER_PROOF_NAME: &str = "n/a";

/// Entry discriminator. Only proofs exist today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    #[default]
    Proof,
}

/// Logic system a proof is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProofType {
    /// Propositional (truth-functional) logic.
    #[default]
    Prop,
    /// First-order logic.
    Fol,
}

/// Outcome of the last proof check, as reported by the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CompletionStatus {
    #[serde(rename = "true")]
    Completed,
    #[default]
    #[serde(rename = "false")]
    Incomplete,
    #[serde(rename = "error")]
    Error,
}

/// One submitted proof attempt.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proof {
    /// Absent on input; always set on records read back from the store.
    #[serde(default)]
    pub id: Option<ProofId>,
    #[serde(default)]
    pub entry_type: EntryType,
    /// Empty for drafts not yet attributed to a user.
    #[serde(default)]
    pub user_submitted: String,
    #[serde(default)]
    pub proof_name: String,
    #[serde(default)]
    pub proof_type: ProofType,
    /// Starting assumptions, one well-formed formula per element.
    #[serde(default, alias = "Premise")]
    pub premise: Vec<String>,
    /// Proof body; opaque serialized lines.
    #[serde(default, alias = "Logic")]
    pub logic: Vec<String>,
    /// Deprecated; new clients always send an empty list.
    #[serde(default, alias = "Rules")]
    pub rules: Vec<String>,
    #[serde(default)]
    pub proof_completed: CompletionStatus,
    #[serde(default)]
    pub conclusion: String,
    #[serde(default, with = "bool_text")]
    pub repo_problem: bool,
    #[serde(default)]
    pub time_submitted: Option<String>,
}

impl Proof {
    /// Creates an empty, incomplete proof for `user_submitted` named `proof_name`.
    pub fn new(
        user_submitted: impl Into<String>,
        proof_name: impl Into<String>,
        proof_type: ProofType,
    ) -> Self {
        Self {
            user_submitted: user_submitted.into(),
            proof_name: proof_name.into(),
            proof_type,
            ..Self::default()
        }
    }

    /// Sets premises and conclusion in one step.
    pub fn with_problem<I, S>(mut self, premise: I, conclusion: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.premise = premise.into_iter().map(Into::into).collect();
        self.conclusion = conclusion.into();
        self
    }

    /// Whether the name carries the repository marker.
    pub fn has_repository_name(&self) -> bool {
        self.proof_name.starts_with(REPOSITORY_NAME_PREFIX)
    }

    /// Whether this is a placeholder row hidden from user listings.
    pub fn is_placeholder(&self) -> bool {
        self.proof_name == PLACEHOLDER_PROOF_NAME
    }

    pub fn is_completed(&self) -> bool {
        self.proof_completed == CompletionStatus::Completed
    }

    /// Exact `(premise, conclusion)` equality; no whitespace or formula
    /// normalization.
    pub fn same_problem(&self, other: &Proof) -> bool {
        self.premise == other.premise && self.conclusion == other.conclusion
    }
}

/// `bool` carried as the strings `"true"` / `"false"`.
pub(crate) mod bool_text {
    use serde::de::{Error as _, Unexpected};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(to_text(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| {
            D::Error::invalid_value(Unexpected::Str(&raw), &"`true` or `false`")
        })
    }

    pub fn to_text(value: bool) -> &'static str {
        if value {
            "true"
        } else {
            "false"
        }
    }

    pub fn parse(value: &str) -> Option<bool> {
        match value {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CompletionStatus, Proof, ProofType, REPOSITORY_NAME_PREFIX};

    #[test]
    fn deserializes_front_end_payload() {
        let payload = r#"{
            "entryType": "proof",
            "proofName": "Repository - Modus Ponens",
            "proofType": "fol",
            "Premise": ["A", "A -> B"],
            "Logic": ["{\"wffstr\":\"B\"}"],
            "Rules": [],
            "proofCompleted": "error",
            "conclusion": "B",
            "repoProblem": "true"
        }"#;

        let proof: Proof = serde_json::from_str(payload).unwrap();
        assert_eq!(proof.id, None);
        assert_eq!(proof.user_submitted, "");
        assert_eq!(proof.proof_type, ProofType::Fol);
        assert_eq!(proof.premise, vec!["A", "A -> B"]);
        assert_eq!(proof.logic.len(), 1);
        assert!(proof.rules.is_empty());
        assert_eq!(proof.proof_completed, CompletionStatus::Error);
        assert!(proof.repo_problem);
        assert!(proof.has_repository_name());
    }

    #[test]
    fn serializes_flags_as_strings() {
        let mut proof = Proof::new("a@x.com", "P1", ProofType::Prop);
        proof.proof_completed = CompletionStatus::Completed;
        let value = serde_json::to_value(&proof).unwrap();

        assert_eq!(value["userSubmitted"], "a@x.com");
        assert_eq!(value["entryType"], "proof");
        assert_eq!(value["proofType"], "prop");
        assert_eq!(value["proofCompleted"], "true");
        assert_eq!(value["repoProblem"], "false");
    }

    #[test]
    fn rejects_non_boolean_repo_flag() {
        let payload = r#"{"proofName": "P1", "repoProblem": "yes"}"#;
        let err = serde_json::from_str::<Proof>(payload).unwrap_err();
        assert!(err.to_string().contains("yes"));
    }

    #[test]
    fn same_problem_is_exact_text_equality() {
        let canonical = Proof::new(
            "admin@x.com",
            format!("{REPOSITORY_NAME_PREFIX}P1"),
            ProofType::Prop,
        )
        .with_problem(["A", "A->B"], "B");
        let attempt =
            Proof::new("a@x.com", "my try", ProofType::Prop).with_problem(["A", "A->B"], "B");
        let spaced =
            Proof::new("a@x.com", "spaced", ProofType::Prop).with_problem(["A", "A -> B"], "B");

        assert!(attempt.same_problem(&canonical));
        assert!(!spaced.same_problem(&canonical));
    }
}
