//! Proof repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist proofs with upsert semantics keyed by `(user_submitted, proof_name)`.
//! - Answer the user-scoped and admin-scoped read queries.
//! - Own the admin allow-list used by admin-scoped reads.
//!
//! # Invariants
//! - Every write runs in one `BEGIN IMMEDIATE` transaction.
//! - Array fields are stored as JSON text and compared byte-for-byte.
//! - Read paths reject malformed persisted rows instead of masking them.
//! - Zero matching rows is `Ok(vec![])`, never an error.

use crate::db::migrations::latest_version;
use crate::db::{open_db, open_db_in_memory, DbError};
use crate::model::proof::{
    bool_text, CompletionStatus, EntryType, Proof, ProofId, ProofType, PLACEHOLDER_PROOF_NAME,
};
use rusqlite::{params, Connection, Params, Row, TransactionBehavior};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const PROOF_SELECT_SQL: &str = "SELECT
    id,
    entry_type,
    user_submitted,
    proof_name,
    proof_type,
    premise,
    logic,
    rules,
    proof_completed,
    time_submitted,
    conclusion,
    repo_problem
FROM proofs";

const PROOF_UPSERT_SQL: &str = "INSERT INTO proofs (
    entry_type,
    user_submitted,
    proof_name,
    proof_type,
    premise,
    logic,
    rules,
    proof_completed,
    time_submitted,
    conclusion,
    repo_problem
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, strftime('%Y-%m-%d %H:%M:%f', 'now'), ?9, ?10)
ON CONFLICT (user_submitted, proof_name) DO UPDATE SET
    entry_type = excluded.entry_type,
    proof_type = excluded.proof_type,
    premise = excluded.premise,
    logic = excluded.logic,
    rules = excluded.rules,
    proof_completed = excluded.proof_completed,
    time_submitted = excluded.time_submitted,
    conclusion = excluded.conclusion,
    repo_problem = excluded.repo_problem
RETURNING id;";

// Two derived views joined on exact text: problems owned by current admins,
// and every stored proof. DISTINCT keeps one output row per stored proof even
// when several admins curate the same problem.
const ATTEMPTED_REPO_PROOFS_SQL: &str = "WITH admin_problems AS (
    SELECT DISTINCT premise, conclusion
    FROM proofs
    WHERE user_submitted IN (SELECT email FROM admins)
)
SELECT
    p.id AS id,
    p.entry_type AS entry_type,
    p.user_submitted AS user_submitted,
    p.proof_name AS proof_name,
    p.proof_type AS proof_type,
    p.premise AS premise,
    p.logic AS logic,
    p.rules AS rules,
    p.proof_completed AS proof_completed,
    p.time_submitted AS time_submitted,
    p.conclusion AS conclusion,
    p.repo_problem AS repo_problem
FROM proofs p
INNER JOIN admin_problems a
    ON p.premise = a.premise COLLATE BINARY
   AND p.conclusion = a.conclusion COLLATE BINARY
ORDER BY p.id ASC;";

const REQUIRED_PROOF_COLUMNS: &[&str] = &[
    "id",
    "entry_type",
    "user_submitted",
    "proof_name",
    "proof_type",
    "premise",
    "logic",
    "rules",
    "proof_completed",
    "time_submitted",
    "conclusion",
    "repo_problem",
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for proof persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Engine failure: open, begin, prepare, exec, commit or read.
    Db(DbError),
    /// An array field could not be encoded for storage.
    Encode {
        field: &'static str,
        source: serde_json::Error,
    },
    /// A stored array field is not a JSON list of strings.
    Decode {
        field: &'static str,
        source: serde_json::Error,
    },
    InvalidData(String),
    /// A thread panicked while holding the store connection.
    ConnectionPoisoned,
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Encode { field, source } => write!(f, "failed to encode proof {field}: {source}"),
            Self::Decode { field, source } => {
                write!(f, "corrupt stored proof {field}: {source}")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted proof data: {message}"),
            Self::ConnectionPoisoned => write!(f, "proof store connection is poisoned"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Encode { source, .. } | Self::Decode { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for proof storage and retrieval.
pub trait ProofRepository {
    /// Inserts or replaces the proof keyed by `(user_submitted, proof_name)`.
    ///
    /// Returns the row id, which is stable across later upserts of the same key.
    fn store(&self, proof: &Proof) -> RepoResult<ProofId>;
    /// Unfinished, non-placeholder proofs of one user.
    fn get_user_proofs(&self, user: &str) -> RepoResult<Vec<Proof>>;
    /// Completed proofs of one user.
    fn get_user_completed_proofs(&self, user: &str) -> RepoResult<Vec<Proof>>;
    /// Repository-flagged proofs owned by current admins, by submitter.
    fn get_repo_proofs(&self) -> RepoResult<Vec<Proof>>;
    /// Every proof whose premises and conclusion equal some admin proof's.
    fn get_all_attempted_repo_proofs(&self) -> RepoResult<Vec<Proof>>;
    /// Replaces the admin allow-list in one transaction.
    fn update_admins(&self, admins: &BTreeSet<String>) -> RepoResult<()>;
    /// Current admin allow-list, sorted.
    ///
    /// Read-only inspection for diagnostics; admin-scoped queries read the
    /// table directly and never go through this call.
    fn admins(&self) -> RepoResult<Vec<String>>;
    /// Deletes every proof. The admin allow-list is kept.
    fn empty(&self) -> RepoResult<()>;
    /// Releases the underlying connection.
    fn close(self) -> RepoResult<()>
    where
        Self: Sized;
}

/// SQLite-backed proof store.
///
/// Owns one connection; share across threads with `Arc`.
pub struct SqliteProofStore {
    conn: Mutex<Connection>,
}

impl SqliteProofStore {
    /// Opens (and migrates) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        Self::try_new(open_db(path)?)
    }

    /// Opens a private in-memory store.
    pub fn open_in_memory() -> RepoResult<Self> {
        Self::try_new(open_db_in_memory()?)
    }

    /// Wraps a migrated/ready connection.
    pub fn try_new(conn: Connection) -> RepoResult<Self> {
        ensure_connection_ready(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> RepoResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| RepoError::ConnectionPoisoned)
    }
}

impl ProofRepository for SqliteProofStore {
    fn store(&self, proof: &Proof) -> RepoResult<ProofId> {
        let premise = encode_lines("premise", &proof.premise)?;
        let logic = encode_lines("logic", &proof.logic)?;
        let rules = encode_lines("rules", &proof.rules)?;

        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let id = tx.query_row(
            PROOF_UPSERT_SQL,
            params![
                entry_type_to_db(proof.entry_type),
                proof.user_submitted.as_str(),
                proof.proof_name.as_str(),
                proof_type_to_db(proof.proof_type),
                premise,
                logic,
                rules,
                completion_to_db(proof.proof_completed),
                proof.conclusion.as_str(),
                bool_text::to_text(proof.repo_problem),
            ],
            |row| row.get::<_, ProofId>(0),
        )?;
        tx.commit()?;

        Ok(id)
    }

    fn get_user_proofs(&self, user: &str) -> RepoResult<Vec<Proof>> {
        let conn = self.lock()?;
        query_proofs(
            &conn,
            &format!(
                "{PROOF_SELECT_SQL}
                 WHERE user_submitted = ?1
                   AND proof_completed != 'true'
                   AND proof_name != ?2
                 ORDER BY id ASC;"
            ),
            params![user, PLACEHOLDER_PROOF_NAME],
        )
    }

    fn get_user_completed_proofs(&self, user: &str) -> RepoResult<Vec<Proof>> {
        let conn = self.lock()?;
        query_proofs(
            &conn,
            &format!(
                "{PROOF_SELECT_SQL}
                 WHERE user_submitted = ?1
                   AND proof_completed = 'true'
                 ORDER BY id ASC;"
            ),
            [user],
        )
    }

    fn get_repo_proofs(&self) -> RepoResult<Vec<Proof>> {
        let conn = self.lock()?;
        query_proofs(
            &conn,
            &format!(
                "{PROOF_SELECT_SQL}
                 WHERE repo_problem = 'true'
                   AND user_submitted IN (SELECT email FROM admins)
                 ORDER BY user_submitted ASC, id ASC;"
            ),
            [],
        )
    }

    fn get_all_attempted_repo_proofs(&self) -> RepoResult<Vec<Proof>> {
        let conn = self.lock()?;
        query_proofs(&conn, ATTEMPTED_REPO_PROOFS_SQL, [])
    }

    fn update_admins(&self, admins: &BTreeSet<String>) -> RepoResult<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute("DELETE FROM admins;", [])?;
        {
            let mut stmt = tx.prepare("INSERT INTO admins (email) VALUES (?1);")?;
            for email in admins {
                stmt.execute([email.as_str()])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn admins(&self) -> RepoResult<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT email FROM admins ORDER BY email ASC;")?;
        let mut rows = stmt.query([])?;
        let mut admins = Vec::new();
        while let Some(row) = rows.next()? {
            admins.push(row.get("email")?);
        }
        Ok(admins)
    }

    fn empty(&self) -> RepoResult<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM proofs;", [])?;
        Ok(())
    }

    fn close(self) -> RepoResult<()> {
        let conn = self
            .conn
            .into_inner()
            .map_err(|_| RepoError::ConnectionPoisoned)?;
        conn.close().map_err(|(_, err)| RepoError::from(err))
    }
}

fn query_proofs<P: Params>(conn: &Connection, sql: &str, params: P) -> RepoResult<Vec<Proof>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;
    let mut proofs = Vec::new();
    while let Some(row) = rows.next()? {
        proofs.push(parse_proof_row(row)?);
    }
    Ok(proofs)
}

fn parse_proof_row(row: &Row<'_>) -> RepoResult<Proof> {
    let entry_text: String = row.get("entry_type")?;
    let entry_type = parse_entry_type(&entry_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid entry type `{entry_text}` in proofs.entry_type"
        ))
    })?;

    let type_text: String = row.get("proof_type")?;
    let proof_type = parse_proof_type(&type_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid proof type `{type_text}` in proofs.proof_type"
        ))
    })?;

    let completed_text: String = row.get("proof_completed")?;
    let proof_completed = parse_completion(&completed_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid completion state `{completed_text}` in proofs.proof_completed"
        ))
    })?;

    let repo_text: String = row.get("repo_problem")?;
    let repo_problem = bool_text::parse(&repo_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid flag `{repo_text}` in proofs.repo_problem"
        ))
    })?;

    Ok(Proof {
        id: Some(row.get("id")?),
        entry_type,
        user_submitted: row.get("user_submitted")?,
        proof_name: row.get("proof_name")?,
        proof_type,
        premise: decode_lines("premise", &row.get::<_, String>("premise")?)?,
        logic: decode_lines("logic", &row.get::<_, String>("logic")?)?,
        rules: decode_lines("rules", &row.get::<_, String>("rules")?)?,
        proof_completed,
        conclusion: row.get("conclusion")?,
        repo_problem,
        time_submitted: Some(row.get("time_submitted")?),
    })
}

fn encode_lines(field: &'static str, lines: &[String]) -> RepoResult<String> {
    serde_json::to_string(lines).map_err(|source| RepoError::Encode { field, source })
}

fn decode_lines(field: &'static str, raw: &str) -> RepoResult<Vec<String>> {
    serde_json::from_str(raw).map_err(|source| RepoError::Decode { field, source })
}

fn entry_type_to_db(kind: EntryType) -> &'static str {
    match kind {
        EntryType::Proof => "proof",
    }
}

fn parse_entry_type(value: &str) -> Option<EntryType> {
    match value {
        "proof" => Some(EntryType::Proof),
        _ => None,
    }
}

fn proof_type_to_db(kind: ProofType) -> &'static str {
    match kind {
        ProofType::Prop => "prop",
        ProofType::Fol => "fol",
    }
}

fn parse_proof_type(value: &str) -> Option<ProofType> {
    match value {
        "prop" => Some(ProofType::Prop),
        "fol" => Some(ProofType::Fol),
        _ => None,
    }
}

fn completion_to_db(status: CompletionStatus) -> &'static str {
    match status {
        CompletionStatus::Completed => "true",
        CompletionStatus::Incomplete => "false",
        CompletionStatus::Error => "error",
    }
}

fn parse_completion(value: &str) -> Option<CompletionStatus> {
    match value {
        "true" => Some(CompletionStatus::Completed),
        "false" => Some(CompletionStatus::Incomplete),
        "error" => Some(CompletionStatus::Error),
        _ => None,
    }
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in ["proofs", "admins"] {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }

    for &column in REQUIRED_PROOF_COLUMNS {
        if !table_has_column(conn, "proofs", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "proofs",
                column,
            });
        }
    }

    if !table_has_column(conn, "admins", "email")? {
        return Err(RepoError::MissingRequiredColumn {
            table: "admins",
            column: "email",
        });
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
