use proofstore_core::{
    CompletionStatus, Proof, ProofRepository, ProofService, ProofType, SqliteProofStore,
    REPOSITORY_NAME_PREFIX,
};
use std::collections::BTreeSet;

fn admins(emails: &[&str]) -> BTreeSet<String> {
    emails.iter().map(|email| email.to_string()).collect()
}

fn repo_problem(admin: &str, name: &str, premise: &[&str], conclusion: &str) -> Proof {
    let mut proof = Proof::new(admin, format!("{REPOSITORY_NAME_PREFIX}{name}"), ProofType::Prop)
        .with_problem(premise.iter().copied(), conclusion);
    proof.repo_problem = true;
    proof
}

fn user_attempt(user: &str, name: &str, premise: &[&str], conclusion: &str) -> Proof {
    Proof::new(user, name, ProofType::Prop).with_problem(premise.iter().copied(), conclusion)
}

fn names(proofs: &[Proof]) -> Vec<(&str, &str)> {
    proofs
        .iter()
        .map(|proof| (proof.user_submitted.as_str(), proof.proof_name.as_str()))
        .collect()
}

#[test]
fn repo_proofs_follow_the_current_admin_set() {
    let store = SqliteProofStore::open_in_memory().unwrap();
    store
        .store(&repo_problem("x@admin.com", "MP", &["A", "A->B"], "B"))
        .unwrap();

    assert!(store.get_repo_proofs().unwrap().is_empty());

    store.update_admins(&admins(&["x@admin.com"])).unwrap();
    assert_eq!(store.get_repo_proofs().unwrap().len(), 1);

    store.update_admins(&admins(&["y@admin.com"])).unwrap();
    assert!(store.get_repo_proofs().unwrap().is_empty());
    assert_eq!(store.admins().unwrap(), vec!["y@admin.com"]);

    let still_stored = store.get_user_proofs("x@admin.com").unwrap();
    assert_eq!(still_stored.len(), 1);
}

#[test]
fn repo_proofs_require_repo_flag_and_sort_by_submitter() {
    let store = SqliteProofStore::open_in_memory().unwrap();
    store.update_admins(&admins(&["b@admin.com", "a@admin.com"])).unwrap();

    store
        .store(&repo_problem("b@admin.com", "Second", &["P"], "P"))
        .unwrap();
    store
        .store(&repo_problem("a@admin.com", "First", &["Q"], "Q"))
        .unwrap();
    store
        .store(&user_attempt("a@admin.com", "scratch", &["R"], "R"))
        .unwrap();
    store
        .store(&repo_problem("user@x.com", "Not curated", &["S"], "S"))
        .unwrap();

    let catalog = store.get_repo_proofs().unwrap();
    assert_eq!(
        names(&catalog),
        vec![
            ("a@admin.com", "Repository - First"),
            ("b@admin.com", "Repository - Second"),
        ]
    );
    assert!(catalog.iter().all(|proof| proof.repo_problem));
}

#[test]
fn attempted_repo_proofs_match_by_content() {
    let store = SqliteProofStore::open_in_memory().unwrap();
    store.update_admins(&admins(&["x@admin.com"])).unwrap();

    store
        .store(&repo_problem("x@admin.com", "MP", &["A", "A->B"], "B"))
        .unwrap();
    store
        .store(&user_attempt("u@x.com", "my own name", &["A", "A->B"], "B"))
        .unwrap();
    store
        .store(&user_attempt("u@x.com", "spacing", &["A", "A -> B"], "B"))
        .unwrap();
    store
        .store(&user_attempt("u@x.com", "order", &["A->B", "A"], "B"))
        .unwrap();
    store
        .store(&user_attempt("u@x.com", "conclusion", &["A", "A->B"], "B "))
        .unwrap();

    let attempts = store.get_all_attempted_repo_proofs().unwrap();
    assert_eq!(
        names(&attempts),
        vec![
            ("x@admin.com", "Repository - MP"),
            ("u@x.com", "my own name"),
        ]
    );
    assert!(!attempts[1].repo_problem);
}

#[test]
fn attempted_repo_proofs_recompute_after_admin_change() {
    let store = SqliteProofStore::open_in_memory().unwrap();
    store
        .store(&repo_problem("x@admin.com", "MP", &["A", "A->B"], "B"))
        .unwrap();
    store
        .store(&user_attempt("u@x.com", "try", &["A", "A->B"], "B"))
        .unwrap();

    assert!(store.get_all_attempted_repo_proofs().unwrap().is_empty());

    store.update_admins(&admins(&["x@admin.com"])).unwrap();
    assert_eq!(store.get_all_attempted_repo_proofs().unwrap().len(), 2);

    store.update_admins(&BTreeSet::new()).unwrap();
    assert!(store.get_all_attempted_repo_proofs().unwrap().is_empty());
}

#[test]
fn attempted_repo_proofs_list_each_row_once() {
    let store = SqliteProofStore::open_in_memory().unwrap();
    store
        .update_admins(&admins(&["x@admin.com", "y@admin.com"]))
        .unwrap();

    store
        .store(&repo_problem("x@admin.com", "MP", &["A", "A->B"], "B"))
        .unwrap();
    store
        .store(&repo_problem("y@admin.com", "MP copy", &["A", "A->B"], "B"))
        .unwrap();
    store
        .store(&user_attempt("u@x.com", "try", &["A", "A->B"], "B"))
        .unwrap();

    let attempts = store.get_all_attempted_repo_proofs().unwrap();
    assert_eq!(attempts.len(), 3);
    let ids: BTreeSet<_> = attempts.iter().map(|proof| proof.id).collect();
    assert_eq!(ids.len(), 3);
}

#[test]
fn end_to_end_scenario() {
    let service = ProofService::new(SqliteProofStore::open_in_memory().unwrap());

    let original = user_attempt("a@x.com", "P1", &["A", "A->B"], "B");
    service.store(&original).unwrap();

    let listed = service.get_user_proofs("a@x.com").unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].proof_name, "P1");
    assert_eq!(listed[0].premise, vec!["A", "A->B"]);
    assert_eq!(listed[0].conclusion, "B");
    assert_eq!(listed[0].proof_completed, CompletionStatus::Incomplete);
    assert!(!listed[0].repo_problem);

    service.update_admins(["a@x.com"]);
    assert_eq!(service.admins().unwrap(), vec!["a@x.com"]);
    let mut canonical = user_attempt("a@x.com", "Repository - P1", &["A", "A->B"], "B");
    canonical.repo_problem = true;
    service.store(&canonical).unwrap();

    let attempts = service.get_all_attempted_repo_proofs().unwrap();
    assert_eq!(
        names(&attempts),
        vec![("a@x.com", "P1"), ("a@x.com", "Repository - P1")]
    );

    service.empty().unwrap();
    assert!(service.get_user_proofs("a@x.com").unwrap().is_empty());
    service.close().unwrap();
}
