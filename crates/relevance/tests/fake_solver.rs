#![cfg(unix)]

use scasplens_common::escape::encode_value;
use scasplens_common::predicate::PredicateRef;
use scasplens_relevance::{query, RelevanceSearch, ScaspProcess};
use std::os::unix::fs::PermissionsExt;
use std::time::Duration;
use tempfile::TempDir;

/// Answers `?- mortal(A).` with one answer and everything else with no
/// models, echoing names found in the program's `name/1` fact.
const SOLVER: &str = r#"#!/bin/sh
for arg; do
  case "$arg" in -s*) n="${arg#-s}";; esac
  last="$arg"
done
goal=$(tail -n 1 "$last")
if [ "$goal" = "?- mortal(A)." ] && [ "$n" -ne 0 ]; then
  printf 'QUERY:?- mortal(A).\n\n\tANSWER:\t1 (in 0.2 ms)\n\nJUSTIFICATION_TREE:\nmortal(socrates) :-\n    human(socrates).\nThe global constraints hold.\n\nMODEL:\n{ mortal(socrates),  human(socrates) }\n\n'
elif [ "$goal" = "?- name(X)." ]; then
  value=$(sed -n 's/^name(\(.*\))\.$/\1/p' "$last")
  printf 'QUERY:?- name(X).\n\n\tANSWER:\t1 (in 0.1 ms)\n\nJUSTIFICATION_TREE:\nname(%s)\n\nMODEL:\n{ name(%s) }\n\nBINDINGS:\nX equal %s\n\n' "$value" "$value" "$value"
else
  printf 'QUERY:%s\n\nno models\n\n' "$goal"
fi
"#;

fn install_solver() -> (TempDir, ScaspProcess) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scasp");
    std::fs::write(&path, SOLVER).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();

    let process = ScaspProcess::new(
        path.to_string_lossy().into_owned(),
        vec!["--human".to_string(), "--tree".to_string()],
        Duration::from_secs(10),
    );
    (dir, process)
}

#[tokio::test]
async fn test_relevance_through_process() {
    let (_dir, process) = install_solver();
    let search = RelevanceSearch::new(process);

    let relevant = search
        .relevant_inputs("mortal(X) :- human(X).\nhuman(socrates).\n", "mortal(socrates)")
        .await
        .unwrap();
    assert_eq!(relevant.into_iter().collect::<Vec<_>>(), vec![PredicateRef::new("human", 1)]);
}

#[tokio::test]
async fn test_escaped_values_come_back_decoded() {
    let (_dir, process) = install_solver();
    let program = format!("name({}).\n?- name(X).\n", encode_value("Jason Morris, Esq."));

    let response = query(&process, &program, 1).await.unwrap();
    let answer = &response.answers()[0];
    assert_eq!(answer.model, vec!["name(Jason Morris, Esq.)"]);
    assert_eq!(answer.bindings.as_ref().unwrap()[0].value, "Jason Morris, Esq.");
    assert_eq!(answer.explanation[0].text(), "name(Jason Morris, Esq.)");
}

#[tokio::test]
async fn test_no_models_through_process() {
    let (_dir, process) = install_solver();
    let response = query(&process, "p :- q.\n?- p.\n", 0).await.unwrap();
    assert_eq!(response.query, "p.");
    assert!(!response.is_yes());
}
