mod common;
use common::TestEnv;
use predicates::prelude::*;

#[test]
fn delete_flow_respects_the_completed_guard() {
    let t = TestEnv::new();
    let id = t.add("Bread", "Alimentos");

    // checked-off items are protected
    t.bin().args(["toggle", &id]).assert().success();
    t.bin()
        .args(["delete", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("completed items cannot be deleted"));
    assert_eq!(t.list_json().as_array().unwrap().len(), 1);

    // uncheck, then the delete goes through
    t.bin().args(["toggle", &id]).assert().success();
    t.bin()
        .args(["delete", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("deleted"));
    assert!(t.list_json().as_array().unwrap().is_empty());
}

#[test]
fn deleting_an_unknown_id_is_not_an_error() {
    let t = TestEnv::new();
    t.add("Bread", "Alimentos");
    t.bin().args(["delete", "no-such-id"]).assert().success();
    assert_eq!(t.list_json().as_array().unwrap().len(), 1);
}
