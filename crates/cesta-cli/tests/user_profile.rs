mod common;
use common::TestEnv;
use predicates::prelude::*;

#[test]
fn user_set_persists_and_stamps_added_by() {
    let t = TestEnv::new();
    t.bin()
        .args(["user", "set", "Daniel"])
        .assert()
        .success()
        .stdout(predicate::str::contains("user set to Daniel"));

    t.bin()
        .args(["user", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("user: Daniel").and(predicate::str::contains("theme: Daniel")));

    t.add("Milk", "Alimentos");
    let j = t.list_json();
    assert_eq!(j.as_array().unwrap()[0]["addedBy"], "Daniel");
}

#[test]
fn sync_without_a_remote_refuses_instead_of_wiping_the_cache() {
    let t = TestEnv::new();
    t.add("Milk", "Alimentos");
    t.bin()
        .args(["sync"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no remote configured"));
    // the cached list is untouched
    assert_eq!(t.list_json().as_array().unwrap().len(), 1);
}
