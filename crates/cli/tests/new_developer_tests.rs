//! Integration tests for `devgate new-developer`.

mod common;

use common::{devgate_cmd, issue_keys};
use predicates::prelude::*;

#[test]
fn test_new_developer_text_output() {
    devgate_cmd()
        .args(["new-developer", "alice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Public key:"))
        .stdout(predicate::str::contains("Secret key (cookie 'devgate-debug'):"))
        .stdout(predicate::str::contains("Secret key (URL encoded):"))
        .stdout(predicate::str::contains("alice@$argon2"));
}

#[test]
fn test_new_developer_json_keys_are_consistent() {
    let keys = issue_keys("team/alice");

    assert!(keys.public_key.starts_with("team/alice@$argon2"));
    let (slug, password) = keys.secret_key.split_once('@').unwrap();
    assert_eq!(slug, "team/alice");
    assert_eq!(password.chars().count(), 32);
    assert!(password.chars().all(|c| ('!'..='~').contains(&c)));
    assert!(keys.secret_key_urlencoded.starts_with("team%2Falice%40"));
}

#[test]
fn test_new_developer_issues_fresh_password_each_time() {
    let first = issue_keys("bob");
    let second = issue_keys("bob");
    assert_ne!(first.secret_key, second.secret_key);
}

#[test]
fn test_new_developer_rejects_invalid_slug() {
    devgate_cmd()
        .args(["new-developer", "bad@slug"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("Error:"));
}
