//! cli.rs
//!
//! Black-box tests of the `jsonwrap` binary against the manifest and input
//! under tests/fixtures.

use std::path::PathBuf;

use assert_cmd::Command;
use serde_json::{json, Value};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn jsonwrap() -> Command {
    let mut cmd = Command::cargo_bin("jsonwrap").unwrap();
    cmd.arg("--classes").arg(fixture("classes.json"));
    cmd
}

fn stdout_json(cmd: &mut Command) -> Value {
    let out = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&out).unwrap()
}

fn stderr_of(cmd: &mut Command) -> String {
    let out = cmd.assert().failure().get_output().stderr.clone();
    String::from_utf8(out).unwrap()
}

#[test]
fn hydrate_prints_merged_document() {
    let v = stdout_json(jsonwrap().arg("hydrate").arg(fixture("app.json")).args(["--class", "App"]));
    assert_eq!(
        v,
        json!({"users": [
            {"first_name": "John", "last_name": "Doe", "country": {"language": "it", "code": "IT", "verified": false}},
            {"first_name": "Jane"}
        ]})
    );
}

#[test]
fn hydrate_explain_lists_class_nodes() {
    let v = stdout_json(
        jsonwrap()
            .arg("hydrate")
            .arg(fixture("app.json"))
            .args(["--class", "App", "--explain", "--pretty"]),
    );
    assert_eq!(v["class"], "App");
    assert_eq!(
        v["instances"],
        json!([
            {"path": "", "class": "App"},
            {"path": "/users/0", "class": "User"},
            {"path": "/users/0/country", "class": "Country"},
            {"path": "/users/1", "class": "User"}
        ])
    );
}

#[test]
fn hydrate_reads_stdin() {
    let v = stdout_json(
        jsonwrap()
            .args(["hydrate", "-", "--class", "Country"])
            .write_stdin(r#"{"code": "FR"}"#),
    );
    assert_eq!(v, json!({"code": "FR", "verified": false}));
}

#[test]
fn annotate_replaces_refs_with_markers() {
    let v = stdout_json(jsonwrap().args(["annotate", "--class", "User"]));
    assert_eq!(v["properties"]["country"], json!({"$class": {"enum": ["Country"]}}));
    let required = v["required"].as_array().unwrap();
    assert!(required.contains(&json!("first_name")));
    assert!(required.contains(&json!("country")));
}

#[test]
fn skeleton_is_pruned_to_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("one.json");
    std::fs::write(&input, r#"{"users": [{"last_name": "Doe"}]}"#).unwrap();

    let v = stdout_json(jsonwrap().arg("skeleton").arg(&input).args(["--class", "App"]));
    assert_eq!(v["skeleton"], json!({"users": [{}]}));
    assert_eq!(v["instances"][1], json!({"path": "/users/0", "class": "User"}));
}

#[test]
fn fake_expands_references() {
    let v = stdout_json(jsonwrap().args(["fake", "--class", "App", "--depth", "3", "--items", "2", "--all-fields"]));
    let user = json!({"first_name": "", "last_name": "", "country": {"language": "", "code": "IT"}});
    assert_eq!(v, json!({"users": [user.clone(), user]}));

    let v = stdout_json(jsonwrap().args(["fake", "--class", "User"]));
    assert_eq!(v, json!({"first_name": ""}));
}

#[test]
fn classes_lists_declarations() {
    let v = stdout_json(jsonwrap().arg("classes"));
    assert_eq!(v["annotation"], "nested-only");
    let names: Vec<&str> = v["classes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["App", "Country", "User"]);
}

#[test]
fn malformed_input_fails() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bad.json");
    std::fs::write(&input, "{]").unwrap();

    let err = stderr_of(jsonwrap().arg("hydrate").arg(&input).args(["--class", "App"]));
    assert!(err.contains("syntax error"), "stderr: {err}");
}

#[test]
fn unknown_class_fails() {
    let err = stderr_of(jsonwrap().arg("hydrate").arg(fixture("app.json")).args(["--class", "Nope"]));
    assert!(err.contains("unknown class: Nope"), "stderr: {err}");
}

#[test]
fn missing_manifest_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("jsonwrap").unwrap();
    cmd.arg("--classes").arg(dir.path().join("absent.json")).arg("classes");
    let err = stderr_of(&mut cmd);
    assert!(err.contains("failed to read"), "stderr: {err}");
}
