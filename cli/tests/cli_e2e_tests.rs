//! CLI end-to-end tests that run the binary against the shared petstore fixture.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const PETSTORE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../tests/fixtures/petstore.json");

#[allow(deprecated)]
fn cmd() -> Command {
    Command::cargo_bin("ufonaut").expect("binary should exist")
}

fn read_json(path: &std::path::Path) -> serde_json::Value {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Output file {} missing: {e}", path.display()));
    serde_json::from_str(&content).expect("output should be valid JSON")
}

// ── E2E: endpoints ──────────────────────────────────────────────────────────

#[test]
fn test_endpoints_plain_normalized() {
    cmd()
        .args(["endpoints", PETSTORE, "--normalized"])
        .assert()
        .success()
        .stdout(predicate::str::contains("get pet/:petid | get-petpetid\n"))
        .stdout(predicate::str::contains("post store/order | post-storeorder\n"));
}

#[test]
fn test_endpoints_markdown_to_file() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("endpoints.md");

    cmd()
        .args(["endpoints", PETSTORE, "--format", "md"])
        .args(["-o", output.to_str().unwrap()])
        .assert()
        .success();

    let content = fs::read_to_string(&output).unwrap();
    assert!(content.starts_with("|Method|Path|\n|---|---|\n|put|pet|\n"));
    assert_eq!(content.lines().count(), 10);
}

#[test]
fn test_endpoints_csv() {
    cmd()
        .args(["endpoints", PETSTORE, "--format", "csv", "-n"])
        .assert()
        .success()
        .stdout(predicate::str::contains("get;user/login;get-userlogin\n"));
}

// ── E2E: convert with ordering, scripts and auth ────────────────────────────

#[test]
fn test_convert_full_pipeline() {
    let dir = TempDir::new().unwrap();
    let scripts = dir.path().join("scripts");
    fs::create_dir_all(scripts.join("test")).unwrap();
    fs::create_dir_all(scripts.join("pre-request")).unwrap();
    fs::write(scripts.join("test/post-storeorder.js"), "pm.test('created');").unwrap();
    fs::write(scripts.join("pre-request/post-storeorder.js"), "prepare();").unwrap();

    let template = dir.path().join("template.js");
    fs::write(&template, "const body = <%%= requestBody =%%>;\n<%%= scriptContent =%%>").unwrap();

    let order = dir.path().join("order.json");
    fs::write(
        &order,
        r#"{"order": [{"method": "post", "path": "store/order"}, {"method": "get", "path": "user/login"}]}"#,
    )
    .unwrap();
    let output = dir.path().join("collection.json");

    cmd()
        .args(["convert", PETSTORE])
        .args(["-o", output.to_str().unwrap()])
        .args(["--order", order.to_str().unwrap()])
        .args(["--scripts", scripts.to_str().unwrap()])
        .args(["--template", template.to_str().unwrap()])
        .args(["--name", "Petstore smoke"])
        .args(["--auth-type", "apikey", "--auth-value", "{{apiKey}}", "--forced-auth"])
        .assert()
        .success();

    let collection = read_json(&output);
    assert_eq!(collection["info"]["name"], "Petstore smoke");
    assert_eq!(
        collection["info"]["schema"],
        "https://schema.getpostman.com/json/collection/v2.1.0/collection.json"
    );

    let items = collection["item"].as_array().unwrap();
    assert_eq!(items.len(), 8);
    let first = &items[0];
    assert_eq!(first["request"]["method"], "POST");
    assert_eq!(first["request"]["body"]["raw"], "{{requestBody}}");
    assert_eq!(first["event"][0]["listen"], "prerequest");
    assert_eq!(first["event"][1]["listen"], "test");
    assert_eq!(first["event"][1]["script"]["exec"][0], "pm.test('created');");
    assert_eq!(items[1]["request"]["method"], "GET");

    for item in items {
        let auth = &item["request"]["auth"];
        assert_eq!(auth["type"], "apikey");
        assert_eq!(auth["apikey"][0]["key"], "in");
        assert_eq!(auth["apikey"][2]["value"], "X-API-KEY");
    }
}

#[test]
fn test_convert_yaml_input() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("openapi.yaml");
    fs::write(
        &input,
        "openapi: 3.0.1\ninfo:\n  title: Yaml API\n  version: '1'\npaths:\n  /health:\n    get:\n      summary: Health\n      responses:\n        '200':\n          description: ok\n",
    )
    .unwrap();

    cmd()
        .args(["convert", input.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\": \"Yaml API\""))
        .stdout(predicate::str::contains("\"name\": \"Health\""));
}

// ── E2E: sets ───────────────────────────────────────────────────────────────

#[test]
fn test_sets_write_one_file_per_set() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("sets.json");
    fs::write(
        &config,
        serde_json::json!({
            "sets": [
                {
                    "collectionName": "Store orders",
                    "order": [{ "method": "post", "path": "store/order" }]
                },
                {
                    "collectionName": "pets-v2",
                    "auth": { "type": "bearer", "forced": true, "bearer": { "token": "{{token}}" } },
                    "order": [
                        { "method": "get", "path": "pet/:petId" },
                        { "method": "delete", "path": "pet/:petId" }
                    ]
                }
            ]
        })
        .to_string(),
    )
    .unwrap();
    let out_dir = dir.path().join("out");

    cmd()
        .args(["sets", PETSTORE])
        .args(["--config", config.to_str().unwrap()])
        .args(["-o", out_dir.to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicate::str::contains("Sets created: 2"));

    let orders = read_json(&out_dir.join("Storeorders.json"));
    assert_eq!(orders["info"]["name"], "Store orders");
    assert_eq!(orders["item"].as_array().unwrap().len(), 1);

    let pets = read_json(&out_dir.join("pets-v2.json"));
    let items = pets["item"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[1]["request"]["method"], "DELETE");
    assert_eq!(items[1]["request"]["auth"]["bearer"][0]["value"], "{{token}}");
}

#[test]
fn test_sets_reject_empty_config() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("sets.json");
    fs::write(&config, r#"{"sets": []}"#).unwrap();

    cmd()
        .args(["sets", PETSTORE, "--config", config.to_str().unwrap()])
        .args(["-o", dir.path().to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Sets config is undefined or is incorrect"));
}
