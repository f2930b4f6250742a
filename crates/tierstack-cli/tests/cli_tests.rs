//! End-to-end tests for the `tierstack` binary.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

/// Binary isolated from the caller's environment and settings file.
fn tierstack(dir: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("tierstack");
    cmd.current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("AWS_REGION")
        .env_remove("AWS_DEFAULT_REGION")
        .env_remove("RUST_LOG")
        .env_remove("TIERSTACK_STACK_CONFIG")
        .env_remove("TIERSTACK_OUT_DIR")
        .env_remove("TIERSTACK_DEFAULT_REGION");
    let settings = dir.join("settings.toml");
    if !settings.exists() {
        fs::write(&settings, "").unwrap();
    }
    cmd.arg("--config").arg(settings);
    cmd
}

fn init(dir: &Path, prefix: &str) {
    tierstack(dir)
        .args(["init", "--prefix", prefix])
        .assert()
        .success();
}

// ── help & version ───────────────────────────────────────────────────────────

#[test]
fn help_lists_subcommands() {
    let temp = TempDir::new().unwrap();
    tierstack(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("synth"))
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("outputs"));
}

#[test]
fn version_flag() {
    let temp = TempDir::new().unwrap();
    tierstack(temp.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn unknown_flag_exits_with_usage_error() {
    let temp = TempDir::new().unwrap();
    tierstack(temp.path())
        .args(["synth", "--bogus"])
        .assert()
        .code(2);
}

// ── init ─────────────────────────────────────────────────────────────────────

#[test]
fn init_writes_sample_once() {
    let temp = TempDir::new().unwrap();
    init(temp.path(), "Shop");

    let written = fs::read_to_string(temp.path().join("stack.config.json")).unwrap();
    assert!(written.contains(r#""namePrefix": "Shop""#));

    tierstack(temp.path())
        .arg("init")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("already exists"))
        .stderr(predicate::str::contains("--force"));

    tierstack(temp.path())
        .args(["init", "--force", "--prefix", "Other"])
        .assert()
        .success();
    let written = fs::read_to_string(temp.path().join("stack.config.json")).unwrap();
    assert!(written.contains(r#""namePrefix": "Other""#));
}

#[test]
fn init_rejects_bad_prefix() {
    let temp = TempDir::new().unwrap();
    tierstack(temp.path())
        .args(["init", "--prefix", "my-shop"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("namePrefix"));
    assert!(!temp.path().join("stack.config.json").exists());
}

#[test]
fn init_writes_toml_when_asked() {
    let temp = TempDir::new().unwrap();
    tierstack(temp.path())
        .args(["init", "--path", "stack.toml"])
        .assert()
        .success();

    let text = fs::read_to_string(temp.path().join("stack.toml")).unwrap();
    assert!(text.contains("namePrefix = \"Acme\""));

    tierstack(temp.path())
        .args(["--stack-config", "stack.toml", "validate"])
        .assert()
        .success();
}

// ── validate ─────────────────────────────────────────────────────────────────

#[test]
fn validate_without_config_is_not_found() {
    let temp = TempDir::new().unwrap();
    tierstack(temp.path())
        .arg("validate")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("tierstack init"));
}

#[test]
fn validate_prints_effective_configuration() {
    let temp = TempDir::new().unwrap();
    init(temp.path(), "Shop");

    let assert = tierstack(temp.path())
        .args(["validate", "--format", "json"])
        .assert()
        .success();
    let json: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();

    assert_eq!(json["scope"]["namePrefix"], "Shop");
    assert_eq!(json["scope"]["region"], "us-east-1");
    assert_eq!(json["database"]["backupRetentionDays"], 14);
}

#[test]
fn unsupported_engine_is_a_configuration_error() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("stack.config.json"),
        r#"{"namePrefix": "Shop", "dnsDomain": "example.com", "dbEngine": "oracle"}"#,
    )
    .unwrap();

    tierstack(temp.path())
        .arg("validate")
        .assert()
        .code(4)
        .stderr(predicate::str::contains("oracle"));
}

#[test]
fn region_flag_fills_missing_region() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("stack.config.json"),
        r#"{"namePrefix": "Shop", "dnsDomain": "example.com", "dbEngine": "mysql"}"#,
    )
    .unwrap();

    let assert = tierstack(temp.path())
        .args(["--region", "eu-west-2", "validate", "--format", "json"])
        .assert()
        .success();
    let json: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(json["scope"]["region"], "eu-west-2");
}

#[test]
fn aws_region_variable_fills_missing_region() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("stack.config.json"),
        r#"{"namePrefix": "Shop", "dnsDomain": "example.com", "dbEngine": "mysql"}"#,
    )
    .unwrap();

    let assert = tierstack(temp.path())
        .env("AWS_DEFAULT_REGION", "ap-southeast-2")
        .args(["validate", "--format", "json"])
        .assert()
        .success();
    let json: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(json["scope"]["region"], "ap-southeast-2");
}

// ── synth ────────────────────────────────────────────────────────────────────

#[test]
fn synth_writes_templates_and_manifest() {
    let temp = TempDir::new().unwrap();
    init(temp.path(), "Shop");

    tierstack(temp.path())
        .args(["synth", "--out", "out"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ShopWeb.template.json"));

    let out = temp.path().join("out");
    for name in ["ShopBase", "ShopData", "ShopCert", "ShopWeb"] {
        assert!(out.join(format!("{name}.template.json")).is_file(), "{name}");
    }
    assert!(!out.join("ShopEmail.template.json").exists());

    let manifest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("manifest.json")).unwrap()).unwrap();
    assert_eq!(manifest["order"][0], "ShopBase");
}

#[test]
fn synth_refuses_existing_output_without_force() {
    let temp = TempDir::new().unwrap();
    init(temp.path(), "Shop");
    tierstack(temp.path())
        .args(["synth", "--out", "out"])
        .assert()
        .success();
    fs::write(temp.path().join("out/keep.txt"), "x").unwrap();

    tierstack(temp.path())
        .args(["synth", "--out", "out"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("already exists"));
    assert!(temp.path().join("out/keep.txt").exists());

    tierstack(temp.path())
        .args(["synth", "--out", "out", "--force", "--yes"])
        .assert()
        .success();
    assert!(!temp.path().join("out/keep.txt").exists());
    assert!(temp.path().join("out/manifest.json").exists());
}

#[test]
fn force_keeps_directories_that_are_not_assemblies() {
    let temp = TempDir::new().unwrap();
    init(temp.path(), "Shop");
    fs::create_dir(temp.path().join("docs")).unwrap();
    fs::write(temp.path().join("docs/notes.txt"), "x").unwrap();

    tierstack(temp.path())
        .args(["synth", "--out", "docs", "--force", "--yes"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Refusing to replace"));
    assert!(temp.path().join("docs/notes.txt").exists());

    tierstack(temp.path())
        .args(["synth", "--out", ".", "--force", "--yes"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("current directory"));
    assert!(temp.path().join("stack.config.json").exists());
}

#[test]
fn dry_run_writes_nothing() {
    let temp = TempDir::new().unwrap();
    init(temp.path(), "Shop");

    tierstack(temp.path())
        .args(["synth", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run"));
    assert!(!temp.path().join("cdk.out").exists());
}

#[test]
fn settings_file_moves_default_output() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("settings.toml"), "out_dir = \"build\"\n").unwrap();
    init(temp.path(), "Shop");

    tierstack(temp.path()).arg("synth").assert().success();
    assert!(temp.path().join("build/manifest.json").exists());
}

#[test]
fn synth_json_report() {
    let temp = TempDir::new().unwrap();
    init(temp.path(), "Shop");

    let assert = tierstack(temp.path())
        .args(["--output-format", "json", "synth", "--dry-run"])
        .assert()
        .success();
    let json: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(json["written"], false);
    assert_eq!(json["topologies"].as_array().unwrap().len(), 4);
}

// ── outputs ──────────────────────────────────────────────────────────────────

#[test]
fn outputs_as_csv() {
    let temp = TempDir::new().unwrap();
    init(temp.path(), "Shop");

    tierstack(temp.path())
        .args(["outputs", "--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("topology,id,export,value"))
        .stdout(predicate::str::contains(
            "ShopWeb,OutputWebUrl,OutputWebUrl,https://www.example.com",
        ));
}

#[test]
fn outputs_as_json() {
    let temp = TempDir::new().unwrap();
    init(temp.path(), "Shop");

    let assert = tierstack(temp.path())
        .args(["outputs", "--exported", "--format", "json"])
        .assert()
        .success();
    let rows: Vec<serde_json::Value> =
        serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert!(!rows.is_empty());
    assert!(rows.iter().all(|r| r["exportName"].is_string()));
}

// ── completions ──────────────────────────────────────────────────────────────

#[test]
fn completions_for_bash() {
    let temp = TempDir::new().unwrap();
    tierstack(temp.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tierstack"));
}
