use std::fs;
use std::path::{Path, PathBuf};

use predicates::prelude::*;
use tempfile::tempdir;

fn shipped_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../config")
}

fn write_templates(root: &Path, templates: &str) {
    let core = root.join("core");
    fs::create_dir_all(&core).expect("create core dir");
    fs::write(core.join("templates.yml"), templates).expect("write templates");
}

const MOVIE_FIELDS: [&str; 8] = [
    "Shot=sh010",
    "YYYY=2024",
    "MM=01",
    "DD=15",
    "ue_level_sequence=seq_main",
    "ue_world=MainMap",
    "version=3",
    "ue_mov_ext=mov",
];

fn resolve_movie(extra: &[&str]) -> assert_cmd::assert::Assert {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("template-cli");
    cmd.arg("resolve").arg("--root").arg(shipped_root()).arg("unreal.movie_publish");
    for field in MOVIE_FIELDS.iter().chain(extra) {
        cmd.arg("--field").arg(field);
    }
    cmd.assert()
}

#[test]
fn validate_accepts_shipped_configuration() {
    assert_cmd::cargo::cargo_bin_cmd!("template-cli")
        .arg("validate")
        .arg("--root")
        .arg(shipped_root())
        .assert()
        .success()
        .stdout(predicate::str::contains("OK:"))
        .stdout(predicate::str::contains("Path templates:"));
}

#[test]
fn validate_fails_for_inconsistent_document() {
    let dir = tempdir().expect("tempdir");
    write_templates(dir.path(), "paths:\n  a: '@b/x'\n  b: '@a/y'\n");

    assert_cmd::cargo::cargo_bin_cmd!("template-cli")
        .arg("validate")
        .arg("--root")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("reference cycle"));
}

#[test]
fn validate_fails_when_document_missing() {
    let dir = tempdir().expect("tempdir");
    assert_cmd::cargo::cargo_bin_cmd!("template-cli")
        .arg("validate")
        .arg("--root")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("templates.yml"));
}

#[test]
fn validate_honors_explicit_file() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("alt.yml"), "strings:\n  greeting: 'hello {name}'\n").unwrap();

    assert_cmd::cargo::cargo_bin_cmd!("template-cli")
        .arg("validate")
        .arg("--root")
        .arg(dir.path())
        .arg("--file")
        .arg("alt.yml")
        .assert()
        .success()
        .stdout(predicate::str::contains("String templates: 1"));
}

#[test]
fn resolve_prints_movie_publish_path() {
    resolve_movie(&[])
        .success()
        .stdout("sh010/editorial/2024_01_15/unreal/seq_main_MainMap.v3.mov\n");
}

#[test]
fn resolve_rejects_value_outside_choices() {
    resolve_movie(&["ue_mov_ext=mp4"])
        .failure()
        .stderr(predicate::str::contains("Missing information to resolve 'unreal.movie_publish'"))
        .stderr(predicate::str::contains("mp4"));
}

#[test]
fn resolve_absolute_joins_storage_root() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("template-cli");
    cmd.arg("resolve")
        .arg("--root")
        .arg(shipped_root())
        .arg("unreal.movie_publish")
        .arg("--absolute")
        .arg("--platform")
        .arg("windows");
    for field in MOVIE_FIELDS {
        cmd.arg("-f").arg(field);
    }
    cmd.assert().success().stdout(
        "P:\\projects\\unreal_demo\\sh010\\editorial\\2024_01_15\\unreal\\seq_main_MainMap.v3.mov\n",
    );
}

#[test]
fn resolve_fills_keys_from_entity_record() {
    assert_cmd::cargo::cargo_bin_cmd!("template-cli")
        .arg("resolve")
        .arg("--root")
        .arg(shipped_root())
        .arg("unreal_loader_asset_path")
        .arg("--entity")
        .arg("Asset")
        .arg("--record")
        .arg("sg_asset_type=Prop")
        .arg("--field")
        .arg("Asset=crate")
        .assert()
        .success()
        .stdout("/Game/Assets/Prop/crate\n");
}

#[test]
fn resolve_fails_for_unknown_template() {
    assert_cmd::cargo::cargo_bin_cmd!("template-cli")
        .arg("resolve")
        .arg("--root")
        .arg(shipped_root())
        .arg("no.such.template")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown template 'no.such.template'"));
}

#[test]
fn missing_lists_required_keys() {
    assert_cmd::cargo::cargo_bin_cmd!("template-cli")
        .arg("missing")
        .arg("--root")
        .arg(shipped_root())
        .arg("maya_shot_work")
        .arg("--field")
        .arg("Shot=sh010")
        .assert()
        .success()
        .stdout("Sequence\nStep\nname\nversion\n");
}

#[test]
fn parse_recovers_fields() {
    assert_cmd::cargo::cargo_bin_cmd!("template-cli")
        .arg("parse")
        .arg("--root")
        .arg(shipped_root())
        .arg("unreal.movie_publish")
        .arg("sh010/editorial/2024_01_15/unreal/seq_main_MainMap.v3.mov")
        .assert()
        .success()
        .stdout(predicate::str::contains("Shot=sh010"))
        .stdout(predicate::str::contains("ue_mov_ext=mov"))
        .stdout(predicate::str::contains("Sequence=").not());
}

#[test]
fn parse_fails_for_foreign_path() {
    assert_cmd::cargo::cargo_bin_cmd!("template-cli")
        .arg("parse")
        .arg("--root")
        .arg(shipped_root())
        .arg("unreal.movie_publish")
        .arg("some/other/file.txt")
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not match"));
}

#[test]
fn list_templates_filters_by_kind() {
    assert_cmd::cargo::cargo_bin_cmd!("template-cli")
        .arg("list-templates")
        .arg("--root")
        .arg(shipped_root())
        .arg("--kind")
        .arg("string")
        .assert()
        .success()
        .stdout(predicate::str::contains("unreal_loader_asset_path (string)"))
        .stdout(predicate::str::contains("(path)").not());
}

#[test]
fn list_templates_json_is_an_array() {
    let output = assert_cmd::cargo::cargo_bin_cmd!("template-cli")
        .arg("list-templates")
        .arg("--root")
        .arg(shipped_root())
        .arg("--json")
        .output()
        .expect("run list-templates");
    assert!(output.status.success());

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    let names: Vec<&str> =
        parsed.as_array().unwrap().iter().filter_map(|t| t["name"].as_str()).collect();
    assert!(names.contains(&"unreal.movie_publish"));
    assert!(names.contains(&"maya_publish_name"));
}

#[test]
fn list_keys_shows_choices_and_implicit_tokens() {
    assert_cmd::cargo::cargo_bin_cmd!("template-cli")
        .arg("list-keys")
        .arg("--root")
        .arg(shipped_root())
        .assert()
        .success()
        .stdout(predicate::str::contains("ue_mov_ext (str) choices=[mov, avi]"))
        .stdout(predicate::str::contains("Implicit: name, version, YYYY"));
}

#[test]
fn info_json_reports_fingerprint_and_roots() {
    let output = assert_cmd::cargo::cargo_bin_cmd!("template-cli")
        .arg("info")
        .arg("--root")
        .arg(shipped_root())
        .arg("--json")
        .output()
        .expect("run info");
    assert!(output.status.success());

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(parsed["name"], "config");
    assert_eq!(parsed["templates_sha256"].as_str().map(str::len), Some(64));
    assert_eq!(parsed["default_root"], "primary");
    assert_eq!(parsed["roots"][0]["name"], "primary");
}

#[test]
fn info_text_lists_files() {
    assert_cmd::cargo::cargo_bin_cmd!("template-cli")
        .arg("info")
        .arg("--root")
        .arg(shipped_root())
        .assert()
        .success()
        .stdout(predicate::str::contains("Templates: OK"))
        .stdout(predicate::str::contains("primary (default)"));
}
