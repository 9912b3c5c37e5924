use std::fs;
use std::path::Path;

use template_cli::{canonicalize_or_current, infer_config_name, parse_field, sha256_file};
use tempfile::tempdir;

#[test]
fn canonicalize_or_current_returns_cwd_for_dot() {
    let original = std::env::current_dir().expect("cwd");
    let tmp = tempdir().expect("tempdir");
    std::env::set_current_dir(tmp.path()).expect("chdir tmp");

    let result = canonicalize_or_current(".").expect("canonicalize").canonicalize().expect("canon");
    let expected = tmp.path().canonicalize().expect("canon tmp");
    assert_eq!(result, expected);

    std::env::set_current_dir(original).expect("restore cwd");
}

#[test]
fn canonicalize_or_current_keeps_missing_paths_absolute() {
    let result = canonicalize_or_current("does/not/exist").expect("canonicalize");
    assert!(result.is_absolute());
    assert!(result.ends_with("does/not/exist"));
}

#[test]
fn infer_config_name_uses_last_path_component() {
    assert_eq!(infer_config_name(Path::new("/studio/configs/unreal_demo")), "unreal_demo");
    assert_eq!(infer_config_name(Path::new("/")), "unnamed-config");
}

#[test]
fn parse_field_splits_on_first_equals() {
    assert_eq!(parse_field("Shot=sh010").unwrap(), ("Shot".to_string(), "sh010".to_string()));
    assert_eq!(parse_field("note=a=b").unwrap(), ("note".to_string(), "a=b".to_string()));
    assert_eq!(parse_field("empty=").unwrap(), ("empty".to_string(), String::new()));

    let err = parse_field("Shot").unwrap_err();
    assert!(err.to_string().contains("expected key=value"));
    let err = parse_field("=sh010").unwrap_err();
    assert!(err.to_string().contains("key is empty"));
}

#[test]
fn sha256_file_matches_known_hash() {
    let tmp = tempdir().expect("tempdir");
    let path = tmp.path().join("abc.txt");
    fs::write(&path, b"abc").expect("write");
    assert_eq!(
        sha256_file(&path).expect("hash"),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
}
