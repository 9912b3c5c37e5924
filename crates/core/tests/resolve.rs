use std::collections::BTreeMap;

use chrono::NaiveDate;
use template_schema::{Context, ResolutionError, Schema};

const MOVIE: &str = r#"
keys:
  Sequence:
    type: str
    shotgun_entity_type: Shot
    shotgun_field_name: sg_sequence
  Shot:
    type: str
    shotgun_entity_type: Shot
    shotgun_field_name: code
  iteration:
    type: int
    format_spec: "03"
  maya_extension:
    type: str
    choices: [ma, mb]
    default: ma
  ue_mov_ext:
    type: str
    choices:
      mov: Quicktime Movie (.mov)
      avi: Audio Video Interleaved (.avi)
  ue_level_sequence:
    type: str
  ue_world:
    type: str
paths:
  unreal.movie_publish:
    definition: '[sequences/{Sequence}/][{Shot}/]editorial/{YYYY}_{MM}_{DD}/unreal/{ue_level_sequence}_{ue_world}.v{version}.{ue_mov_ext}'
  maya_work: 'work/{name}.{maya_extension}'
  maya_work_optional_ext: 'work/{name}[.{maya_extension}]'
  movie_optional_ext: 'movies/{name}[.{ue_mov_ext}]'
  iteration_work: 'work/{name}_{iteration}'
strings:
  iteration_label: 'Iteration {iteration}'
  world_label: 'World {ue_world}'
"#;

fn schema() -> Schema {
    Schema::from_yaml_str(MOVIE).expect("declare")
}

fn movie_context() -> Context {
    Context::new()
        .with("Shot", "sh010")
        .with("YYYY", 2024)
        .with("MM", "01")
        .with("DD", "15")
        .with("ue_level_sequence", "seq_main")
        .with("ue_world", "MainMap")
        .with("version", 3)
        .with("ue_mov_ext", "mov")
}

#[test]
fn resolves_movie_publish_without_sequence() {
    let resolved = schema().resolve("unreal.movie_publish", &movie_context()).unwrap();
    assert_eq!(resolved, "sh010/editorial/2024_01_15/unreal/seq_main_MainMap.v3.mov");
}

#[test]
fn includes_optional_segment_when_all_keys_present() {
    let context = movie_context().with("Sequence", "sq01");
    let resolved = schema().resolve("unreal.movie_publish", &context).unwrap();
    assert_eq!(
        resolved,
        "sequences/sq01/sh010/editorial/2024_01_15/unreal/seq_main_MainMap.v3.mov"
    );
}

#[test]
fn omits_every_optional_segment_when_keys_absent() {
    let mut context = movie_context();
    context.remove("Shot");
    let resolved = schema().resolve("unreal.movie_publish", &context).unwrap();
    assert_eq!(resolved, "editorial/2024_01_15/unreal/seq_main_MainMap.v3.mov");
}

#[test]
fn rejects_value_outside_choices() {
    let context = movie_context().with("ue_mov_ext", "mp4");
    let err = schema().resolve("unreal.movie_publish", &context).unwrap_err();
    assert_eq!(
        err,
        ResolutionError::InvalidChoice {
            key: "ue_mov_ext".into(),
            value: "mp4".into(),
            allowed: vec!["mov".into(), "avi".into()],
        }
    );
    assert!(err.is_missing_information());
}

#[test]
fn missing_required_key_is_an_error() {
    let mut context = movie_context();
    context.remove("ue_world");
    let err = schema().resolve("unreal.movie_publish", &context).unwrap_err();
    assert_eq!(
        err,
        ResolutionError::MissingKey {
            template: "unreal.movie_publish".into(),
            key: "ue_world".into()
        }
    );
}

#[test]
fn resolution_is_repeatable() {
    let schema = schema();
    let context = movie_context();
    let first = schema.resolve("unreal.movie_publish", &context).unwrap();
    let second = schema.resolve("unreal.movie_publish", &context).unwrap();
    assert_eq!(first, second);
}

#[test]
fn unknown_template_is_reported() {
    let err = schema().resolve("nope", &Context::new()).unwrap_err();
    assert_eq!(err, ResolutionError::UnknownTemplate { name: "nope".into() });
    assert!(!err.is_missing_information());
}

#[test]
fn defaults_fill_required_keys_only() {
    let schema = schema();
    let context = Context::new().with("name", "hero");
    assert_eq!(schema.resolve("maya_work", &context).unwrap(), "work/hero.ma");
    assert_eq!(schema.resolve("maya_work_optional_ext", &context).unwrap(), "work/hero");

    let context = context.with("maya_extension", "mb");
    assert_eq!(schema.resolve("maya_work_optional_ext", &context).unwrap(), "work/hero.mb");
}

#[test]
fn int_keys_are_zero_padded() {
    let schema = schema();
    let context = Context::new().with("name", "hero").with("iteration", 7);
    assert_eq!(schema.resolve("iteration_work", &context).unwrap(), "work/hero_007");
    assert_eq!(schema.resolve("iteration_label", &context).unwrap(), "Iteration 007");

    let context = context.with("iteration", "seven");
    let err = schema.resolve("iteration_work", &context).unwrap_err();
    assert!(matches!(err, ResolutionError::InvalidValue { ref key, .. } if key == "iteration"));
}

#[test]
fn implicit_date_tokens_are_padded() {
    let context = movie_context().with("MM", 1).with("DD", 5);
    let resolved = schema().resolve("unreal.movie_publish", &context).unwrap();
    assert!(resolved.contains("/2024_01_05/"), "got {resolved}");
}

#[test]
fn missing_keys_lists_required_keys_without_defaults() {
    let schema = schema();
    let context = Context::new().with("Shot", "sh010").with("ue_world", "MainMap");
    let missing = schema.missing_keys("unreal.movie_publish", &context).unwrap();
    assert_eq!(missing, vec!["YYYY", "MM", "DD", "ue_level_sequence", "version", "ue_mov_ext"]);

    // maya_extension has a default, so only name is missing.
    assert_eq!(schema.missing_keys("maya_work", &Context::new()).unwrap(), vec!["name"]);
    assert!(schema.missing_keys("unreal.movie_publish", &movie_context()).unwrap().is_empty());
}

#[test]
fn context_with_date_fills_date_tokens() {
    let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
    let context = Context::new().with_date(date);
    assert_eq!(context.get("YYYY"), Some("2024"));
    assert_eq!(context.get("MM"), Some("01"));
    assert_eq!(context.get("DD"), Some("15"));
}

#[test]
fn apply_entity_copies_bound_fields() {
    let schema = schema();
    let record: BTreeMap<String, String> = [
        ("code".to_string(), "sh020".to_string()),
        ("sg_sequence".to_string(), "sq02".to_string()),
        ("description".to_string(), "unused".to_string()),
    ]
    .into_iter()
    .collect();

    let mut context = Context::new();
    let filled = context.apply_entity(&schema, "Shot", &record);
    assert_eq!(filled, 2);
    assert_eq!(context.get("Shot"), Some("sh020"));
    assert_eq!(context.get("Sequence"), Some("sq02"));
    assert_eq!(context.len(), 2);

    assert_eq!(context.apply_entity(&schema, "Asset", &record), 0);
}

#[test]
fn context_collects_from_pairs() {
    let context: Context = [("Shot", "sh010"), ("Step", "anim")].into_iter().collect();
    assert_eq!(context.len(), 2);
    assert!(context.contains("Step"));
    let pairs: Vec<(&str, &str)> = context.iter().collect();
    assert_eq!(pairs, vec![("Shot", "sh010"), ("Step", "anim")]);
}

#[test]
fn empty_value_does_not_include_optional_segment() {
    let context = movie_context().with("Shot", "");
    let resolved = schema().resolve("unreal.movie_publish", &context).unwrap();
    assert_eq!(resolved, "editorial/2024_01_15/unreal/seq_main_MainMap.v3.mov");
    assert!(schema().validate("unreal.movie_publish", &resolved));
}

#[test]
fn path_values_must_be_single_segments() {
    let schema = schema();

    let context = movie_context().with("ue_world", "Maps/Main");
    let err = schema.resolve("unreal.movie_publish", &context).unwrap_err();
    assert_eq!(
        err,
        ResolutionError::InvalidValue {
            key: "ue_world".into(),
            value: "Maps/Main".into(),
            expected: "path segment",
        }
    );
    assert!(err.is_missing_information());

    let context = movie_context().with("ue_world", r"Maps\Main");
    assert!(matches!(
        schema.resolve("unreal.movie_publish", &context),
        Err(ResolutionError::InvalidValue { .. })
    ));

    let context = movie_context().with("ue_level_sequence", "");
    let err = schema.resolve("unreal.movie_publish", &context).unwrap_err();
    assert!(matches!(
        err,
        ResolutionError::InvalidValue { ref key, .. } if key == "ue_level_sequence"
    ));
}

#[test]
fn string_templates_accept_slashes_in_values() {
    let context = Context::new().with("ue_world", "Maps/Main");
    assert_eq!(schema().resolve("world_label", &context).unwrap(), "World Maps/Main");
}

#[test]
fn optional_choice_key_still_checks_choices() {
    let schema = schema();
    let context = Context::new().with("name", "edit").with("ue_mov_ext", "mp4");
    let err = schema.resolve("movie_optional_ext", &context).unwrap_err();
    assert!(matches!(err, ResolutionError::InvalidChoice { ref key, .. } if key == "ue_mov_ext"));

    let context = context.with("ue_mov_ext", "avi");
    assert_eq!(schema.resolve("movie_optional_ext", &context).unwrap(), "movies/edit.avi");
}

#[test]
fn apply_entity_skips_blank_fields() {
    let schema = schema();
    let record: BTreeMap<String, String> =
        [("code".to_string(), String::new()), ("sg_sequence".to_string(), "sq03".to_string())]
            .into_iter()
            .collect();

    let mut context = Context::new();
    assert_eq!(context.apply_entity(&schema, "Shot", &record), 1);
    assert!(!context.contains("Shot"));
    assert_eq!(context.get("Sequence"), Some("sq03"));
}
