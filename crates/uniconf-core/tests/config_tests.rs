use serde_json::json;
use std::path::PathBuf;
use uniconf_core::diagnostics::{collected, warning};
use uniconf_core::{Config, ConfigValue, UniconfError};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn session() -> Config {
    let mut config = Config::new();
    config
        .attach(
            "v",
            ConfigValue::from(json!({
                "name": "demo",
                "port": 8080,
                "ratio": 2.7,
                "neg": -3.9,
                "text_num": " 42 ",
                "text_float": "7.9",
                "yes": "Yes",
                "off": "OFF",
                "zero": "0",
                "word": "maybe",
                "list": ["a"],
                "empty_list": [],
                "map": {"k": "v"},
                "empty_map": {},
                "nothing": null
            })),
        )
        .unwrap();
    config
}

// ============================================================================
// Session lifecycle
// ============================================================================

#[test]
fn new_session_is_empty_object() {
    let config = Config::new();
    assert_eq!(config.root(), &ConfigValue::object());
    assert!(config.errors().is_empty());
    assert_eq!(Config::default(), config);
}

#[test]
fn load_reads_directory() {
    let config = Config::load(fixture("tree")).unwrap();
    assert_eq!(config.get_string("db.primary.url").unwrap(), "postgres://localhost:5432/app");
    assert!(config.errors().is_empty());
}

#[test]
fn load_path_overlays_later_sources() {
    let mut config = Config::load(fixture("tree")).unwrap();
    config
        .parse_structural("db", "host: override".as_bytes())
        .unwrap();
    assert_eq!(config.get_string("db/host").unwrap(), "override");
    assert_eq!(config.get_string("db/primary/port").unwrap(), "5432");
}

#[test]
fn load_missing_path_fails() {
    assert!(Config::load(fixture("nope")).is_err());
}

#[test]
fn errors_survive_until_clear() {
    let mut config = Config::load(fixture("broken")).unwrap();
    assert_eq!(config.errors().len(), 9);
    config.clear();
    assert!(config.errors().is_empty());
    assert_eq!(config.root(), &ConfigValue::object());
}

#[test]
fn substitute_against_session() {
    let mut config = session();
    assert_eq!(config.substitute("$(v.name):$(v.port)"), "demo:8080");
    assert_eq!(config.substitute("$(v.missing) x"), "$(v.missing) x");
    assert_eq!(config.errors().len(), 1);
}

#[test]
fn attach_conflict_is_recorded_and_returned() {
    let mut config = Config::new();
    config
        .attach("b", ConfigValue::from(json!({"k": "1"})))
        .unwrap();
    let err = config
        .attach("b", ConfigValue::from(json!(["x"])))
        .unwrap_err();
    assert!(matches!(err, UniconfError::MergeConflict { .. }));
    assert_eq!(config.get_string("b.k").as_deref(), Some("1"));
    assert_eq!(
        config.errors(),
        vec!["ERROR: in branch 'b': branch 'b' holds object, refusing to attach array"]
    );
}

#[test]
fn structural_failure_is_recorded_with_line() {
    let mut config = Config::new();
    assert!(config.parse_structural("c", "  a: 1".as_bytes()).is_err());
    assert!(config
        .parse_structural("d", "x: 1\ny: $(x".as_bytes())
        .is_err());
    assert_eq!(
        config.errors(),
        vec![
            "ERROR: in branch 'c' at line 1: first line must not be indented",
            "ERROR: in branch 'd' at line 2: unterminated reference '$(x'",
        ]
    );
    assert_eq!(config.get_string("d.x").as_deref(), Some("1"));
}

#[test]
fn successful_calls_record_nothing() {
    let mut config = Config::new();
    config.parse_structural("a", "k: v".as_bytes()).unwrap();
    config.attach("b", ConfigValue::from(json!([1]))).unwrap();
    assert!(config.errors().is_empty());
}

#[test]
fn displaced_errors_value_is_noted_once() {
    let mut root = ConfigValue::from(json!({"errors": "user text"}));
    warning(&mut root, "first");
    warning(&mut root, "second");
    assert_eq!(
        collected(&root),
        vec![
            "ERROR: root 'errors' held string; replaced by the problem collection",
            "WARNING: first",
            "WARNING: second",
        ]
    );
}

#[test]
fn serializes_as_its_tree() {
    let mut config = Config::new();
    config.parse_structural("a", "b: c".as_bytes()).unwrap();
    assert_eq!(serde_json::to_value(&config).unwrap(), json!({"a": {"b": "c"}}));
    assert_eq!(config.into_root().to_json(), json!({"a": {"b": "c"}}));
}

// ============================================================================
// Typed accessors
// ============================================================================

#[test]
fn get_string_formats_numbers() {
    let config = session();
    assert_eq!(config.get_string("v.name").as_deref(), Some("demo"));
    assert_eq!(config.get_string("v.port").as_deref(), Some("8080"));
    assert_eq!(config.get_string("v.ratio").as_deref(), Some("3"));
    assert_eq!(config.get_string("v.map"), None);
    assert_eq!(config.get_string("v.absent"), None);
}

#[test]
fn get_number_truncates_and_parses() {
    let config = session();
    assert_eq!(config.get_number("v.port"), Some(8080));
    assert_eq!(config.get_number("v.ratio"), Some(2));
    assert_eq!(config.get_number("v.neg"), Some(-3));
    assert_eq!(config.get_number("v.text_num"), Some(42));
    assert_eq!(config.get_number("v.text_float"), Some(7));
    assert_eq!(config.get_number("v.word"), None);
    assert_eq!(config.get_number("v.list"), None);
}

#[test]
fn get_boolean_words_numbers_and_containers() {
    let config = session();
    assert_eq!(config.get_boolean("v.yes"), Some(true));
    assert_eq!(config.get_boolean("v.off"), Some(false));
    assert_eq!(config.get_boolean("v.zero"), Some(false));
    assert_eq!(config.get_boolean("v.text_num"), Some(true));
    assert_eq!(config.get_boolean("v.port"), Some(true));
    assert_eq!(config.get_boolean("v.list"), Some(true));
    assert_eq!(config.get_boolean("v.empty_list"), Some(false));
    assert_eq!(config.get_boolean("v.map"), Some(true));
    assert_eq!(config.get_boolean("v.empty_map"), Some(false));
    assert_eq!(config.get_boolean("v.word"), None);
    assert_eq!(config.get_boolean("v.nothing"), None);
    assert_eq!(config.get_boolean("v.absent"), None);
}

#[test]
fn fractional_truth_uses_integer_part() {
    let mut config = Config::new();
    config
        .attach("t", ConfigValue::from(json!({"half": 0.5, "text": "0.9"})))
        .unwrap();
    assert_eq!(config.get_boolean("t.half"), Some(false));
    assert_eq!(config.get_boolean("t.text"), Some(false));
}
