use serde_json::json;
use std::path::Path;
use uniconf_core::diagnostics::collected;
use uniconf_core::document::{parse_json_at, parse_settings_at};
use uniconf_core::flat::{parse_env_at, parse_ini_at, parse_list_at};
use uniconf_core::{ConfigValue, NodePath, UniconfError};

fn top() -> NodePath {
    NodePath::root()
}

// ============================================================================
// .env
// ============================================================================

#[test]
fn env_assignments_and_comments() {
    let mut root = ConfigValue::object();
    let text = "\
# comment
NAME = demo
HOME=\"/opt/$(env.NAME)\" ### install root
EMPTY=
not an assignment
";
    let count = parse_env_at(&mut root, &top(), "env", text.as_bytes()).unwrap();
    assert_eq!(count, 3);
    assert_eq!(
        root.to_json(),
        json!({"env": {"NAME": "demo", "HOME": "/opt/demo", "EMPTY": ""}})
    );
}

#[test]
fn env_into_current_node() {
    let mut root = ConfigValue::object();
    parse_env_at(&mut root, &top(), "", "A=1\nB='two words'".as_bytes()).unwrap();
    assert_eq!(root.to_json(), json!({"A": "1", "B": "two words"}));
}

#[test]
fn env_repeated_name_replaces() {
    let mut root = ConfigValue::object();
    parse_env_at(&mut root, &top(), "e", "A=1\nA=2".as_bytes()).unwrap();
    assert_eq!(root.to_json(), json!({"e": {"A": "2"}}));
}

#[test]
fn env_unterminated_reference_stops_the_file() {
    let mut root = ConfigValue::object();
    let err = parse_env_at(&mut root, &top(), "e", "A=1\nB=$(e.A\nC=2".as_bytes()).unwrap_err();
    assert_eq!(err.line(), Some(2));
    assert_eq!(err.detail(), "unterminated reference '$(e.A'");
    assert_eq!(root.to_json(), json!({"e": {"A": "1"}}));
}

#[test]
fn env_unresolved_reference_warns_with_line() {
    let mut root = ConfigValue::object();
    parse_env_at(&mut root, &top(), "e", "A=$(nope)\nB=2".as_bytes()).unwrap();
    assert_eq!(root.to_json()["e"], json!({"A": "$(nope)", "B": "2"}));
    assert_eq!(
        collected(&root),
        vec!["WARNING: line 1: unresolved reference '$(nope)'"]
    );
}

#[test]
fn env_cannot_write_root_errors_key() {
    let mut root = ConfigValue::object();
    let err = parse_env_at(&mut root, &top(), "", "errors=none".as_bytes()).unwrap_err();
    assert!(matches!(err, UniconfError::Reserved(_)));
    assert!(root.get("errors").is_none());
}

// ============================================================================
// .ini
// ============================================================================

#[test]
fn ini_sections_become_children() {
    let mut root = ConfigValue::object();
    let text = "\
; database
host = localhost
[primary]
port = 5432 // default
url = pg://$(db.host):$(db.primary.port)/x ## main
[]
name = main
";
    let count = parse_ini_at(&mut root, &top(), "db", text.as_bytes(), Path::new("db.ini")).unwrap();
    assert_eq!(count, 4);
    assert_eq!(
        root.to_json(),
        json!({"db": {
            "host": "localhost",
            "primary": {"port": "5432", "url": "pg://localhost:5432/x"},
            "name": "main"
        }})
    );
}

#[test]
fn ini_unterminated_reference_stops_the_file() {
    let mut root = ConfigValue::object();
    let text = "a = 1\n[s]\nb = <$[a>\nc = 3\n";
    let err = parse_ini_at(&mut root, &top(), "i", text.as_bytes(), Path::new("i.ini"))
        .unwrap_err();
    assert_eq!(err.line(), Some(3));
    assert_eq!(root.to_json(), json!({"i": {"a": "1", "s": {}}}));
}

#[test]
fn ini_slash_comment_needs_leading_space() {
    let mut root = ConfigValue::object();
    parse_ini_at(
        &mut root,
        &top(),
        "w",
        "a = http://x//y\nb = //gone\nc = v  // note".as_bytes(),
        Path::new("w.ini"),
    )
    .unwrap();
    assert_eq!(root.to_json(), json!({"w": {"a": "http://x//y", "b": "", "c": "v"}}));
}

#[test]
fn ini_broken_section_is_recorded_and_skipped() {
    let mut root = ConfigValue::object();
    let count = parse_ini_at(
        &mut root,
        &top(),
        "s",
        "a = 1\n[open\nb = 2".as_bytes(),
        Path::new("conf/s.ini"),
    )
    .unwrap();
    assert_eq!(count, 2);
    assert_eq!(root.to_json()["s"], json!({"a": "1", "b": "2"}));
    assert_eq!(
        collected(&root),
        vec!["ERROR: in file 'conf/s.ini' at line 2: section name error"]
    );
}

// ============================================================================
// .list
// ============================================================================

#[test]
fn list_lines_become_array() {
    let mut root = ConfigValue::object();
    let text = "alpha\n\"beta\"\n# skipped\n]\n\n gamma \n";
    let count = parse_list_at(&mut root, &top(), "servers", text.as_bytes()).unwrap();
    assert_eq!(count, 3);
    assert_eq!(root.to_json(), json!({"servers": ["alpha", "beta", "gamma"]}));
}

#[test]
fn list_opening_bracket_nests() {
    let mut root = ConfigValue::object();
    parse_list_at(&mut root, &top(), "l", "[\na\nb\n]".as_bytes()).unwrap();
    assert_eq!(root.to_json(), json!({"l": [["a", "b"]]}));
}

#[test]
fn list_appends_to_existing_array() {
    let mut root = ConfigValue::from(json!({"l": ["x"]}));
    parse_list_at(&mut root, &top(), "l", "y".as_bytes()).unwrap();
    assert_eq!(root.to_json(), json!({"l": ["x", "y"]}));
}

#[test]
fn list_into_object_is_type_error() {
    let mut root = ConfigValue::from(json!({"l": {"k": "v"}}));
    let err = parse_list_at(&mut root, &top(), "l", "y".as_bytes()).unwrap_err();
    assert!(matches!(err, UniconfError::TypeClash { .. }));
    assert_eq!(root.to_json(), json!({"l": {"k": "v"}}));
}

// ============================================================================
// .json
// ============================================================================

#[test]
fn json_document_is_attached() {
    let mut root = ConfigValue::object();
    let text = r#"{"name": "api", "enabled": true, "off": false, "port": 8080, "none": null}"#;
    let count = parse_json_at(&mut root, &top(), "svc", text).unwrap();
    assert_eq!(count, 5);
    assert_eq!(
        root.to_json(),
        json!({"svc": {"name": "api", "enabled": 1, "off": 0, "port": 8080, "none": null}})
    );
}

#[test]
fn json_preserves_key_order() {
    let mut root = ConfigValue::object();
    parse_json_at(&mut root, &top(), "o", r#"{"z": 1, "a": 2, "m": 3}"#).unwrap();
    let keys: Vec<&String> = root.get("o").unwrap().as_object().unwrap().keys().collect();
    assert_eq!(keys, ["z", "a", "m"]);
}

#[test]
fn json_syntax_error_has_line() {
    let mut root = ConfigValue::object();
    let err = parse_json_at(&mut root, &top(), "bad", "{\n  \"a\": ,\n}").unwrap_err();
    assert!(matches!(err, UniconfError::JsonParse(_)));
    assert_eq!(err.line(), Some(2));
}

// ============================================================================
// .conf / .toml
// ============================================================================

#[test]
fn settings_document_is_attached() {
    let mut root = ConfigValue::object();
    let text = "\
title = \"Settings\"
debug = false
when = 1979-05-27T07:32:00Z

[limits]
max = 10
ratio = 0.5
";
    parse_settings_at(&mut root, &top(), "settings", text).unwrap();
    assert_eq!(
        root.to_json(),
        json!({"settings": {
            "title": "Settings",
            "debug": 0,
            "when": "1979-05-27T07:32:00Z",
            "limits": {"max": 10, "ratio": 0.5}
        }})
    );
}

#[test]
fn settings_strings_are_expanded() {
    let mut root = ConfigValue::from(json!({"base": "/srv"}));
    parse_settings_at(&mut root, &top(), "s", "dir = \"$(base)/data\"").unwrap();
    assert_eq!(root.to_json()["s"]["dir"], "/srv/data");
}

#[test]
fn settings_syntax_error_has_line() {
    let mut root = ConfigValue::object();
    let err = parse_settings_at(&mut root, &top(), "s", "a = 1\nb = = 2\n").unwrap_err();
    assert_eq!(err.line(), Some(2));
}
