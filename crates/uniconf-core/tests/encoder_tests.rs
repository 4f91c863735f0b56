use serde_json::json;
use uniconf_core::{decode, encode, ConfigValue};

fn encode_json(value: serde_json::Value) -> String {
    encode(&ConfigValue::from(value))
}

// ============================================================================
// Layout
// ============================================================================

#[test]
fn flat_object() {
    assert_eq!(
        encode_json(json!({"name": "demo", "port": 8080})),
        "name: demo\nport: 8080"
    );
}

#[test]
fn nested_object_indents_two_spaces() {
    assert_eq!(
        encode_json(json!({"server": {"tls": {"cert": "c"}}})),
        "server:\n  tls:\n    cert: c"
    );
}

#[test]
fn array_of_scalars() {
    assert_eq!(
        encode_json(json!({"hosts": ["a", "b"]})),
        "hosts:\n  - a\n  - b"
    );
}

#[test]
fn objects_in_arrays_are_compact() {
    assert_eq!(
        encode_json(json!({"users": [{"name": "ann", "role": "admin"}, {"name": "bob"}]})),
        "users:\n  - name: ann\n    role: admin\n  - name: bob"
    );
}

#[test]
fn nested_arrays_are_compact() {
    assert_eq!(
        encode_json(json!({"grid": [["1", "2"], ["3"]]})),
        "grid:\n  - - 1\n    - 2\n  - - 3"
    );
}

#[test]
fn root_array() {
    assert_eq!(encode_json(json!(["x", {"k": "v"}])), "- x\n- k: v");
}

#[test]
fn empty_containers_and_null_have_no_value() {
    assert_eq!(
        encode_json(json!({"a": {}, "b": [], "c": null, "d": [{}]})),
        "a:\nb:\nc:\nd:\n  -"
    );
}

#[test]
fn numbers_are_plain_decimals() {
    assert_eq!(
        encode_json(json!({"i": 3, "f": 0.25, "n": -7})),
        "i: 3\nf: 0.25\nn: -7"
    );
}

// ============================================================================
// Quoting
// ============================================================================

#[test]
fn plain_strings_are_bare() {
    assert_eq!(
        encode_json(json!({"url": "http://host:80/x", "tag": "a#b"})),
        "url: http://host:80/x\ntag: a#b"
    );
}

#[test]
fn ambiguous_strings_are_quoted() {
    assert_eq!(
        encode_json(json!({
            "empty": "",
            "pair": "k: v",
            "comment": "a # b",
            "padded": " x ",
            "dash": "- y",
            "lead": "\"q\""
        })),
        "empty: \"\"\npair: \"k: v\"\ncomment: \"a # b\"\npadded: \" x \"\ndash: \"- y\"\nlead: '\"q\"'"
    );
}

#[test]
fn ambiguous_keys_are_quoted() {
    assert_eq!(
        encode_json(json!({"a:b": "1", "# c": "2"})),
        "\"a:b\": 1\n\"# c\": 2"
    );
}

// ============================================================================
// Decode after encode
// ============================================================================

#[test]
fn quoted_output_decodes_to_original() {
    let value = ConfigValue::from(json!({
        "pair": "k: v",
        "comment": "a # b",
        "dash": "- y",
        "a:b": "c",
        "list": ["- z", "w: x", {"k": "v: w"}]
    }));
    assert_eq!(decode(&encode(&value)).unwrap(), value);
}

#[test]
fn empty_containers_read_back_as_null() {
    let value = ConfigValue::from(json!({"a": {}, "b": [], "d": [{}], "e": "x"}));
    let back = decode(&encode(&value)).unwrap();
    assert_ne!(back, value);
    assert_eq!(back.to_json(), json!({"a": null, "b": null, "d": [null], "e": "x"}));
}

#[test]
fn decoded_document_encodes_to_same_text() {
    let text = "server:\n  hosts:\n    - name: a\n      port: 1\n    - name: b\n  tls: on";
    assert_eq!(encode(&decode(text).unwrap()), text);
}
