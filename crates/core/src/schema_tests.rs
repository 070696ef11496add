// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;
use yare::parameterized;

fn compile(schema: Value) -> CompiledSchema {
    CompiledSchema::compile(&schema).unwrap()
}

// ============================================================================
// Compilation
// ============================================================================

#[test]
fn compile_rejects_non_object_schema() {
    let err = CompiledSchema::compile(&json!("string")).unwrap_err();
    assert!(matches!(err, SchemaError::NotAnObject { .. }));
}

#[test]
fn compile_rejects_unknown_type() {
    let err = CompiledSchema::compile(&json!({"type": "decimal"})).unwrap_err();
    assert_eq!(err.to_string(), "unknown type 'decimal' at #");
}

#[test]
fn compile_rejects_bad_pattern_with_location() {
    let schema = json!({
        "type": "object",
        "properties": {"code": {"type": "string", "pattern": "([a-z"}}
    });
    let err = CompiledSchema::compile(&schema).unwrap_err();
    match err {
        SchemaError::Pattern { path, pattern, .. } => {
            assert_eq!(path, "#/properties/code");
            assert_eq!(pattern, "([a-z");
        }
        other => panic!("expected pattern error, got {other:?}"),
    }
}

#[parameterized(
    required_not_list = { json!({"required": "name"}), "required" },
    negative_min_length = { json!({"minLength": -1}), "minLength" },
    minimum_not_number = { json!({"minimum": "5"}), "minimum" },
    items_not_object = { json!({"items": [{"type": "string"}]}), "items" },
    additional_not_bool = { json!({"additionalProperties": {"type": "string"}}), "additionalProperties" },
)]
fn compile_rejects_malformed_keywords(schema: Value, keyword: &str) {
    let err = CompiledSchema::compile(&schema).unwrap_err();
    match err {
        SchemaError::InvalidKeyword { keyword: k, .. } => assert_eq!(k, keyword),
        other => panic!("expected invalid keyword, got {other:?}"),
    }
}

#[test]
fn compile_ignores_unknown_keywords() {
    let schema = compile(json!({"type": "object", "$comment": "x", "title": "Payment"}));
    assert!(schema.check(&json!({}), "/payload").is_empty());
}

// ============================================================================
// Type checks
// ============================================================================

#[parameterized(
    string_ok = { json!({"type": "string"}), json!("a"), true },
    string_bad = { json!({"type": "string"}), json!(1), false },
    integer_ok = { json!({"type": "integer"}), json!(3), true },
    integer_float_whole = { json!({"type": "integer"}), json!(3.0), true },
    integer_bad = { json!({"type": "integer"}), json!(3.5), false },
    number_accepts_integer = { json!({"type": "number"}), json!(3), true },
    union_ok = { json!({"type": ["string", "null"]}), json!(null), true },
    union_bad = { json!({"type": ["string", "null"]}), json!(false), false },
)]
fn type_keyword(schema: Value, value: Value, ok: bool) {
    let errors = compile(schema).check(&value, "/payload");
    assert_eq!(errors.is_empty(), ok, "errors: {errors:?}");
}

#[test]
fn type_mismatch_message_names_both_types() {
    let errors = compile(json!({"type": ["string", "null"]})).check(&json!(12), "/payload");
    assert_eq!(errors, vec!["/payload: expected string or null, got integer"]);
}

// ============================================================================
// Object checks
// ============================================================================

#[test]
fn required_properties_are_reported_individually() {
    let schema = compile(json!({"type": "object", "required": ["username", "email"]}));
    let errors = schema.check(&json!({}), "/payload");
    assert_eq!(
        errors,
        vec![
            "/payload: missing required property 'username'",
            "/payload: missing required property 'email'",
        ]
    );
}

#[test]
fn nested_property_errors_carry_path() {
    let schema = compile(json!({
        "type": "object",
        "properties": {
            "address": {
                "type": "object",
                "properties": {"zip": {"type": "string", "pattern": "^[0-9]{5}$"}}
            }
        }
    }));
    let errors = schema.check(&json!({"address": {"zip": "12ab"}}), "/payload");
    assert_eq!(
        errors,
        vec!["/payload/address/zip: '12ab' does not match pattern '^[0-9]{5}$'"]
    );
}

#[test]
fn additional_properties_false_rejects_unknown_keys() {
    let schema = compile(json!({
        "type": "object",
        "properties": {"id": {"type": "integer"}},
        "additionalProperties": false
    }));
    let errors = schema.check(&json!({"id": 1, "extra": true}), "/payload");
    assert_eq!(errors, vec!["/payload: unexpected property 'extra'"]);
}

#[test]
fn check_except_skips_required_and_nested_checks_for_key() {
    let schema = compile(json!({
        "type": "object",
        "required": ["setting", "value"],
        "properties": {
            "setting": {"type": "string"},
            "value": {"type": "integer"}
        },
        "additionalProperties": false
    }));

    let missing = schema.check_except(&json!({"setting": "login_regex"}), "/payload", "value");
    assert!(missing.is_empty(), "{missing:?}");

    let wrong_type =
        schema.check_except(&json!({"setting": "login_regex", "value": "^a"}), "/payload", "value");
    assert!(wrong_type.is_empty(), "{wrong_type:?}");

    let other = schema.check_except(&json!({"value": 1}), "/payload", "value");
    assert_eq!(other, vec!["/payload: missing required property 'setting'"]);
}

// ============================================================================
// Scalar constraints
// ============================================================================

#[test]
fn exclusive_minimum_rejects_zero_and_negative() {
    let schema = compile(json!({"type": "number", "exclusiveMinimum": 0}));
    assert!(schema.check(&json!(0.01), "/amount").is_empty());
    assert_eq!(
        schema.check(&json!(-5), "/amount"),
        vec!["/amount: -5 must be greater than 0"]
    );
    assert_eq!(schema.check(&json!(0), "/amount").len(), 1);
}

#[test]
fn inclusive_bounds() {
    let schema = compile(json!({"type": "integer", "minimum": 1, "maximum": 10}));
    assert!(schema.check(&json!(1), "/n").is_empty());
    assert!(schema.check(&json!(10), "/n").is_empty());
    assert_eq!(
        schema.check(&json!(11), "/n"),
        vec!["/n: 11 is greater than the maximum of 10"]
    );
}

#[test]
fn enum_and_const() {
    let schema = compile(json!({"enum": ["active", "disabled"]}));
    assert!(schema.check(&json!("active"), "/status").is_empty());
    assert_eq!(
        schema.check(&json!("deleted"), "/status"),
        vec![r#"/status: "deleted" is not one of ["active", "disabled"]"#]
    );

    let schema = compile(json!({"const": 2}));
    assert_eq!(schema.check(&json!(3), "/v"), vec!["/v: must equal 2"]);
}

#[test]
fn string_length_counts_characters() {
    let schema = compile(json!({"type": "string", "minLength": 2, "maxLength": 3}));
    assert!(schema.check(&json!("日本"), "/s").is_empty());
    assert_eq!(schema.check(&json!("a"), "/s").len(), 1);
    assert_eq!(schema.check(&json!("abcd"), "/s").len(), 1);
}

#[parameterized(
    email_ok = { "email", "ops@example.com", true },
    email_no_domain_dot = { "email", "ops@localhost", false },
    email_spaces = { "email", "o ps@example.com", false },
    ipv4_ok = { "ipv4", "10.1.2.3", true },
    ipv4_bad = { "ipv4", "10.1.2", false },
    uuid_ok = { "uuid", "67e55044-10b1-426f-9247-bb680e5fe0c8", true },
    uuid_bad = { "uuid", "not-a-uuid", false },
)]
fn formats(format: &str, value: &str, ok: bool) {
    let schema = compile(json!({"type": "string", "format": format}));
    assert_eq!(schema.check(&json!(value), "/f").is_empty(), ok);
}

#[test]
fn unknown_format_is_a_compile_error() {
    let err = CompiledSchema::compile(&json!({"format": "hostname"})).unwrap_err();
    assert!(matches!(err, SchemaError::UnknownFormat { .. }));
}

// ============================================================================
// Arrays
// ============================================================================

#[test]
fn array_items_and_bounds() {
    let schema = compile(json!({
        "type": "array",
        "items": {"type": "string"},
        "minItems": 1,
        "maxItems": 2
    }));
    assert!(schema.check(&json!(["a"]), "/tags").is_empty());
    assert_eq!(
        schema.check(&json!(["a", 2]), "/tags"),
        vec!["/tags/1: expected string, got integer"]
    );
    assert_eq!(schema.check(&json!([]), "/tags").len(), 1);
    assert_eq!(schema.check(&json!(["a", "b", "c"]), "/tags").len(), 1);
}
