//! # Integration Tests for jsv-validator
//!
//! End-to-end validation through the public API: the keyword catalogue,
//! the message wire shape, `$ref` handling, format attributes, exception
//! thresholds, and combinator sub-reports.

use std::sync::Arc;

use jsv_core::{Domain, LogLevel, ProcessingReport};
use jsv_validator::{validate, FormatAttribute, ValidationOptions, ValidationProcessor};
use serde_json::{json, Value};

/// Helper: validate with default options, panicking on an exception.
fn check(schema: Value, instance: Value) -> ProcessingReport {
    validate(&schema, &instance, &ValidationOptions::default())
        .unwrap_or_else(|e| panic!("unexpected exception: {e}"))
}

/// Helper: messages at ERROR or above.
fn errors(report: &ProcessingReport) -> Vec<&jsv_core::ProcessingMessage> {
    report.iter().filter(|m| m.level() >= LogLevel::Error).collect()
}

/// Helper: assert exactly one ERROR for `keyword`, and return its JSON.
fn single_error(report: &ProcessingReport, keyword: &str) -> Value {
    let errors = errors(report);
    assert_eq!(errors.len(), 1, "{report}");
    assert_eq!(errors[0].keyword(), Some(keyword), "{report}");
    errors[0].as_json()
}

// -- Keyword Catalogue --------------------------------------------------------

#[test]
fn test_keyword_catalogue_accepts_and_rejects() {
    let cases = [
        (json!({"type": "integer"}), json!(3), json!(3.5)),
        (json!({"type": ["string", "null"]}), json!(null), json!(1)),
        (json!({"type": "number"}), json!(2), json!("2")),
        (json!({"enum": [1, "a"]}), json!(1.0), json!("b")),
        (json!({"minimum": 5}), json!(5), json!(4.99)),
        (json!({"minimum": 5, "exclusiveMinimum": true}), json!(5.01), json!(5)),
        (json!({"maximum": 5, "exclusiveMaximum": true}), json!(4), json!(5)),
        (json!({"multipleOf": 0.5}), json!(2.5), json!(2.25)),
        (json!({"minLength": 2}), json!("日本"), json!("日")),
        (json!({"maxLength": 2}), json!("ab"), json!("abc")),
        (json!({"pattern": "^[a-z]+$"}), json!("abc"), json!("ab1")),
        (json!({"pattern": "b"}), json!("abc"), json!("xyz")),
        (json!({"minItems": 1}), json!([0]), json!([])),
        (json!({"maxItems": 1}), json!([0]), json!([0, 1])),
        (json!({"uniqueItems": true}), json!([1, 2]), json!([1, 1.0])),
        (json!({"items": {"type": "string"}}), json!(["a"]), json!(["a", 1])),
        (
            json!({"items": [{"type": "string"}], "additionalItems": false}),
            json!(["a"]),
            json!(["a", "b"]),
        ),
        (
            json!({"items": [{}], "additionalItems": {"type": "integer"}}),
            json!(["x", 1]),
            json!(["x", "y"]),
        ),
        (json!({"required": ["a"]}), json!({"a": 0}), json!({"b": 0})),
        (json!({"minProperties": 1}), json!({"a": 0}), json!({})),
        (json!({"maxProperties": 1}), json!({"a": 0}), json!({"a": 0, "b": 1})),
        (
            json!({"properties": {"a": {"type": "integer"}}}),
            json!({"a": 1, "b": "x"}),
            json!({"a": "x"}),
        ),
        (
            json!({"patternProperties": {"^x-": {"type": "string"}}}),
            json!({"x-a": "s"}),
            json!({"x-a": 1}),
        ),
        (
            json!({"properties": {"a": {}}, "additionalProperties": false}),
            json!({"a": 1}),
            json!({"a": 1, "b": 2}),
        ),
        (
            json!({"additionalProperties": {"type": "boolean"}}),
            json!({"a": true}),
            json!({"a": 1}),
        ),
        (json!({"dependencies": {"a": ["b"]}}), json!({"a": 1, "b": 2}), json!({"a": 1})),
        (
            json!({"dependencies": {"a": {"required": ["c"]}}}),
            json!({"a": 1, "c": 2}),
            json!({"a": 1}),
        ),
        (json!({"allOf": [{"minimum": 1}, {"maximum": 3}]}), json!(2), json!(4)),
        (json!({"anyOf": [{"type": "string"}, {"minimum": 3}]}), json!(5), json!(1)),
        (json!({"oneOf": [{"minimum": 3}, {"maximum": 5}]}), json!(1), json!(4)),
        (json!({"not": {"type": "null"}}), json!(0), json!(null)),
        (json!({"format": "date"}), json!("2013-01-09"), json!("2013-01-32")),
        (json!({"format": "ipv4"}), json!("10.0.0.1"), json!("10.0.0")),
    ];

    for (schema, valid, invalid) in cases {
        let report = check(schema.clone(), valid.clone());
        assert!(report.is_success(), "{schema} should accept {valid}: {report}");
        let report = check(schema.clone(), invalid.clone());
        assert!(!report.is_success(), "{schema} should reject {invalid}");
    }
}

#[test]
fn test_keywords_ignore_other_instance_types() {
    let schema = json!({
        "minLength": 3, "minimum": 10, "minItems": 2, "required": ["a"], "format": "email"
    });
    for instance in [json!(null), json!(true), json!("a@b.c"), json!(11), json!([1, 2]), json!({"a": 1})] {
        assert!(check(schema.clone(), instance.clone()).is_success(), "{instance}");
    }
}

// -- Message Shape ------------------------------------------------------------

#[test]
fn test_validation_message_wire_shape() {
    let schema = json!({"properties": {"n": {"minimum": 10}}});
    let report = check(schema, json!({"n": 3}));
    let msg = single_error(&report, "minimum");

    let keys: Vec<&str> = msg.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(&keys[..6], ["level", "message", "domain", "keyword", "schema", "instance"]);
    assert_eq!(msg["level"], "ERROR");
    assert_eq!(msg["domain"], "validation");
    assert_eq!(msg["schema"], json!({"loadingURI": "#", "pointer": "/properties/n"}));
    assert_eq!(msg["instance"], json!({"pointer": "/n"}));
    assert_eq!(msg["minimum"], 10);
    assert_eq!(msg["found"], 3);
}

#[test]
fn test_additional_properties_lists_unwanted_sorted() {
    let schema = json!({"properties": {"a": {}}, "additionalProperties": false});
    let report = check(schema, json!({"z": 1, "a": 2, "m": 3}));
    let msg = single_error(&report, "additionalProperties");
    assert_eq!(msg["unwanted"], json!(["m", "z"]));
}

#[test]
fn test_required_lists_missing() {
    let report = check(json!({"required": ["a", "b", "c"]}), json!({"b": 1}));
    let msg = single_error(&report, "required");
    assert_eq!(msg["missing"], json!(["a", "c"]));
    assert_eq!(msg["message"], "object has missing required properties ([\"a\",\"c\"])");
}

#[test]
fn test_type_message_text() {
    let report = check(json!({"type": ["string", "null"]}), json!(1));
    let msg = single_error(&report, "type");
    assert_eq!(
        msg["message"],
        "instance type (integer) does not match any allowed primitive type (allowed: [\"string\",\"null\"])"
    );
    assert_eq!(msg["found"], "integer");
}

#[test]
fn test_errors_in_instance_order() {
    let schema = json!({"items": {"type": "string"}});
    let report = check(schema, json!(["a", 1, "b", 2]));
    let pointers: Vec<Value> = errors(&report)
        .iter()
        .map(|m| m.as_json()["instance"]["pointer"].clone())
        .collect();
    assert_eq!(pointers, [json!("/1"), json!("/3")]);
}

// -- Syntax -------------------------------------------------------------------

#[test]
fn test_invalid_keyword_does_not_block_siblings() {
    let schema = json!({"minLength": "three", "maxLength": 2});
    let report = check(schema, json!("abcd"));

    let syntax: Vec<_> = report.iter().filter(|m| m.domain() == Some(Domain::Syntax)).collect();
    assert_eq!(syntax.len(), 1);
    assert_eq!(syntax[0].keyword(), Some("minLength"));
    assert_eq!(syntax[0].level(), LogLevel::Error);

    let validation: Vec<_> = report
        .iter()
        .filter(|m| m.domain() == Some(Domain::Validation))
        .collect();
    assert_eq!(validation.len(), 1);
    assert_eq!(validation[0].keyword(), Some("maxLength"));
}

#[test]
fn test_unknown_keywords_warned_once() {
    let schema = json!({"items": {"frobnicate": true, "colour": "red"}});
    let report = check(schema, json!([1, 2, 3]));
    assert!(report.is_success());
    assert_eq!(report.len(), 1);
    let msg = report.messages()[0].as_json();
    assert_eq!(msg["level"], "WARNING");
    assert_eq!(msg["ignored"], json!(["colour", "frobnicate"]));
    assert_eq!(msg["schema"]["pointer"], "/items");
}

#[test]
fn test_non_object_subschema_is_syntax_error() {
    let report = check(json!({"properties": {"a": 3}, "required": ["a"]}), json!({}));
    let syntax: Vec<_> = report.iter().filter(|m| m.domain() == Some(Domain::Syntax)).collect();
    assert_eq!(syntax.len(), 1);
    assert_eq!(syntax[0].keyword(), Some("properties"));
    assert!(errors(&report).iter().any(|m| m.keyword() == Some("required")));
}

// -- References ---------------------------------------------------------------

#[test]
fn test_ref_replaces_sibling_keywords() {
    let schema = json!({
        "definitions": {"s": {"type": "string"}},
        "properties": {"a": {"$ref": "#/definitions/s", "maxLength": 1}}
    });
    let report = check(schema, json!({"a": "long string"}));
    assert!(report.is_success(), "{report}");
}

#[test]
fn test_recursive_schema_validates_nested_data() {
    let schema = json!({
        "type": "object",
        "properties": {
            "value": {"type": "integer"},
            "next": {"$ref": "#"}
        }
    });
    let good = json!({"value": 1, "next": {"value": 2, "next": {"value": 3}}});
    let bad = json!({"value": 1, "next": {"value": 2, "next": {"value": "three"}}});
    assert!(check(schema.clone(), good).is_success());
    let report = check(schema, bad);
    let msg = single_error(&report, "type");
    assert_eq!(msg["instance"]["pointer"], "/next/next/value");
    assert_eq!(msg["schema"]["pointer"], "/properties/value");
}

#[test]
fn test_cross_document_ref() {
    let processor = ValidationProcessor::builder()
        .with_document(
            "http://example.com/defs.json",
            json!({"definitions": {"port": {"type": "integer", "minimum": 1, "maximum": 65535}}}),
        )
        .unwrap()
        .build();
    let schema = json!({
        "properties": {"port": {"$ref": "http://example.com/defs.json#/definitions/port"}}
    });
    let options = ValidationOptions::default();

    assert!(processor.validate(&schema, &json!({"port": 80}), &options).unwrap().is_success());

    let report = processor.validate(&schema, &json!({"port": 0}), &options).unwrap();
    let msg = single_error(&report, "minimum");
    assert_eq!(
        msg["schema"],
        json!({"loadingURI": "http://example.com/defs.json#", "pointer": "/definitions/port"})
    );
}

#[test]
fn test_validate_preloaded_uri_with_relative_ref() {
    let processor = ValidationProcessor::builder()
        .with_document("http://example.com/root.json", json!({"items": {"$ref": "item.json#"}}))
        .unwrap()
        .with_document("http://example.com/item.json", json!({"type": "boolean"}))
        .unwrap()
        .build();
    let options = ValidationOptions::default();
    let ok = processor
        .validate_uri("http://example.com/root.json", &json!([true]), &options)
        .unwrap();
    assert!(ok.is_success());
    let bad = processor
        .validate_uri("http://example.com/root.json", &json!([true, 1]), &options)
        .unwrap();
    assert_eq!(errors(&bad).len(), 1);
}

#[test]
fn test_unknown_document_is_resolution_error() {
    let report = check(json!({"items": {"$ref": "http://example.com/nope.json#"}}), json!([1]));
    let msg = single_error(&report, "$ref");
    assert_eq!(msg["domain"], "resolution");
    assert_eq!(msg["ref"], "http://example.com/nope.json#");
}

// -- Formats ------------------------------------------------------------------

#[test]
fn test_format_negative_set_yields_single_error() {
    let negatives = [
        ("date", "not-a-date", "date"),
        ("date", "2012-02-30", "date"),
        ("time", "25:00:00", "time"),
        ("date-time", "2012-02-30T00:00:00Z", "date-time"),
        ("email", "no-at-sign", "email address"),
        ("hostname", "-bad-", "hostname"),
        ("ipv4", "1.2.3.4.5", "IPv4 address"),
        ("ipv6", "::g", "IPv6 address"),
        ("uri", "not a uri", "URI"),
        ("regex", "[", "regular expression"),
        ("uuid", "1234", "UUID"),
    ];
    for (format, value, description) in negatives {
        let report = check(json!({"format": format}), json!(value));
        let msg = single_error(&report, "format");
        assert_eq!(msg["domain"], "validation");
        assert_eq!(msg["message"], format!("string is not a valid {description}"));
        assert_eq!(msg["attribute"], format);
        assert_eq!(msg["value"], value);
    }
}

#[test]
fn test_format_check_is_idempotent() {
    let schema = json!({"format": "date-time"});
    for value in ["2020-02-29T23:59:59Z", "1999-12-31T00:00:00.5+05:30"] {
        for _ in 0..2 {
            assert!(check(schema.clone(), json!(value)).is_success(), "{value}");
        }
    }
}

#[test]
fn test_unsupported_format_warns() {
    let report = check(json!({"format": "phone-number"}), json!("555"));
    assert!(report.is_success());
    assert_eq!(report.len(), 1);
    let msg = report.messages()[0].as_json();
    assert_eq!(msg["level"], "WARNING");
    assert_eq!(msg["attribute"], "phone-number");
}

struct Hex;

impl FormatAttribute for Hex {
    fn description(&self) -> &str {
        "hexadecimal string"
    }

    fn is_valid(&self, value: &str) -> bool {
        !value.is_empty() && value.chars().all(|c| c.is_ascii_hexdigit())
    }
}

#[test]
fn test_custom_format_attribute() {
    let processor = ValidationProcessor::builder()
        .with_format("hex", Arc::new(Hex))
        .unwrap()
        .build();
    let schema = json!({"format": "hex"});
    let options = ValidationOptions::default();
    assert!(processor.validate(&schema, &json!("c0ffee"), &options).unwrap().is_success());
    let report = processor.validate(&schema, &json!("coffee"), &options).unwrap();
    assert_eq!(
        single_error(&report, "format")["message"],
        "string is not a valid hexadecimal string"
    );
}

// -- Thresholds ---------------------------------------------------------------

#[test]
fn test_error_threshold_aborts_on_first_error() {
    let options = ValidationOptions::default().with_exception_threshold(LogLevel::Error);
    let schema = json!({"items": {"type": "string"}});
    let err = validate(&schema, &json!([1, 2, 3]), &options).unwrap_err();
    assert_eq!(err.message().level(), LogLevel::Error);
    assert_eq!(err.message().as_json()["instance"]["pointer"], "/0");
}

#[test]
fn test_warning_stored_before_abort() {
    let processor = ValidationProcessor::new();
    let options = ValidationOptions::default().with_exception_threshold(LogLevel::Error);
    let tree = jsv_core::SchemaTree::anonymous(json!({"unknownThing": 1, "type": "string"}));
    let mut report = options.new_report();
    let err = processor
        .validate_into(&tree, &json!(5), &options, &mut report)
        .unwrap_err();
    assert_eq!(err.message().keyword(), Some("type"));
    assert_eq!(report.len(), 2);
    assert_eq!(report.messages()[0].level(), LogLevel::Warning);
    assert_eq!(report.messages()[1].level(), LogLevel::Error);
}

#[test]
fn test_log_level_filters_stored_messages() {
    let options = ValidationOptions::default().with_log_level(LogLevel::Error);
    let schema = json!({"unknownThing": 1, "minimum": 3});
    let report = validate(&schema, &json!(1), &options).unwrap();
    assert_eq!(report.len(), 1);
    assert_eq!(report.messages()[0].level(), LogLevel::Error);
    assert!(!report.is_success());
}

// -- Combinators --------------------------------------------------------------

#[test]
fn test_any_of_embeds_branch_reports() {
    let schema = json!({"anyOf": [{"type": "string"}, {"minimum": 10}]});
    let report = check(schema, json!(3));
    let msg = single_error(&report, "anyOf");
    assert_eq!(msg["nrSchemas"], 2);
    let reports = msg["reports"].as_object().unwrap();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports["/anyOf/0"][0]["keyword"], "type");
    assert_eq!(reports["/anyOf/1"][0]["keyword"], "minimum");
}

#[test]
fn test_one_of_counts_matches() {
    let schema = json!({"oneOf": [{"type": "integer"}, {"minimum": 0}]});
    let report = check(schema, json!(5));
    let msg = single_error(&report, "oneOf");
    assert_eq!(msg["matched"], 2);
    assert_eq!(msg["reports"]["/oneOf/0"], json!([]));
}

#[test]
fn test_branch_errors_stay_private_on_success() {
    let schema = json!({"anyOf": [{"type": "string"}, {"type": "integer"}]});
    let report = check(schema, json!(1));
    assert!(report.is_empty(), "{report}");
}

#[test]
fn test_not_rejects_matching_instance() {
    let report = check(json!({"not": {"enum": ["forbidden"]}}), json!("forbidden"));
    let msg = single_error(&report, "not");
    assert_eq!(msg["message"], "instance matched a schema which it should not have");
}

/// Helper: messages in the `syntax` domain.
fn syntax_messages(report: &ProcessingReport) -> Vec<Value> {
    report
        .iter()
        .filter(|m| m.domain() == Some(Domain::Syntax))
        .map(|m| m.as_json())
        .collect()
}

#[test]
fn test_syntax_error_inside_not_is_reported() {
    let report = check(json!({"not": {"minLength": "x"}}), json!("abc"));
    assert!(!report.is_success());
    let syntax = syntax_messages(&report);
    assert_eq!(syntax.len(), 1, "{report}");
    assert_eq!(syntax[0]["level"], "ERROR");
    assert_eq!(syntax[0]["keyword"], "minLength");
    assert_eq!(syntax[0]["schema"]["pointer"], "/not");
}

#[test]
fn test_syntax_error_inside_matching_any_of_is_reported() {
    let report = check(json!({"anyOf": [{"minLength": "x"}, {}]}), json!("abc"));
    assert!(!report.is_success());
    assert_eq!(report.len(), 1, "{report}");
    let syntax = syntax_messages(&report);
    assert_eq!(syntax[0]["keyword"], "minLength");
    assert_eq!(syntax[0]["schema"]["pointer"], "/anyOf/0");
}

#[test]
fn test_syntax_error_inside_matching_one_of_is_reported() {
    let schema = json!({"oneOf": [{"minLength": "x"}, {"type": "integer"}]});
    let report = check(schema, json!("abc"));
    assert!(!report.is_success());
    assert!(errors(&report).iter().all(|m| m.keyword() != Some("oneOf")), "{report}");
    let syntax = syntax_messages(&report);
    assert_eq!(syntax.len(), 1);
    assert_eq!(syntax[0]["schema"]["pointer"], "/oneOf/0");
}

#[test]
fn test_unknown_keyword_inside_not_is_warned() {
    let report = check(json!({"not": {"type": "integer", "colour": "red"}}), json!("abc"));
    assert!(report.is_success());
    assert_eq!(report.len(), 1, "{report}");
    let msg = report.messages()[0].as_json();
    assert_eq!(msg["level"], "WARNING");
    assert_eq!(msg["ignored"], json!(["colour"]));
    assert_eq!(msg["schema"]["pointer"], "/not");
}

#[test]
fn test_schema_messages_from_nested_branches_reported_once() {
    let schema = json!({"items": {"anyOf": [{"not": {"minLength": "x", "type": "integer"}}]}});
    let report = check(schema, json!(["a", "b", "c"]));
    let syntax = syntax_messages(&report);
    assert_eq!(syntax.len(), 1, "{report}");
    assert_eq!(syntax[0]["schema"]["pointer"], "/items/anyOf/0/not");
    assert!(errors(&report).iter().all(|m| m.domain() == Some(Domain::Syntax)));
}

#[test]
fn test_syntax_error_inside_branch_honours_threshold() {
    let options = ValidationOptions::default().with_exception_threshold(LogLevel::Error);
    let err = validate(&json!({"anyOf": [{"minLength": "x"}, {}]}), &json!("abc"), &options)
        .unwrap_err();
    assert_eq!(err.message().domain(), Some(Domain::Syntax));
    assert_eq!(err.message().keyword(), Some("minLength"));
}
