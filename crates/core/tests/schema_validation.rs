//! Validates serialized descriptor sets against the formal schema at
//! schema/descriptor-set-schema.json.

use protodesc_core::{compile_str, parse_all, Config, DescriptorSet, InMemoryProvider, NestingMode};
use std::path::Path;

fn validator() -> jsonschema::Validator {
    let schema_path =
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../../schema/descriptor-set-schema.json");
    let schema_src = std::fs::read_to_string(&schema_path)
        .unwrap_or_else(|e| panic!("Failed to read schema at {}: {}", schema_path.display(), e));
    let schema_value: serde_json::Value = serde_json::from_str(&schema_src).unwrap();
    jsonschema::validator_for(&schema_value)
        .unwrap_or_else(|e| panic!("Failed to compile schema: {}", e))
}

fn assert_valid(label: &str, set: &DescriptorSet) {
    let instance = set.to_json_value();
    let failures: Vec<String> = validator()
        .iter_errors(&instance)
        .map(|e| e.to_string())
        .collect();
    assert!(
        failures.is_empty(),
        "{} does not match the schema:\n{}",
        label,
        failures.join("\n")
    );
}

#[test]
fn fixture_library_output_matches_schema() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
    let set = parse_all(&[root.join("library"), root.join("bundled")]).unwrap();
    assert_eq!(set.len(), 4);
    assert_valid("fixtures", &set);
}

#[test]
fn flattened_output_matches_schema() {
    let src = r#"syntax = "proto2";
package acme;
message Outer {
  optional Inner inner = 1;
  repeated Kind kinds = 2;
  message Inner { required bytes data = 1; }
  enum Kind { NONE = 0; SOME = -1; }
}"#;
    let provider = InMemoryProvider::new();
    let config = Config::default().with_nesting(NestingMode::Flatten);
    let set = compile_str("outer.proto", src, &provider, &config).unwrap();
    assert_valid("flattened", &set);
}

#[test]
fn public_and_weak_imports_match_schema() {
    let provider = InMemoryProvider::new()
        .with_file("a.proto", "syntax = \"proto3\";")
        .with_file("b.proto", "syntax = \"proto3\";");
    let set = compile_str(
        "main.proto",
        "syntax = \"proto3\";\nimport public \"a.proto\";\nimport weak \"b.proto\";",
        &provider,
        &Config::default(),
    )
    .unwrap();
    let main = set.file("main.proto").unwrap();
    assert_eq!(main.public_dependencies, vec![0]);
    assert_eq!(main.weak_dependencies, vec![1]);
    assert_valid("public/weak", &set);
}

#[test]
fn schema_rejects_named_field_without_type_name() {
    let bad = serde_json::json!({
        "files": [{
            "name": "x.proto",
            "syntax": "proto3",
            "dependencies": [],
            "messages": [{
                "name": "X",
                "fields": [{ "name": "y", "number": 1, "kind": "MESSAGE", "label": "OPTIONAL" }],
                "nested_messages": [],
                "nested_enums": []
            }],
            "enums": []
        }]
    });
    assert!(!validator().is_valid(&bad));
}
