#![allow(clippy::unwrap_used, clippy::expect_used)]

use entity_scaffold::dsl::{
    get_access, load_definitions, map_type, parse, parse_modifiers, ResolvedType,
};
use std::fs;
use std::path::{Path, PathBuf};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn test_load_shop_fixture() {
    let (catalog, diagnostics) = load_definitions(&fixture("shop.txt")).unwrap();
    assert!(diagnostics.is_empty());
    let names: Vec<&str> = catalog.names().collect();
    assert_eq!(names, vec!["Product", "Category"]);

    let product = catalog.get("Product").unwrap();
    assert_eq!(product.line, 2);
    let fields: Vec<&str> = product.attributes.iter().map(|a| a.var_name.as_str()).collect();
    assert_eq!(fields, vec!["title", "price", "category"]);
    assert_eq!(product.attributes[2].type_token, "Category");
    assert_eq!(product.attributes[2].modifiers, ".fk");
}

#[test]
fn test_get_access_reads_header_markers() {
    let text = fs::read_to_string(fixture("school.txt")).unwrap();

    let enrollment = get_access("Enrollment", &text);
    let read: Vec<&str> = enrollment.read_roles.iter().collect();
    assert_eq!(read, vec!["admin", "teacher"]);
    assert!(enrollment.write_roles.contains("admin"));
    assert_eq!(enrollment.delete_roles.len(), 1);

    let student = get_access("Student", &text);
    assert!(!student.read_roles.is_any());
    assert!(student.write_roles.is_any());

    assert!(get_access("Course", &text).is_unrestricted());
    assert!(get_access("Missing", &text).is_unrestricted());
}

#[test]
fn test_parse_modifiers_on_attribute_line() {
    let c = parse_modifiers("price float.range(0,).nn");
    assert!(c.not_null);
    assert_eq!(c.range_min, Some(0.0));
    assert_eq!(c.range_max, None);
    assert!(!c.unique);

    let c = parse_modifiers("code str.unique.len(12).default(\"A-1\")");
    assert!(c.unique);
    assert_eq!(c.max_length, Some(12));
    assert_eq!(c.default_value.as_deref(), Some("\"A-1\""));
}

#[test]
fn test_attribute_without_type_defaults_to_str() {
    let catalog = parse("Note\n- body\n").unwrap();
    let body = &catalog.get("Note").unwrap().attributes[0];
    assert_eq!(body.type_token, "str");
    assert_eq!(map_type(&body.type_token), ResolvedType::String);
}

#[test]
fn test_unknown_type_is_kept_verbatim() {
    assert_eq!(map_type("Uuid"), ResolvedType::Custom("Uuid".to_string()));
}

#[test]
fn test_missing_file_is_io_error() {
    let err = load_definitions(Path::new("/definitely/not/here.txt")).unwrap_err();
    assert!(!err.is_malformed_definition());
    assert!(err.to_string().contains("/definitely/not/here.txt"));
}
