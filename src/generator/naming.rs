//! Names derived from an entity name: Python modules, tables, routes and
//! string literals embedded in generated code.

use serde_json::Value;

/// Python module name of an entity (`OrderItem` → `orderitem`).
pub fn module_name(entity: &str) -> String {
    entity.to_lowercase()
}

/// SQL table name of an entity. Foreign keys target the same name.
///
/// Tables and modules share one name so `.fk` targets can be derived from a
/// type token without the catalog.
pub fn table_name(entity: &str) -> String {
    module_name(entity)
}

/// Naive English plural used for route segments.
///
/// Appends `s` unless the lowercase name already ends in `s`:
/// `user` → `users`, `bus` → `bus`, `category` → `categorys`.
pub fn pluralize(name: &str) -> String {
    let lower = name.to_lowercase();
    if lower.ends_with('s') {
        lower
    } else {
        format!("{lower}s")
    }
}

/// Repository class generated for an entity.
pub fn repository_class(entity: &str) -> String {
    format!("{entity}Repository")
}

/// Double-quoted Python string literal.
///
/// JSON string escaping is a subset of Python's, so the JSON encoding of the
/// value is a valid Python literal.
pub fn python_str_literal(value: &str) -> String {
    Value::String(value.to_string()).to_string()
}

/// Python list of string literals: `["admin", "user"]`.
pub fn python_str_list<'a>(items: impl IntoIterator<Item = &'a str>) -> String {
    let literals: Vec<String> = items.into_iter().map(python_str_literal).collect();
    format!("[{}]", literals.join(", "))
}

/// Render a float bound the way it is written in Python source.
///
/// Whole numbers keep their integer form (`0`, `120`), so `.range(0,)` on an
/// `int` field emits `ge=0` rather than `ge=0.0`.
pub fn python_number(value: f64) -> String {
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize("User"), "users");
        assert_eq!(pluralize("bus"), "bus");
        assert_eq!(pluralize("Category"), "categorys");
        assert_eq!(pluralize("Status"), "status");
    }

    #[test]
    fn test_module_and_table_names() {
        assert_eq!(module_name("OrderItem"), "orderitem");
        assert_eq!(table_name("Category"), "category");
        assert_eq!(repository_class("Product"), "ProductRepository");
    }

    #[test]
    fn test_python_str_literal_escapes() {
        assert_eq!(python_str_literal("shop"), "\"shop\"");
        assert_eq!(python_str_literal("say \"hi\""), r#""say \"hi\"""#);
        assert_eq!(python_str_literal("a\\b"), r#""a\\b""#);
    }

    #[test]
    fn test_python_str_list() {
        assert_eq!(python_str_list(["admin", "user"]), r#"["admin", "user"]"#);
        assert_eq!(python_str_list(Vec::<&str>::new()), "[]");
    }

    #[test]
    fn test_python_number() {
        assert_eq!(python_number(0.0), "0");
        assert_eq!(python_number(120.0), "120");
        assert_eq!(python_number(-1.5), "-1.5");
    }
}
