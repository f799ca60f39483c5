//! DSL type tokens and their mapping onto generated field types.

use serde::Serialize;
use std::fmt;

/// Field type after mapping a DSL type token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "name")]
pub enum ResolvedType {
    Integer,
    String,
    Float,
    Boolean,
    Date,
    DateTime,
    /// Any token outside the primitive alias table, kept verbatim.
    Custom(String),
}

impl ResolvedType {
    /// Whether range bounds (`ge` / `le`) apply to this type.
    pub fn is_numeric(&self) -> bool {
        matches!(self, ResolvedType::Integer | ResolvedType::Float)
    }

    /// Whether a length cap (`max_length`) applies to this type.
    pub fn is_string(&self) -> bool {
        matches!(self, ResolvedType::String)
    }

    /// Whether the token named something other than a primitive.
    pub fn is_custom(&self) -> bool {
        matches!(self, ResolvedType::Custom(_))
    }

    /// The Python annotation used in generated models.
    pub fn python_type(&self) -> &str {
        match self {
            ResolvedType::Integer => "int",
            ResolvedType::String => "str",
            ResolvedType::Float => "float",
            ResolvedType::Boolean => "bool",
            ResolvedType::Date => "date",
            ResolvedType::DateTime => "datetime",
            ResolvedType::Custom(name) => name,
        }
    }
}

impl fmt::Display for ResolvedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedType::Custom(name) => write!(f, "custom({name})"),
            other => f.write_str(other.python_type()),
        }
    }
}

/// Map a DSL type token to a [`ResolvedType`].
///
/// Matching is case-insensitive against the fixed alias table. An empty token
/// means the attribute omitted its type and defaults to a string. Anything else
/// becomes [`ResolvedType::Custom`] with the token preserved as written; the
/// resolver decides whether that is a relation to a declared entity or an
/// unrecognized type worth a warning.
pub fn map_type(token: &str) -> ResolvedType {
    match token.trim().to_ascii_lowercase().as_str() {
        "" | "str" | "string" => ResolvedType::String,
        "int" | "integer" => ResolvedType::Integer,
        "float" | "decimal" => ResolvedType::Float,
        "bool" | "boolean" => ResolvedType::Boolean,
        "date" => ResolvedType::Date,
        "datetime" => ResolvedType::DateTime,
        _ => ResolvedType::Custom(token.trim().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_table() {
        assert_eq!(map_type("int"), ResolvedType::Integer);
        assert_eq!(map_type("integer"), ResolvedType::Integer);
        assert_eq!(map_type("str"), ResolvedType::String);
        assert_eq!(map_type("string"), ResolvedType::String);
        assert_eq!(map_type("float"), ResolvedType::Float);
        assert_eq!(map_type("decimal"), ResolvedType::Float);
        assert_eq!(map_type("bool"), ResolvedType::Boolean);
        assert_eq!(map_type("boolean"), ResolvedType::Boolean);
        assert_eq!(map_type("date"), ResolvedType::Date);
        assert_eq!(map_type("datetime"), ResolvedType::DateTime);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(map_type("INT"), ResolvedType::Integer);
        assert_eq!(map_type("DateTime"), ResolvedType::DateTime);
        assert_eq!(map_type("Boolean"), ResolvedType::Boolean);
    }

    #[test]
    fn test_custom_keeps_token_verbatim() {
        assert_eq!(map_type("Category"), ResolvedType::Custom("Category".into()));
        assert_eq!(map_type("uuid"), ResolvedType::Custom("uuid".into()));
        assert!(map_type("Category").is_custom());
    }

    #[test]
    fn test_empty_token_defaults_to_string() {
        assert_eq!(map_type(""), ResolvedType::String);
    }

    #[test]
    fn test_applicability() {
        assert!(ResolvedType::Integer.is_numeric());
        assert!(ResolvedType::Float.is_numeric());
        assert!(!ResolvedType::String.is_numeric());
        assert!(ResolvedType::String.is_string());
        assert!(!ResolvedType::Custom("X".into()).is_numeric());
    }

    #[test]
    fn test_python_type() {
        assert_eq!(ResolvedType::DateTime.python_type(), "datetime");
        assert_eq!(ResolvedType::Custom("Owner".into()).python_type(), "Owner");
    }
}
