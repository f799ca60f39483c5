use serde::Serialize;
use std::collections::HashMap;

use super::access::AccessPolicy;
use super::modifiers::{scan_modifiers, ConstraintSet, ModifierIssue};

/// Type used when an attribute line omits its type token.
pub const DEFAULT_TYPE_TOKEN: &str = "str";

/// One declared field of an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeSpec {
    /// Field name, used verbatim in generated code
    pub var_name: String,
    /// Raw type token before mapping (`int`, `str`, `Category`, ...)
    pub type_token: String,
    /// Raw modifier text following the type token
    pub modifiers: String,
    /// 1-based line number in the definition file (0 when built in code)
    pub line: usize,
}

impl AttributeSpec {
    /// Split attribute text (`title str.nn.max(120)`) into name, type token
    /// and modifier text.
    ///
    /// The type token runs from the second whitespace-delimited token up to
    /// its first `.`; the modifier text is everything after it, spaces
    /// included, so a default such as `.default("two words")` survives.
    pub fn split(text: &str) -> AttributeSpec {
        let text = text.trim();
        let name_end = text.find(char::is_whitespace).unwrap_or(text.len());
        let var_name = text[..name_end].to_string();
        let rest = text[name_end..].trim_start();

        let type_end = rest
            .find(|c: char| c == '.' || c.is_whitespace())
            .unwrap_or(rest.len());
        let type_token = match &rest[..type_end] {
            "" => DEFAULT_TYPE_TOKEN.to_string(),
            token => token.to_string(),
        };
        let modifiers = rest[type_end..].trim().to_string();

        AttributeSpec {
            var_name,
            type_token,
            modifiers,
            line: 0,
        }
    }

    /// Interpret the modifier text.
    pub fn constraints(&self) -> (ConstraintSet, Vec<ModifierIssue>) {
        scan_modifiers(&self.modifiers)
    }
}

/// One entity declared in the DSL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityDefinition {
    /// Name as written; compared case-sensitively
    pub name: String,
    /// Attributes in declaration order
    pub attributes: Vec<AttributeSpec>,
    /// Role sets parsed from the header line
    pub access: AccessPolicy,
    /// 1-based line number of the header
    pub line: usize,
}

impl EntityDefinition {
    /// Create an entity with unrestricted access and no attributes.
    pub fn new(name: impl Into<String>) -> Self {
        EntityDefinition {
            name: name.into(),
            attributes: Vec::new(),
            access: AccessPolicy::default(),
            line: 0,
        }
    }

    /// Append an attribute parsed from `text`.
    pub fn with_attribute(mut self, text: &str) -> Self {
        self.attributes.push(AttributeSpec::split(text));
        self
    }

    /// Replace the access policy.
    pub fn with_access(mut self, access: AccessPolicy) -> Self {
        self.access = access;
        self
    }
}

/// Entities in declaration order, addressable by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EntityCatalog {
    entities: Vec<EntityDefinition>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl EntityCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entity. A redeclared name replaces the earlier definition
    /// in place and returns it.
    pub fn insert(&mut self, entity: EntityDefinition) -> Option<EntityDefinition> {
        match self.index.get(&entity.name) {
            Some(&pos) => Some(std::mem::replace(&mut self.entities[pos], entity)),
            None => {
                self.index.insert(entity.name.clone(), self.entities.len());
                self.entities.push(entity);
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&EntityDefinition> {
        self.index.get(name).map(|&pos| &self.entities[pos])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityDefinition> {
        self.entities.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entities.iter().map(|e| e.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl FromIterator<EntityDefinition> for EntityCatalog {
    fn from_iter<I: IntoIterator<Item = EntityDefinition>>(iter: I) -> Self {
        let mut catalog = EntityCatalog::new();
        for entity in iter {
            catalog.insert(entity);
        }
        catalog
    }
}

impl<'a> IntoIterator for &'a EntityCatalog {
    type Item = &'a EntityDefinition;
    type IntoIter = std::slice::Iter<'a, EntityDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_full_attribute() {
        let attr = AttributeSpec::split("title str.nn.max(120)");
        assert_eq!(attr.var_name, "title");
        assert_eq!(attr.type_token, "str");
        assert_eq!(attr.modifiers, ".nn.max(120)");
    }

    #[test]
    fn test_split_missing_type_defaults_to_string() {
        let attr = AttributeSpec::split("name");
        assert_eq!(attr.type_token, DEFAULT_TYPE_TOKEN);
        assert_eq!(attr.modifiers, "");
    }

    #[test]
    fn test_split_keeps_spaces_in_modifiers() {
        let attr = AttributeSpec::split(r#"label str.default("two words").nn"#);
        assert_eq!(attr.type_token, "str");
        assert_eq!(attr.modifiers, r#".default("two words").nn"#);
    }

    #[test]
    fn test_split_modifiers_without_type() {
        let attr = AttributeSpec::split("code .unique");
        assert_eq!(attr.type_token, DEFAULT_TYPE_TOKEN);
        assert_eq!(attr.modifiers, ".unique");
    }

    #[test]
    fn test_catalog_preserves_order_and_replaces_in_place() {
        let mut catalog: EntityCatalog = ["B", "A", "C"]
            .into_iter()
            .map(|n| EntityDefinition::new(n).with_attribute("x int"))
            .collect();
        let previous = catalog.insert(EntityDefinition::new("A").with_attribute("y str"));
        assert!(previous.is_some());
        assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["B", "A", "C"]);
        let a = catalog.get("A").unwrap();
        assert_eq!(a.attributes[0].var_name, "y");
    }

    #[test]
    fn test_catalog_lookup_is_case_sensitive() {
        let catalog: EntityCatalog = std::iter::once(EntityDefinition::new("User")).collect();
        assert!(catalog.contains("User"));
        assert!(!catalog.contains("user"));
    }
}
