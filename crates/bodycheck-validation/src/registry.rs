//! Type registry
//!
//! The registry maps type names to compiled [`TypeDescriptor`]s. It is built
//! once, before any validation call, from a JSON document of the form:
//!
//! ```json
//! {
//!   "ServiceAPIDescription": {
//!     "mandatory_attributes": { "apiName": "string" },
//!     "optional_attributes": { "aefProfiles": "AefProfile" },
//!     "regex_attributes": { "^x-": "string" },
//!     "oneOf": ["interfaceDescriptions", "domainName"]
//!   },
//!   "Protocol": { "enum": ["HTTP_1_1", "HTTP_2"] },
//!   "Ipv4Addr": { "regex": "^[0-9.]+$" },
//!   "ProblemDetails": { "Check": false }
//! }
//! ```
//!
//! All patterns are compiled while loading, so a registry that loads is
//! guaranteed not to fail on a bad regex during validation. The registry is
//! immutable afterwards and can be shared across threads.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::errors::RegistryError;
use crate::formats::Pattern;
use crate::types::{kind_name, BuiltinType, CompositeType, RegexAttribute, TypeDescriptor};

/// Definition as written in the registry document
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawDefinition {
    mandatory_attributes: Option<Map<String, Value>>,
    optional_attributes: Option<Map<String, Value>>,
    regex_attributes: Option<Map<String, Value>>,
    #[serde(rename = "enum")]
    enum_values: Option<Vec<String>>,
    regex: Option<String>,
    #[serde(rename = "oneOf")]
    one_of: Option<Vec<String>>,
    #[serde(rename = "Check", deserialize_with = "present_value")]
    check: Option<Value>,
}

/// Keeps an explicit `null` distinct from an absent key
fn present_value<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

/// `false`, `null`, `0`, `""`, `[]` and `{}` switch checking off
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// A type name referenced by a composite attribute that nothing defines
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct UnresolvedReference {
    /// Composite type declaring the attribute
    pub owner: String,
    /// Attribute name, or pattern for regex attributes
    pub attribute: String,
    /// Referenced type name
    pub type_name: String,
}

impl fmt::Display for UnresolvedReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} refers to undefined type \"{}\"",
            self.owner, self.attribute, self.type_name
        )
    }
}

/// Immutable mapping from type name to compiled definition
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: HashMap<String, TypeDescriptor>,
}

impl TypeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a registry from a JSON file
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Io`] if the file cannot be read, and any error
    /// [`TypeRegistry::from_json_str`] returns for its content.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let registry = Self::from_json_str(&content)?;
        tracing::info!(
            "Loaded {} type definitions from {}",
            registry.len(),
            path.display()
        );
        Ok(registry)
    }

    /// Parse a registry from JSON text
    pub fn from_json_str(content: &str) -> Result<Self, RegistryError> {
        let document: Value = serde_json::from_str(content)?;
        Self::from_value(document)
    }

    /// Build a registry from an already-parsed JSON document
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Malformed`] when the root is not an object or
    /// a definition has the wrong shape, and [`RegistryError::InvalidPattern`]
    /// when a pattern does not compile.
    pub fn from_value(document: Value) -> Result<Self, RegistryError> {
        let definitions = match document {
            Value::Object(definitions) => definitions,
            other => {
                return Err(RegistryError::Malformed {
                    type_name: String::new(),
                    reason: format!("registry root must be an object, got {}", kind_name(&other)),
                })
            }
        };

        let mut types = HashMap::with_capacity(definitions.len());
        for (type_name, definition) in definitions {
            let raw: RawDefinition =
                serde_json::from_value(definition).map_err(|e| RegistryError::Malformed {
                    type_name: type_name.clone(),
                    reason: e.to_string(),
                })?;
            let descriptor = compile_definition(&type_name, raw)?;
            tracing::debug!("Registered type {} ({})", type_name, descriptor.kind());
            types.insert(type_name, descriptor);
        }

        Ok(Self { types })
    }

    /// Add or replace a definition
    ///
    /// Intended for building registries in code; a loaded registry is not
    /// modified while validators hold it.
    pub fn insert(&mut self, type_name: impl Into<String>, descriptor: TypeDescriptor) {
        self.types.insert(type_name.into(), descriptor);
    }

    /// Look up a definition by type name
    pub fn get(&self, type_name: &str) -> Option<&TypeDescriptor> {
        self.types.get(type_name)
    }

    /// Whether a type name is defined in the registry
    pub fn contains(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    /// Number of definitions
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether the registry has no definitions
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Defined type names, sorted alphabetically
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Attribute type names that are neither built in nor defined, sorted
    pub fn unresolved_references(&self) -> Vec<UnresolvedReference> {
        let mut unresolved: Vec<UnresolvedReference> = self
            .types
            .iter()
            .filter_map(|(owner, descriptor)| match descriptor {
                TypeDescriptor::Composite(composite) => Some((owner, composite)),
                _ => None,
            })
            .flat_map(|(owner, composite)| {
                composite
                    .referenced_types()
                    .filter(|(_, type_name)| !self.resolves(type_name))
                    .map(move |(attribute, type_name)| UnresolvedReference {
                        owner: owner.clone(),
                        attribute: attribute.to_string(),
                        type_name: type_name.to_string(),
                    })
            })
            .collect();
        unresolved.sort();
        unresolved
    }

    fn resolves(&self, type_name: &str) -> bool {
        BuiltinType::from_name(type_name).is_some() || self.contains(type_name)
    }
}

fn compile_definition(type_name: &str, raw: RawDefinition) -> Result<TypeDescriptor, RegistryError> {
    if raw.check.as_ref().is_some_and(is_falsy) {
        return Ok(TypeDescriptor::Unchecked);
    }
    if let Some(values) = raw.enum_values {
        return Ok(TypeDescriptor::Enum { values });
    }
    if let Some(source) = raw.regex {
        return Ok(TypeDescriptor::Pattern(compile_pattern(type_name, &source)?));
    }

    let mandatory = type_name_entries(type_name, "mandatory_attributes", raw.mandatory_attributes)?;
    let optional = type_name_entries(type_name, "optional_attributes", raw.optional_attributes)?;
    let regex_attributes = type_name_entries(type_name, "regex_attributes", raw.regex_attributes)?
        .into_iter()
        .map(|(source, attr_type)| {
            Ok(RegexAttribute {
                pattern: compile_pattern(type_name, &source)?,
                type_name: attr_type,
            })
        })
        .collect::<Result<Vec<_>, RegistryError>>()?;

    Ok(TypeDescriptor::Composite(CompositeType::new(
        mandatory,
        optional,
        regex_attributes,
        raw.one_of,
    )))
}

fn compile_pattern(type_name: &str, source: &str) -> Result<Pattern, RegistryError> {
    Pattern::new(source).map_err(|source_err| RegistryError::InvalidPattern {
        type_name: type_name.to_string(),
        pattern: source.to_string(),
        source: source_err,
    })
}

/// Attribute map entries in document order; every value must be a type name
fn type_name_entries(
    type_name: &str,
    field: &str,
    map: Option<Map<String, Value>>,
) -> Result<Vec<(String, String)>, RegistryError> {
    map.unwrap_or_default()
        .into_iter()
        .map(|(name, value)| match value {
            Value::String(attr_type) => Ok((name, attr_type)),
            other => Err(RegistryError::Malformed {
                type_name: type_name.to_string(),
                reason: format!(
                    "{}.{} must name a type, got {}",
                    field,
                    name,
                    kind_name(&other)
                ),
            }),
        })
        .collect()
}
