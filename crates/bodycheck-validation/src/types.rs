//! Core type system for validation
//!
//! This module defines the built-in type names, the compiled form of registry
//! definitions, and helpers describing the runtime kind of a value under check.

use serde_json::Value;

use crate::formats::{Pattern, UriRule};

// ============================================================================
// Value kinds - Runtime values to be validated
// ============================================================================

/// Get human-readable kind name of a JSON value for error messages
///
/// Integral numbers report `integer`; any other number reports `number`, so
/// `1.0` is not an integer.
pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ============================================================================
// BuiltinType - Type names resolved without the registry
// ============================================================================

/// Type names that are checked directly and never looked up in the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinType {
    /// `string`
    String,
    /// `integer`
    Integer,
    /// `boolean`
    Boolean,
    /// `URI`, `URI_reference`, `IRI`, `IRI_reference`
    Uri(UriRule),
}

impl BuiltinType {
    /// Resolve a type name to a built-in type
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Self::String),
            "integer" => Some(Self::Integer),
            "boolean" => Some(Self::Boolean),
            other => UriRule::from_name(other).map(Self::Uri),
        }
    }

    /// Type name as written in the registry
    pub fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Uri(rule) => rule.as_str(),
        }
    }

    /// Whether the value's runtime kind matches this primitive exactly
    ///
    /// URI rules only accept strings here; grammar conformance is checked
    /// separately.
    pub fn accepts_kind(&self, value: &Value) -> bool {
        match self {
            Self::String | Self::Uri(_) => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Boolean => value.is_boolean(),
        }
    }
}

// ============================================================================
// TypeDescriptor - Compiled registry definitions
// ============================================================================

/// Compiled type definition held by the registry
///
/// The variant is chosen with the same precedence the validator applies to a
/// raw definition: a falsy `Check` first, then `enum`, then `regex`, and
/// everything else is a composite object.
#[derive(Debug, Clone)]
pub enum TypeDescriptor {
    /// `Check` set to a falsy value; every value is accepted
    Unchecked,

    /// Value must be one of the literal strings
    Enum {
        /// Allowed values, in declaration order
        values: Vec<String>,
    },

    /// Value must match the pattern
    Pattern(Pattern),

    /// Object with declared attributes
    Composite(CompositeType),
}

impl TypeDescriptor {
    /// Get human-readable descriptor name for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unchecked => "unchecked",
            Self::Enum { .. } => "enum",
            Self::Pattern(_) => "regex",
            Self::Composite(_) => "composite",
        }
    }
}

// ============================================================================
// Composite Types
// ============================================================================

/// A declared object attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDescriptor {
    /// Attribute (object key) name
    pub name: String,
    /// Type name governing the attribute's value
    pub type_name: String,
    /// Whether the attribute must be present
    pub mandatory: bool,
}

/// An attribute whose name is matched by a pattern
#[derive(Debug, Clone)]
pub struct RegexAttribute {
    /// Pattern an undeclared key is matched against
    pub pattern: Pattern,
    /// Type name governing matching keys
    pub type_name: String,
}

/// Object type with mandatory, optional and pattern-named attributes
#[derive(Debug, Clone, Default)]
pub struct CompositeType {
    attributes: Vec<AttributeDescriptor>,
    regex_attributes: Vec<RegexAttribute>,
    one_of: Option<Vec<String>>,
}

impl CompositeType {
    /// Build a composite type from its declared parts
    ///
    /// An attribute listed as both mandatory and optional stays mandatory but
    /// is governed by its optional type name.
    pub fn new(
        mandatory: Vec<(String, String)>,
        optional: Vec<(String, String)>,
        regex_attributes: Vec<RegexAttribute>,
        one_of: Option<Vec<String>>,
    ) -> Self {
        let mut attributes: Vec<AttributeDescriptor> = mandatory
            .into_iter()
            .map(|(name, type_name)| AttributeDescriptor {
                name,
                type_name,
                mandatory: true,
            })
            .collect();

        for (name, type_name) in optional {
            match attributes.iter_mut().find(|attr| attr.name == name) {
                Some(existing) => existing.type_name = type_name,
                None => attributes.push(AttributeDescriptor {
                    name,
                    type_name,
                    mandatory: false,
                }),
            }
        }

        Self {
            attributes,
            regex_attributes,
            one_of,
        }
    }

    /// Declared attributes (mandatory first, then optional)
    pub fn attributes(&self) -> &[AttributeDescriptor] {
        &self.attributes
    }

    /// Mandatory attributes only
    pub fn mandatory(&self) -> impl Iterator<Item = &AttributeDescriptor> {
        self.attributes.iter().filter(|attr| attr.mandatory)
    }

    /// Type name declared for an attribute, by exact name
    pub fn declared_type(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.type_name.as_str())
    }

    /// Names of all declared attributes, in declaration order
    pub fn attribute_names(&self) -> Vec<&str> {
        self.attributes.iter().map(|attr| attr.name.as_str()).collect()
    }

    /// Pattern-named attributes, in declaration order
    pub fn regex_attributes(&self) -> &[RegexAttribute] {
        &self.regex_attributes
    }

    /// Mutually exclusive attribute group, if declared
    pub fn one_of(&self) -> Option<&[String]> {
        self.one_of.as_deref()
    }

    /// Every type name this composite refers to
    pub fn referenced_types(&self) -> impl Iterator<Item = (&str, &str)> {
        let declared = self
            .attributes
            .iter()
            .map(|attr| (attr.name.as_str(), attr.type_name.as_str()));
        let patterned = self
            .regex_attributes
            .iter()
            .map(|attr| (attr.pattern.as_str(), attr.type_name.as_str()));
        declared.chain(patterned)
    }
}
