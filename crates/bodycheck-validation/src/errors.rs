//! Validation error types
//!
//! This module defines the single error raised by a failed validation call,
//! the registry construction error, and the context used to record where in
//! the value under check a failure happened.

use std::fmt;

use thiserror::Error;

// ============================================================================
// Validation Result
// ============================================================================

/// Validation result type
///
/// Validation is fail-fast: the first failure aborts the call and is returned
/// as-is to the caller.
pub type ValidationResult<T> = Result<T, ValidationError>;

// ============================================================================
// Error Kind Classification
// ============================================================================

/// Classification of validation failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Runtime kind of the value does not match the expected one
    TypeMismatch,

    /// Referenced type name is neither built in nor present in the registry
    UnknownType,

    /// Value is not among the permitted literal values
    EnumViolation,

    /// Value does not match the required pattern
    RegexViolation,

    /// Value does not satisfy the requested URI/IRI grammar rule
    UriViolation,

    /// Object key has no declared or pattern-matched governing type
    AttributeNotAllowed,

    /// Required key absent from the object under check
    MissingMandatoryAttribute,

    /// No member of a oneOf group is present
    OneOfMissing,

    /// More than one member of a oneOf group is present
    OneOfAmbiguous,
}

impl ErrorKind {
    /// Whether this is one of the two oneOf group violations
    pub fn is_one_of(&self) -> bool {
        matches!(self, Self::OneOfMissing | Self::OneOfAmbiguous)
    }

    /// Stable snake_case identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TypeMismatch => "type_mismatch",
            Self::UnknownType => "unknown_type",
            Self::EnumViolation => "enum_violation",
            Self::RegexViolation => "regex_violation",
            Self::UriViolation => "uri_violation",
            Self::AttributeNotAllowed => "attribute_not_allowed",
            Self::MissingMandatoryAttribute => "missing_mandatory_attribute",
            Self::OneOfMissing => "one_of_missing",
            Self::OneOfAmbiguous => "one_of_ambiguous",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Validation Error
// ============================================================================

/// A validation failure
///
/// Carries the failure classification, the path inside the value under check
/// where it happened (e.g. `$.profiles[0].apiName`), and a human-readable
/// message naming the offending input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Failure classification
    pub kind: ErrorKind,

    /// Location inside the value under check (`$` is the root)
    pub path: String,

    /// Human-readable error message
    pub message: String,
}

impl ValidationError {
    /// Create a new validation error
    pub fn new(kind: ErrorKind, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a type mismatch error
    pub fn type_mismatch(path: impl Into<String>, expected: &str, got: &str) -> Self {
        Self::new(
            ErrorKind::TypeMismatch,
            path,
            format!("expected {}, got {}", expected, got),
        )
    }

    /// Create an unknown type error
    pub fn unknown_type(path: impl Into<String>, type_name: &str) -> Self {
        Self::new(
            ErrorKind::UnknownType,
            path,
            format!("type \"{}\" is not present in the type registry", type_name),
        )
    }

    /// Create a missing mandatory attribute error
    pub fn missing_mandatory(path: impl Into<String>, attribute: &str) -> Self {
        Self::new(
            ErrorKind::MissingMandatoryAttribute,
            path,
            format!(
                "mandatory attribute \"{}\" is not present at body under check",
                attribute
            ),
        )
    }

    /// Whether this error is a oneOf group violation
    pub fn is_one_of(&self) -> bool {
        self.kind.is_one_of()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} [{}]", self.path, self.message, self.kind)
    }
}

impl std::error::Error for ValidationError {}

// ============================================================================
// Registry Errors
// ============================================================================

/// Error raised while building a [`TypeRegistry`](crate::registry::TypeRegistry)
#[derive(Error, Debug)]
pub enum RegistryError {
    /// The registry file could not be read
    #[error("failed to read type registry '{path}': {source}")]
    Io {
        /// Path of the registry file
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The registry document is not valid JSON
    #[error("type registry is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The document root or a definition has the wrong shape
    #[error("malformed definition for type \"{type_name}\": {reason}")]
    Malformed {
        /// Type whose definition is malformed (empty for the document root)
        type_name: String,
        /// What is wrong with it
        reason: String,
    },

    /// A `regex` or `regex_attributes` pattern does not compile
    #[error("invalid pattern `{pattern}` in type \"{type_name}\": {source}")]
    InvalidPattern {
        /// Type declaring the pattern
        type_name: String,
        /// Pattern source as written in the registry
        pattern: String,
        /// Compilation error
        #[source]
        source: regex::Error,
    },
}

// ============================================================================
// Validation Context
// ============================================================================

/// Context for validation (tracks current location in nested structures)
#[derive(Debug, Clone, Default)]
pub struct ValidationContext {
    /// Path segments below the root, already rendered (`.key` or `[index]`)
    segments: Vec<String>,
}

impl ValidationContext {
    /// Create a validation context positioned at the root
    pub fn new() -> Self {
        Self::default()
    }

    /// Descend into an object key
    pub fn push_key(&mut self, key: &str) {
        self.segments.push(format!(".{}", key));
    }

    /// Descend into a list element
    pub fn push_index(&mut self, index: usize) {
        self.segments.push(format!("[{}]", index));
    }

    /// Step back to the parent location
    pub fn pop(&mut self) {
        self.segments.pop();
    }

    /// Nesting depth below the root
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Current path (e.g. `$`, `$.user`, `$.users[2].name`)
    pub fn current_path(&self) -> String {
        let mut path = String::from("$");
        for segment in &self.segments {
            path.push_str(segment);
        }
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_context() {
        let mut ctx = ValidationContext::new();
        assert_eq!(ctx.current_path(), "$");
        assert_eq!(ctx.depth(), 0);

        ctx.push_key("profiles");
        assert_eq!(ctx.current_path(), "$.profiles");

        ctx.push_index(3);
        assert_eq!(ctx.current_path(), "$.profiles[3]");

        ctx.push_key("apiName");
        assert_eq!(ctx.current_path(), "$.profiles[3].apiName");
        assert_eq!(ctx.depth(), 3);

        ctx.pop();
        ctx.pop();
        assert_eq!(ctx.current_path(), "$.profiles");
    }

    #[test]
    fn test_error_kind_display() {
        assert_eq!(ErrorKind::TypeMismatch.to_string(), "type_mismatch");
        assert_eq!(ErrorKind::AttributeNotAllowed.to_string(), "attribute_not_allowed");
        assert_eq!(ErrorKind::OneOfAmbiguous.to_string(), "one_of_ambiguous");
    }

    #[test]
    fn test_one_of_grouping() {
        assert!(ErrorKind::OneOfMissing.is_one_of());
        assert!(ErrorKind::OneOfAmbiguous.is_one_of());
        assert!(!ErrorKind::MissingMandatoryAttribute.is_one_of());
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::missing_mandatory("$.body", "apiName");
        assert_eq!(err.kind, ErrorKind::MissingMandatoryAttribute);
        assert_eq!(
            err.to_string(),
            "$.body: mandatory attribute \"apiName\" is not present at body under check \
             [missing_mandatory_attribute]"
        );
    }

    #[test]
    fn test_type_mismatch_message() {
        let err = ValidationError::type_mismatch("$", "boolean", "integer");
        assert_eq!(err.message, "expected boolean, got integer");
    }
}
