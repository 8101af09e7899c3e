//! Configuration options for validation behavior
//!
//! Both options default to the lenient behavior existing conformance fixtures
//! are written against.

use serde::Deserialize;

// ============================================================================
// Pattern Matching
// ============================================================================

/// How registry patterns are matched against strings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternMatch {
    /// Anchored at the start only; matching a prefix is enough (default)
    #[default]
    Prefix,
    /// The whole string must match
    Full,
}

// ============================================================================
// Regex Attribute Conflicts
// ============================================================================

/// What to do when an undeclared key matches several regex attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeConflicts {
    /// First matching pattern in declaration order wins (default)
    #[default]
    FirstMatch,
    /// Fail with `attribute_not_allowed`
    Reject,
}

// ============================================================================
// Validation Config
// ============================================================================

/// Configuration options for validation behavior
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Matching mode for `regex` types and `regex_attributes` keys
    pub pattern_match: PatternMatch,

    /// Policy for keys matched by more than one regex attribute
    pub attribute_conflicts: AttributeConflicts,
}

impl ValidationConfig {
    /// Create a new validation config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set pattern matching mode
    pub fn pattern_match(mut self, mode: PatternMatch) -> Self {
        self.pattern_match = mode;
        self
    }

    /// Require patterns to match the whole string
    pub fn full_match(mut self) -> Self {
        self.pattern_match = PatternMatch::Full;
        self
    }

    /// Set regex attribute conflict policy
    pub fn attribute_conflicts(mut self, policy: AttributeConflicts) -> Self {
        self.attribute_conflicts = policy;
        self
    }

    /// Reject keys matched by more than one regex attribute
    pub fn reject_ambiguous_attributes(mut self) -> Self {
        self.attribute_conflicts = AttributeConflicts::Reject;
        self
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ValidationConfig::default();
        assert_eq!(config.pattern_match, PatternMatch::Prefix);
        assert_eq!(config.attribute_conflicts, AttributeConflicts::FirstMatch);
    }

    #[test]
    fn test_config_builder() {
        let config = ValidationConfig::new()
            .full_match()
            .reject_ambiguous_attributes();

        assert_eq!(config.pattern_match, PatternMatch::Full);
        assert_eq!(config.attribute_conflicts, AttributeConflicts::Reject);
    }

    #[test]
    fn test_config_explicit_setters() {
        let config = ValidationConfig::new()
            .pattern_match(PatternMatch::Full)
            .attribute_conflicts(AttributeConflicts::Reject);
        assert_eq!(config, ValidationConfig::new().full_match().reject_ambiguous_attributes());

        let config = config
            .pattern_match(PatternMatch::Prefix)
            .attribute_conflicts(AttributeConflicts::FirstMatch);
        assert_eq!(config, ValidationConfig::default());
    }

    #[test]
    fn test_config_deserialize() {
        let config: ValidationConfig =
            serde_json::from_str(r#"{"pattern_match": "full"}"#).unwrap();
        assert_eq!(config.pattern_match, PatternMatch::Full);
        assert_eq!(config.attribute_conflicts, AttributeConflicts::FirstMatch);

        let config: ValidationConfig =
            serde_json::from_str(r#"{"attribute_conflicts": "reject"}"#).unwrap();
        assert_eq!(config.attribute_conflicts, AttributeConflicts::Reject);
    }
}
