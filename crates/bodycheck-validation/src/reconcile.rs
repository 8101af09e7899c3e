//! Attribute reconciliation for composite types
//!
//! Resolves the governing type name of every key in an object and enforces
//! the presence rules of the composite definition. Resolution is two-phase:
//! an exact lookup among declared attributes, then the regex attributes in
//! declaration order.

use serde_json::{Map, Value};

use crate::config::{AttributeConflicts, ValidationConfig};
use crate::errors::{ErrorKind, ValidationError, ValidationResult};
use crate::types::CompositeType;

/// A key of the object under check and the type name governing its value
pub type ResolvedAttribute<'v, 'c> = (&'v str, &'c str);

/// Maps object keys to type names for one composite definition
#[derive(Debug, Clone, Copy)]
pub struct AttributeReconciler<'a> {
    config: &'a ValidationConfig,
}

impl<'a> AttributeReconciler<'a> {
    /// Create a reconciler using the given matching options
    pub fn new(config: &'a ValidationConfig) -> Self {
        Self { config }
    }

    /// Resolve every key of `object` against `composite`
    ///
    /// Checks run in a fixed order, and the first failure is returned:
    /// 1. every key must be declared or match a regex attribute
    /// 2. every mandatory attribute must be present
    /// 3. exactly one member of the oneOf group must be present
    ///
    /// The returned mapping follows the key order of `object`.
    pub fn reconcile<'v, 'c>(
        &self,
        object: &'v Map<String, Value>,
        composite: &'c CompositeType,
        path: &str,
    ) -> ValidationResult<Vec<ResolvedAttribute<'v, 'c>>> {
        let mut resolved = Vec::with_capacity(object.len());

        for key in object.keys() {
            let type_name = match composite.declared_type(key) {
                Some(type_name) => type_name,
                None => self.match_regex_attribute(key, composite, path)?,
            };
            resolved.push((key.as_str(), type_name));
        }

        if let Some(missing) = composite
            .mandatory()
            .find(|attr| !object.contains_key(&attr.name))
        {
            return Err(ValidationError::missing_mandatory(path, &missing.name));
        }

        if let Some(group) = composite.one_of() {
            check_one_of(object, group, path)?;
        }

        Ok(resolved)
    }

    fn match_regex_attribute<'c>(
        &self,
        key: &str,
        composite: &'c CompositeType,
        path: &str,
    ) -> ValidationResult<&'c str> {
        let mode = self.config.pattern_match;
        let mut matching = composite
            .regex_attributes()
            .iter()
            .filter(|attr| attr.pattern.is_match(key, mode));

        let Some(first) = matching.next() else {
            return Err(ValidationError::new(
                ErrorKind::AttributeNotAllowed,
                path,
                format!(
                    "attribute \"{}\" is not present as a mandatory or optional key ({})",
                    key,
                    composite.attribute_names().join(",")
                ),
            ));
        };

        if self.config.attribute_conflicts == AttributeConflicts::Reject {
            if let Some(second) = matching.next() {
                return Err(ValidationError::new(
                    ErrorKind::AttributeNotAllowed,
                    path,
                    format!(
                        "attribute \"{}\" matches more than one regex attribute ({}, {})",
                        key,
                        first.pattern.as_str(),
                        second.pattern.as_str()
                    ),
                ));
            }
        }

        tracing::debug!(
            "Attribute {} matched regex attribute {} -> {}",
            key,
            first.pattern.as_str(),
            first.type_name
        );
        Ok(first.type_name.as_str())
    }
}

fn check_one_of(object: &Map<String, Value>, group: &[String], path: &str) -> ValidationResult<()> {
    let present = object
        .keys()
        .filter(|key| group.iter().any(|member| member == *key))
        .count();

    let kind = match present {
        1 => return Ok(()),
        0 => ErrorKind::OneOfMissing,
        _ => ErrorKind::OneOfAmbiguous,
    };
    let keys: Vec<&str> = object.keys().map(String::as_str).collect();
    let message = if kind == ErrorKind::OneOfMissing {
        format!(
            "oneOf group missing: none of [{}] is present at body ({})",
            group.join(","),
            keys.join(",")
        )
    } else {
        format!(
            "oneOf group ambiguous: more than one of [{}] is present at body ({})",
            group.join(","),
            keys.join(",")
        )
    };

    Err(ValidationError::new(kind, path, message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::Pattern;
    use crate::types::RegexAttribute;
    use serde_json::json;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn regex_attrs(items: &[(&str, &str)]) -> Vec<RegexAttribute> {
        items
            .iter()
            .map(|(pattern, type_name)| RegexAttribute {
                pattern: Pattern::new(pattern).unwrap(),
                type_name: type_name.to_string(),
            })
            .collect()
    }

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn abc() -> CompositeType {
        CompositeType::new(
            pairs(&[("a", "string"), ("b", "integer")]),
            pairs(&[("c", "boolean")]),
            Vec::new(),
            None,
        )
    }

    #[test]
    fn test_resolves_declared_keys_in_value_order() {
        let config = ValidationConfig::default();
        let composite = abc();
        let body = object(json!({ "c": true, "b": 1, "a": "x" }));

        let resolved = AttributeReconciler::new(&config)
            .reconcile(&body, &composite, "$")
            .unwrap();
        assert_eq!(resolved, vec![("c", "boolean"), ("b", "integer"), ("a", "string")]);
    }

    #[test]
    fn test_undeclared_key_not_allowed() {
        let config = ValidationConfig::default();
        let composite = abc();
        let body = object(json!({ "a": "x", "b": 1, "d": 0 }));

        let err = AttributeReconciler::new(&config)
            .reconcile(&body, &composite, "$.body")
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::AttributeNotAllowed);
        assert_eq!(err.path, "$.body");
        assert!(err.message.contains("\"d\""));
        assert!(err.message.contains("(a,b,c)"));
    }

    #[test]
    fn test_undeclared_key_reported_before_missing_mandatory() {
        let config = ValidationConfig::default();
        let composite = abc();
        let body = object(json!({ "d": 0 }));

        let err = AttributeReconciler::new(&config)
            .reconcile(&body, &composite, "$")
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::AttributeNotAllowed);
    }

    #[test]
    fn test_missing_mandatory() {
        let config = ValidationConfig::default();
        let composite = abc();
        let body = object(json!({ "b": 1 }));

        let err = AttributeReconciler::new(&config)
            .reconcile(&body, &composite, "$")
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingMandatoryAttribute);
        assert!(err.message.contains("\"a\""));
    }

    #[test]
    fn test_regex_attribute_first_match_wins() {
        let config = ValidationConfig::default();
        let composite = CompositeType::new(
            Vec::new(),
            Vec::new(),
            regex_attrs(&[("^x-", "string"), ("^x-num", "integer")]),
            None,
        );
        let body = object(json!({ "x-num-1": "text" }));

        let resolved = AttributeReconciler::new(&config)
            .reconcile(&body, &composite, "$")
            .unwrap();
        assert_eq!(resolved, vec![("x-num-1", "string")]);
    }

    #[test]
    fn test_regex_attribute_conflict_rejected() {
        let config = ValidationConfig::new().reject_ambiguous_attributes();
        let composite = CompositeType::new(
            Vec::new(),
            Vec::new(),
            regex_attrs(&[("^x-", "string"), ("^x-num", "integer")]),
            None,
        );
        let body = object(json!({ "x-num-1": "text", "x-other": "y" }));

        let err = AttributeReconciler::new(&config)
            .reconcile(&body, &composite, "$")
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::AttributeNotAllowed);
        assert!(err.message.contains("more than one regex attribute"));

        let single = object(json!({ "x-other": "y" }));
        assert!(AttributeReconciler::new(&config)
            .reconcile(&single, &composite, "$")
            .is_ok());
    }

    #[test]
    fn test_regex_attribute_full_match_mode() {
        let composite = CompositeType::new(
            Vec::new(),
            Vec::new(),
            regex_attrs(&[("[a-z]+", "string")]),
            None,
        );
        let body = object(json!({ "abc123": "v" }));

        let prefix = ValidationConfig::default();
        assert!(AttributeReconciler::new(&prefix)
            .reconcile(&body, &composite, "$")
            .is_ok());

        let full = ValidationConfig::new().full_match();
        let err = AttributeReconciler::new(&full)
            .reconcile(&body, &composite, "$")
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::AttributeNotAllowed);
    }

    #[test]
    fn test_one_of() {
        let config = ValidationConfig::default();
        let reconciler = AttributeReconciler::new(&config);
        let composite = CompositeType::new(
            pairs(&[("id", "string")]),
            pairs(&[("x", "string"), ("y", "string")]),
            Vec::new(),
            Some(vec!["x".to_string(), "y".to_string()]),
        );

        let neither = object(json!({ "id": "1" }));
        let err = reconciler.reconcile(&neither, &composite, "$").unwrap_err();
        assert_eq!(err.kind, ErrorKind::OneOfMissing);
        assert!(err.message.contains("missing"));
        assert!(err.message.contains("[x,y]"));
        assert!(err.message.contains("(id)"));

        let both = object(json!({ "id": "1", "x": "a", "y": "b" }));
        let err = reconciler.reconcile(&both, &composite, "$").unwrap_err();
        assert_eq!(err.kind, ErrorKind::OneOfAmbiguous);
        assert!(err.message.contains("ambiguous"));
        assert!(err.message.contains("(id,x,y)"));

        let one = object(json!({ "id": "1", "y": "b" }));
        assert!(reconciler.reconcile(&one, &composite, "$").is_ok());
    }

    #[test]
    fn test_one_of_member_matched_by_regex_counts() {
        let config = ValidationConfig::default();
        let composite = CompositeType::new(
            Vec::new(),
            Vec::new(),
            regex_attrs(&[("^(x|y)$", "string")]),
            Some(vec!["x".to_string(), "y".to_string()]),
        );
        let body = object(json!({ "x": "a" }));

        assert!(AttributeReconciler::new(&config)
            .reconcile(&body, &composite, "$")
            .is_ok());
    }
}
