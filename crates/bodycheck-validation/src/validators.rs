//! Core validation engine
//!
//! This module implements the recursive walk over a (value, type name) pair.
//! Validation is fail-fast: the first failure is returned unchanged to the
//! caller and nothing after it is evaluated.

use serde_json::{Map, Value};

use crate::config::ValidationConfig;
use crate::errors::{ErrorKind, ValidationContext, ValidationError, ValidationResult};
use crate::formats::{self, Pattern};
use crate::reconcile::AttributeReconciler;
use crate::registry::TypeRegistry;
use crate::types::{kind_name, BuiltinType, CompositeType, TypeDescriptor};

// ============================================================================
// Public API
// ============================================================================

/// Validate a value against a registry type using the default configuration
///
/// # Example
///
/// ```
/// use bodycheck_validation::{validate, TypeRegistry};
/// use serde_json::json;
///
/// let registry = TypeRegistry::from_value(json!({
///     "Version": { "mandatory_attributes": { "apiVersion": "string" } }
/// }))
/// .unwrap();
///
/// assert!(validate(&registry, &json!({ "apiVersion": "v1" }), "Version").is_ok());
/// assert!(validate(&registry, &json!({ "apiVersion": 1 }), "Version").is_err());
/// ```
pub fn validate(registry: &TypeRegistry, value: &Value, type_name: &str) -> ValidationResult<()> {
    Validator::new(registry).validate(value, type_name)
}

/// Validates values against the types of one registry
///
/// A validator only borrows the registry and holds no state between calls,
/// so one registry can back any number of validators on any threads.
#[derive(Debug, Clone, Copy)]
pub struct Validator<'r> {
    registry: &'r TypeRegistry,
    config: ValidationConfig,
}

impl<'r> Validator<'r> {
    /// Create a validator with the default configuration
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self::with_config(registry, ValidationConfig::default())
    }

    /// Create a validator with a custom configuration
    pub fn with_config(registry: &'r TypeRegistry, config: ValidationConfig) -> Self {
        Self { registry, config }
    }

    /// The registry types are resolved against
    pub fn registry(&self) -> &'r TypeRegistry {
        self.registry
    }

    /// The active configuration
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validate a value against a type name
    pub fn validate(&self, value: &Value, type_name: &str) -> ValidationResult<()> {
        let mut ctx = ValidationContext::new();
        self.validate_with_context(value, type_name, &mut ctx)
    }

    /// Validate a value against a type name with a custom context
    ///
    /// Error paths are reported relative to the context's current location.
    pub fn validate_with_context(
        &self,
        value: &Value,
        type_name: &str,
        ctx: &mut ValidationContext,
    ) -> ValidationResult<()> {
        tracing::trace!("Checking {} against {}", ctx.current_path(), type_name);

        // Lists are checked element-wise against the same type name
        if let Value::Array(items) = value {
            for (index, item) in items.iter().enumerate() {
                ctx.push_index(index);
                let result = self.validate_with_context(item, type_name, ctx);
                ctx.pop();
                result?;
            }
            return Ok(());
        }

        if let Some(builtin) = BuiltinType::from_name(type_name) {
            return validate_builtin(value, builtin, ctx);
        }

        let descriptor = self
            .registry
            .get(type_name)
            .ok_or_else(|| ValidationError::unknown_type(ctx.current_path(), type_name))?;

        match descriptor {
            TypeDescriptor::Unchecked => {
                tracing::debug!("Type {} is not checked, accepting {}", type_name, ctx.current_path());
                Ok(())
            }
            TypeDescriptor::Enum { values } => validate_enum(value, values, ctx),
            TypeDescriptor::Pattern(pattern) => self.validate_pattern(value, pattern, ctx),
            TypeDescriptor::Composite(composite) => {
                self.validate_composite(value, type_name, composite, ctx)
            }
        }
    }

    // ========================================================================
    // Registry Types
    // ========================================================================

    fn validate_pattern(
        &self,
        value: &Value,
        pattern: &Pattern,
        ctx: &ValidationContext,
    ) -> ValidationResult<()> {
        match value {
            Value::String(s) => {
                formats::check_regex(s, pattern, self.config.pattern_match, &ctx.current_path())
            }
            _ => Err(ValidationError::type_mismatch(
                ctx.current_path(),
                "string",
                kind_name(value),
            )),
        }
    }

    fn validate_composite(
        &self,
        value: &Value,
        type_name: &str,
        composite: &CompositeType,
        ctx: &mut ValidationContext,
    ) -> ValidationResult<()> {
        let object: &Map<String, Value> = match value {
            Value::Object(object) => object,
            _ => {
                return Err(ValidationError::type_mismatch(
                    ctx.current_path(),
                    &format!("object of type {}", type_name),
                    kind_name(value),
                ))
            }
        };

        let resolved = AttributeReconciler::new(&self.config).reconcile(
            object,
            composite,
            &ctx.current_path(),
        )?;
        tracing::debug!(
            "Resolved {} attributes of {} at {}",
            resolved.len(),
            type_name,
            ctx.current_path()
        );

        for (key, attr_type) in resolved {
            ctx.push_key(key);
            let result = self.validate_with_context(&object[key], attr_type, ctx);
            ctx.pop();
            result?;
        }

        Ok(())
    }
}

// ============================================================================
// Built-in Types
// ============================================================================

fn validate_builtin(
    value: &Value,
    builtin: BuiltinType,
    ctx: &ValidationContext,
) -> ValidationResult<()> {
    if !builtin.accepts_kind(value) {
        return Err(ValidationError::type_mismatch(
            ctx.current_path(),
            builtin.name(),
            kind_name(value),
        ));
    }

    match (builtin, value) {
        (BuiltinType::Uri(rule), Value::String(s)) => {
            formats::check_uri(s, rule, &ctx.current_path())
        }
        _ => Ok(()),
    }
}

fn validate_enum(value: &Value, allowed: &[String], ctx: &ValidationContext) -> ValidationResult<()> {
    if let Value::String(s) = value {
        if allowed.iter().any(|candidate| candidate == s) {
            tracing::trace!("Value {} is present in enum", s);
            return Ok(());
        }
    }

    let shown = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    Err(ValidationError::new(
        ErrorKind::EnumViolation,
        ctx.current_path(),
        format!("value ({}) is not present at enum ({})", shown, allowed.join(",")),
    ))
}
