//! Bodycheck Validation
//!
//! Registry-driven type validation for API conformance testing.
//!
//! A conformance suite extracts a fragment of an HTTP request or response
//! body, names the logical type it should have, and asks this crate whether
//! the fragment conforms. Types come from a [`TypeRegistry`] loaded once at
//! startup; the validator walks the value recursively and fails on the first
//! violation with a [`ValidationError`] naming what went wrong and where.
//!
//! # Type names
//!
//! - **Built in**: `string`, `integer`, `boolean`, `URI`, `URI_reference`,
//!   `IRI`, `IRI_reference`
//! - **Registry**: enumerations, regex-constrained strings, unchecked types
//!   and composite objects with mandatory, optional and regex-named
//!   attributes plus an optional `oneOf` group
//!
//! Lists are validated element-wise against the type named for the list.
//!
//! # Example
//!
//! ```rust
//! use bodycheck_validation::{ErrorKind, TypeRegistry, Validator};
//! use serde_json::json;
//!
//! let registry = TypeRegistry::from_json_str(r#"{
//!     "AefProfile": {
//!         "mandatory_attributes": { "aefId": "string" },
//!         "optional_attributes": { "protocol": "Protocol" }
//!     },
//!     "Protocol": { "enum": ["HTTP_1_1", "HTTP_2"] }
//! }"#).unwrap();
//!
//! let validator = Validator::new(&registry);
//! assert!(validator.validate(&json!({ "aefId": "aef-1" }), "AefProfile").is_ok());
//!
//! let err = validator
//!     .validate(&json!({ "aefId": "aef-1", "protocol": "SPDY" }), "AefProfile")
//!     .unwrap_err();
//! assert_eq!(err.kind, ErrorKind::EnumViolation);
//! assert_eq!(err.path, "$.protocol");
//! ```

// Public modules
pub mod config;
pub mod errors;
pub mod formats;
pub mod reconcile;
pub mod registry;
pub mod types;
pub mod validators;

// Re-export commonly used types
pub use config::{AttributeConflicts, PatternMatch, ValidationConfig};
pub use errors::{ErrorKind, RegistryError, ValidationContext, ValidationError, ValidationResult};
pub use formats::{Pattern, UriRule};
pub use reconcile::AttributeReconciler;
pub use registry::{TypeRegistry, UnresolvedReference};
pub use types::{BuiltinType, CompositeType, TypeDescriptor};
pub use validators::{validate, Validator};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
