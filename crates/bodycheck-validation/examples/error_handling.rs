//! Error Handling Example
//!
//! This example demonstrates working with ValidationError in bodycheck-validation.
//!
//! Run with:
//! ```bash
//! cargo run -p bodycheck-validation --example error_handling
//! ```

use bodycheck_validation::{ErrorKind, TypeRegistry, ValidationConfig, Validator};
use serde_json::json;

fn main() {
    println!("Error Handling Example");
    println!("======================\n");

    let registry = match TypeRegistry::from_value(json!({
        "Subscriber": {
            "mandatory_attributes": { "notificationDestination": "URI", "events": "Event" },
            "optional_attributes": { "supportedFeatures": "SupportedFeatures" },
            "regex_attributes": { "^x-": "string" }
        },
        "Event": { "enum": ["SERVICE_API_AVAILABLE", "SERVICE_API_UNAVAILABLE"] },
        "SupportedFeatures": { "regex": "[A-Fa-f0-9]+" }
    })) {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("Failed to build registry: {}", e);
            return;
        }
    };

    demonstrate_error_kinds(&registry);
    demonstrate_error_location(&registry);
    demonstrate_strict_matching(&registry);

    println!("Summary:");
    println!("  - Validation stops at the first failure");
    println!("  - ErrorKind indicates the kind of failure");
    println!("  - The path identifies where in the body it happened");
    println!("  - Display trait provides user-friendly messages");
}

fn demonstrate_error_kinds(registry: &TypeRegistry) {
    println!("1. Error Kinds");
    println!("--------------");

    let validator = Validator::new(registry);
    let bodies = [
        json!({ "events": ["SERVICE_API_AVAILABLE"] }),
        json!({ "notificationDestination": "http://host/cb", "events": ["SERVICE_API_GONE"] }),
        json!({ "notificationDestination": "http://host/cb", "events": [], "extra": 1 }),
        json!({ "notificationDestination": "not a uri", "events": [] }),
    ];

    for body in &bodies {
        match validator.validate(body, "Subscriber") {
            Ok(()) => println!("  Unexpected success"),
            Err(err) => {
                println!("    Kind: {}", err.kind);
                println!("    Message: {}", err.message);
            }
        }
    }
    println!();
}

fn demonstrate_error_location(registry: &TypeRegistry) {
    println!("2. Error Location");
    println!("-----------------");

    let subscribers = json!([
        { "notificationDestination": "http://host/a", "events": [] },
        { "notificationDestination": "http://host/b", "events": ["SERVICE_API_AVAILABLE", 3] }
    ]);

    if let Err(err) = Validator::new(registry).validate(&subscribers, "Subscriber") {
        println!("    Path: {}", err.path);
        println!("    Error: {}", err);
        assert_eq!(err.kind, ErrorKind::EnumViolation);
    }
    println!();
}

fn demonstrate_strict_matching(registry: &TypeRegistry) {
    println!("3. Pattern Matching Modes");
    println!("-------------------------");

    let body = json!({
        "notificationDestination": "http://host/cb",
        "events": [],
        "supportedFeatures": "0aZZ"
    });

    let lenient = Validator::new(registry).validate(&body, "Subscriber");
    println!("  Prefix match: {:?}", lenient.map_err(|e| e.kind));

    let strict = Validator::with_config(registry, ValidationConfig::new().full_match())
        .validate(&body, "Subscriber");
    println!("  Full match:   {:?}", strict.map_err(|e| e.kind));
    println!();
}
