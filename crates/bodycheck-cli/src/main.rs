//! Bodycheck CLI - validate JSON bodies against a type registry
//!
//! Usage:
//!   bodycheck validate --types types.json --type ServiceAPIDescription body.json
//!   cat body.json | bodycheck validate --types types.json --type ServiceAPIDescription
//!   bodycheck validate --types types.json --type Version --full-match body.json
//!   bodycheck validate --types types.json --type Version --config options.json body.json
//!   bodycheck check-types --types types.json
//!   bodycheck list-types --types types.json
//!
//! Exit status is 0 on success, 1 when the body or registry is rejected.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use bodycheck_validation::{TypeRegistry, ValidationConfig, Validator};

#[derive(Parser)]
#[command(name = "bodycheck")]
#[command(about = "Validate API bodies against a type registry", long_about = None)]
#[command(version)]
struct Cli {
    /// Log level (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a JSON body against a registry type
    Validate {
        /// Type registry (JSON)
        #[arg(short, long)]
        types: PathBuf,

        /// Type name the body must conform to
        #[arg(short = 'n', long = "type")]
        type_name: String,

        /// JSON body to validate (reads stdin when omitted)
        body: Option<PathBuf>,

        /// Validation options (JSON), overridden by the flags below
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Require registry patterns to match the whole string
        #[arg(long)]
        full_match: bool,

        /// Reject keys matched by more than one regex attribute
        #[arg(long)]
        reject_ambiguous_attributes: bool,
    },

    /// Load a registry and report references to undefined types
    CheckTypes {
        /// Type registry (JSON)
        #[arg(short, long)]
        types: PathBuf,
    },

    /// List the types defined in a registry
    ListTypes {
        /// Type registry (JSON)
        #[arg(short, long)]
        types: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    let exit_code = match cli.command {
        Commands::Validate {
            types,
            type_name,
            body,
            config,
            full_match,
            reject_ambiguous_attributes,
        } => {
            let config =
                resolve_config(config.as_deref(), full_match, reject_ambiguous_attributes)?;
            run_validate(&types, &type_name, body.as_deref(), config)?
        }
        Commands::CheckTypes { types } => run_check_types(&types)?,
        Commands::ListTypes { types } => run_list_types(&types)?,
    };

    if exit_code != 0 {
        std::process::exit(exit_code);
    }
    Ok(())
}

fn load_registry(path: &Path) -> Result<TypeRegistry> {
    TypeRegistry::from_path(path)
        .with_context(|| format!("Failed to load type registry {}", path.display()))
}

fn load_config(path: Option<&Path>) -> Result<ValidationConfig> {
    let Some(path) = path else {
        return Ok(ValidationConfig::default());
    };

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config: ValidationConfig = serde_json::from_str(&content)
        .with_context(|| format!("Invalid validation config {}", path.display()))?;
    tracing::debug!("Loaded validation config {:?}", config);
    Ok(config)
}

/// Options file first, then the command-line flags on top
fn resolve_config(
    path: Option<&Path>,
    full_match: bool,
    reject_ambiguous_attributes: bool,
) -> Result<ValidationConfig> {
    let mut config = load_config(path)?;
    if full_match {
        config = config.full_match();
    }
    if reject_ambiguous_attributes {
        config = config.reject_ambiguous_attributes();
    }
    Ok(config)
}

/// Read the body from `path`, or from `stdin` when no path is given
fn read_body(path: Option<&Path>, mut stdin: impl Read) -> Result<serde_json::Value> {
    let content = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read body {}", path.display()))?,
        None => {
            let mut content = String::new();
            stdin
                .read_to_string(&mut content)
                .context("Failed to read body from stdin")?;
            content
        }
    };

    serde_json::from_str(&content).context("Body is not valid JSON")
}

fn run_validate(
    types: &Path,
    type_name: &str,
    body: Option<&Path>,
    config: ValidationConfig,
) -> Result<i32> {
    let registry = load_registry(types)?;
    let body = read_body(body, std::io::stdin().lock())?;

    match Validator::with_config(&registry, config).validate(&body, type_name) {
        Ok(()) => {
            println!("OK: body conforms to {}", type_name);
            Ok(0)
        }
        Err(err) => {
            tracing::debug!("Validation of {} failed: {:?}", type_name, err);
            eprintln!("FAIL: {}", err);
            Ok(1)
        }
    }
}

fn run_check_types(types: &Path) -> Result<i32> {
    let registry = load_registry(types)?;
    let unresolved = registry.unresolved_references();

    if unresolved.is_empty() {
        println!("OK: {} types, all references resolve", registry.len());
        return Ok(0);
    }

    for reference in &unresolved {
        eprintln!("  {}", reference);
    }
    eprintln!("{} unresolved type reference(s)", unresolved.len());
    Ok(1)
}

fn run_list_types(types: &Path) -> Result<i32> {
    let registry = load_registry(types)?;
    for name in registry.type_names() {
        println!("{}", name);
    }
    Ok(0)
}

/// Initialize logging based on log level
fn init_logging(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init()
        .ok(); // Ignore error if already initialized

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bodycheck_validation::{AttributeConflicts, PatternMatch};
    use clap::CommandFactory;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_validate() {
        let cli = Cli::try_parse_from([
            "bodycheck",
            "validate",
            "--types",
            "types.json",
            "--type",
            "Version",
            "--full-match",
            "body.json",
        ])
        .unwrap();

        match cli.command {
            Commands::Validate {
                types,
                type_name,
                body,
                config,
                full_match,
                reject_ambiguous_attributes,
            } => {
                assert_eq!(types, PathBuf::from("types.json"));
                assert_eq!(type_name, "Version");
                assert_eq!(body, Some(PathBuf::from("body.json")));
                assert!(config.is_none());
                assert!(full_match);
                assert!(!reject_ambiguous_attributes);
            }
            _ => panic!("expected validate command"),
        }
        assert_eq!(cli.log_level, "warn");
    }

    #[test]
    fn test_parse_check_types() {
        let cli = Cli::try_parse_from([
            "bodycheck",
            "--log-level",
            "debug",
            "check-types",
            "-t",
            "types.json",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::CheckTypes { .. }));
        assert_eq!(cli.log_level, "debug");
    }

    const REGISTRY: &str = r#"{
        "Version": {
            "mandatory_attributes": { "apiVersion": "ApiVersion" },
            "optional_attributes": { "expiry": "string" }
        },
        "ApiVersion": { "regex": "v[0-9]+" }
    }"#;

    fn json_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_load_config() {
        assert_eq!(load_config(None).unwrap(), ValidationConfig::default());

        let file = json_file(r#"{ "pattern_match": "full" }"#);
        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config, ValidationConfig::new().full_match());

        let bad = json_file(r#"{ "pattern_match": "sometimes" }"#);
        assert!(load_config(Some(bad.path())).is_err());
        assert!(load_config(Some(Path::new("/nonexistent/bodycheck.json"))).is_err());
    }

    #[test]
    fn test_flags_override_config_file() {
        let file =
            json_file(r#"{ "pattern_match": "prefix", "attribute_conflicts": "first_match" }"#);

        let config = resolve_config(Some(file.path()), false, false).unwrap();
        assert_eq!(config.pattern_match, PatternMatch::Prefix);
        assert_eq!(config.attribute_conflicts, AttributeConflicts::FirstMatch);

        let config = resolve_config(Some(file.path()), true, true).unwrap();
        assert_eq!(config.pattern_match, PatternMatch::Full);
        assert_eq!(config.attribute_conflicts, AttributeConflicts::Reject);
    }

    #[test]
    fn test_read_body_from_file_and_stdin() {
        let file = json_file(r#"{ "apiVersion": "v1" }"#);
        let body = read_body(Some(file.path()), std::io::empty()).unwrap();
        assert_eq!(body["apiVersion"], "v1");

        let body = read_body(None, &br#"[1, 2]"#[..]).unwrap();
        assert_eq!(body, serde_json::json!([1, 2]));

        assert!(read_body(None, &b"{ not json"[..]).is_err());
    }

    #[test]
    fn test_run_validate_exit_codes() {
        let types = json_file(REGISTRY);
        let good = json_file(r#"{ "apiVersion": "v2", "expiry": "never" }"#);
        let bad = json_file(r#"{ "apiVersion": "2" }"#);
        let config = ValidationConfig::default();

        assert_eq!(
            run_validate(types.path(), "Version", Some(good.path()), config).unwrap(),
            0
        );
        assert_eq!(
            run_validate(types.path(), "Version", Some(bad.path()), config).unwrap(),
            1
        );
        assert_eq!(
            run_validate(types.path(), "NoSuchType", Some(good.path()), config).unwrap(),
            1
        );
    }

    #[test]
    fn test_full_match_flag_rejects_prefix_only_match() {
        let types = json_file(REGISTRY);
        let options = json_file(r#"{ "pattern_match": "prefix" }"#);
        let body = json_file(r#"{ "apiVersion": "v1-beta" }"#);

        let lenient = resolve_config(Some(options.path()), false, false).unwrap();
        assert_eq!(
            run_validate(types.path(), "Version", Some(body.path()), lenient).unwrap(),
            0
        );

        let strict = resolve_config(Some(options.path()), true, false).unwrap();
        assert_eq!(
            run_validate(types.path(), "Version", Some(body.path()), strict).unwrap(),
            1
        );
    }

    #[test]
    fn test_run_validate_load_errors() {
        let body = json_file("{}");
        let broken = json_file(r#"{ "Broken": { "regex": "(unclosed" } }"#);
        let config = ValidationConfig::default();

        assert!(run_validate(broken.path(), "Broken", Some(body.path()), config).is_err());

        let missing = Path::new("/nonexistent/types.json");
        assert!(run_validate(missing, "Version", Some(body.path()), config).is_err());

        let types = json_file(REGISTRY);
        let not_json = json_file("{ apiVersion: v1 }");
        assert!(run_validate(types.path(), "Version", Some(not_json.path()), config).is_err());
    }

    #[test]
    fn test_run_check_types() {
        let complete = json_file(REGISTRY);
        assert_eq!(run_check_types(complete.path()).unwrap(), 0);

        let dangling = json_file(
            r#"{ "Profile": { "mandatory_attributes": { "owner": "Owner", "id": "string" } } }"#,
        );
        assert_eq!(run_check_types(dangling.path()).unwrap(), 1);
    }

    #[test]
    fn test_run_list_types() {
        let types = json_file(REGISTRY);
        assert_eq!(run_list_types(types.path()).unwrap(), 0);
        assert!(run_list_types(Path::new("/nonexistent/types.json")).is_err());
    }
}
