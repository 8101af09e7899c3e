//! Leaf checkers for pattern and URI conformance
//!
//! This module holds the pre-compiled URI/IRI grammars (RFC 3986 and RFC 3987
//! productions, the same rule names RFC 3987 tooling exposes) and the
//! registry pattern type used by `regex` types and `regex_attributes`.

use std::fmt;

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

use crate::config::PatternMatch;
use crate::errors::{ErrorKind, ValidationError, ValidationResult};

// ============================================================================
// Grammar Building Blocks
// ============================================================================

const UNRESERVED: &str = r"A-Za-z0-9\-._~";
const SUB_DELIMS: &str = r"!$&'()*+,;=";
const PCT_ENCODED: &str = r"%[0-9A-Fa-f]{2}";
const SCHEME: &str = r"[A-Za-z][A-Za-z0-9+\-.]*";

/// RFC 3987 `ucschar`
const UCSCHAR: &str = concat!(
    r"\u{A0}-\u{D7FF}\u{F900}-\u{FDCF}\u{FDF0}-\u{FFEF}",
    r"\u{10000}-\u{1FFFD}\u{20000}-\u{2FFFD}\u{30000}-\u{3FFFD}",
    r"\u{40000}-\u{4FFFD}\u{50000}-\u{5FFFD}\u{60000}-\u{6FFFD}",
    r"\u{70000}-\u{7FFFD}\u{80000}-\u{8FFFD}\u{90000}-\u{9FFFD}",
    r"\u{A0000}-\u{AFFFD}\u{B0000}-\u{BFFFD}\u{C0000}-\u{CFFFD}",
    r"\u{D0000}-\u{DFFFD}\u{E1000}-\u{EFFFD}",
);

/// RFC 3987 `iprivate`, only allowed in queries
const IPRIVATE: &str = r"\u{E000}-\u{F8FF}\u{F0000}-\u{FFFFD}\u{100000}-\u{10FFFD}";

/// The IRI grammars expand large Unicode classes many times over.
const GRAMMAR_SIZE_LIMIT: usize = 64 * (1 << 20);

/// `IP-literal / IPv4address` alternatives of `host`
fn ip_host() -> String {
    let h16 = "[0-9A-Fa-f]{1,4}";
    let dec_octet = "(?:25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9][0-9]|[0-9])";
    let ipv4 = format!("{d}\\.{d}\\.{d}\\.{d}", d = dec_octet);
    let ls32 = format!("(?:{h16}:{h16}|{ipv4})");
    let ipv6 = [
        format!("(?:{h16}:){{6}}{ls32}"),
        format!("::(?:{h16}:){{5}}{ls32}"),
        format!("(?:{h16})?::(?:{h16}:){{4}}{ls32}"),
        format!("(?:(?:{h16}:){{0,1}}{h16})?::(?:{h16}:){{3}}{ls32}"),
        format!("(?:(?:{h16}:){{0,2}}{h16})?::(?:{h16}:){{2}}{ls32}"),
        format!("(?:(?:{h16}:){{0,3}}{h16})?::{h16}:{ls32}"),
        format!("(?:(?:{h16}:){{0,4}}{h16})?::{ls32}"),
        format!("(?:(?:{h16}:){{0,5}}{h16})?::{h16}"),
        format!("(?:(?:{h16}:){{0,6}}{h16})?::"),
    ]
    .join("|");
    let ipv_future = format!("v[0-9A-Fa-f]+\\.[{UNRESERVED}{SUB_DELIMS}:]+");

    format!("\\[(?:{ipv6}|{ipv_future})\\]|{ipv4}")
}

/// Complete and reference forms of one grammar
struct Grammar {
    full: String,
    reference: String,
}

/// Build the URI grammar, or the IRI grammar when `internationalized`
fn build_grammar(internationalized: bool) -> Grammar {
    let unreserved = if internationalized {
        format!("{UNRESERVED}{UCSCHAR}")
    } else {
        UNRESERVED.to_string()
    };

    let pchar = format!("(?:[{unreserved}{SUB_DELIMS}:@]|{PCT_ENCODED})");
    let userinfo = format!("(?:[{unreserved}{SUB_DELIMS}:]|{PCT_ENCODED})*");
    let reg_name = format!("(?:[{unreserved}{SUB_DELIMS}]|{PCT_ENCODED})*");
    let authority = format!("(?:{userinfo}@)?(?:{}|{reg_name})(?::[0-9]*)?", ip_host());

    let segment = format!("{pchar}*");
    let segment_nz = format!("{pchar}+");
    let segment_nz_nc = format!("(?:[{unreserved}{SUB_DELIMS}@]|{PCT_ENCODED})+");

    let path_abempty = format!("(?:/{segment})*");
    let path_absolute = format!("/(?:{segment_nz}(?:/{segment})*)?");
    let path_noscheme = format!("{segment_nz_nc}(?:/{segment})*");
    let path_rootless = format!("{segment_nz}(?:/{segment})*");

    let query = if internationalized {
        format!("(?:{pchar}|[/?{IPRIVATE}])*")
    } else {
        format!("(?:{pchar}|[/?])*")
    };
    let fragment = format!("(?:{pchar}|[/?])*");

    // path-empty is the optional group matching nothing
    let hier_part = format!("(?://{authority}{path_abempty}|{path_absolute}|{path_rootless})?");
    let relative_part =
        format!("(?://{authority}{path_abempty}|{path_absolute}|{path_noscheme})?");

    let absolute = format!("{SCHEME}:{hier_part}(?:\\?{query})?");
    let full = format!("{absolute}(?:#{fragment})?");
    let relative_ref = format!("{relative_part}(?:\\?{query})?(?:#{fragment})?");

    Grammar {
        reference: format!("^(?:{full}|{relative_ref})$"),
        full: format!("^{full}$"),
    }
}

fn compile_grammar(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .size_limit(GRAMMAR_SIZE_LIMIT)
        .build()
        .unwrap()
}

// ============================================================================
// Pre-compiled Grammars
// ============================================================================

static URI_GRAMMAR: Lazy<Grammar> = Lazy::new(|| build_grammar(false));
static IRI_GRAMMAR: Lazy<Grammar> = Lazy::new(|| build_grammar(true));

/// `URI` (RFC 3986 section 3)
static URI_REGEX: Lazy<Regex> = Lazy::new(|| compile_grammar(&URI_GRAMMAR.full));

/// `URI-reference` (RFC 3986 section 4.1)
static URI_REFERENCE_REGEX: Lazy<Regex> =
    Lazy::new(|| compile_grammar(&URI_GRAMMAR.reference));

/// `IRI` (RFC 3987 section 2.2)
static IRI_REGEX: Lazy<Regex> = Lazy::new(|| compile_grammar(&IRI_GRAMMAR.full));

/// `IRI-reference` (RFC 3987 section 2.2)
static IRI_REFERENCE_REGEX: Lazy<Regex> =
    Lazy::new(|| compile_grammar(&IRI_GRAMMAR.reference));

// ============================================================================
// URI Rules
// ============================================================================

/// Grammar production a URI-typed value must satisfy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UriRule {
    /// `URI`
    Uri,
    /// `URI_reference`
    UriReference,
    /// `IRI`
    Iri,
    /// `IRI_reference`
    IriReference,
}

impl UriRule {
    /// Resolve a rule from its type name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "URI" => Some(Self::Uri),
            "URI_reference" => Some(Self::UriReference),
            "IRI" => Some(Self::Iri),
            "IRI_reference" => Some(Self::IriReference),
            _ => None,
        }
    }

    /// Rule name as used for type names
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uri => "URI",
            Self::UriReference => "URI_reference",
            Self::Iri => "IRI",
            Self::IriReference => "IRI_reference",
        }
    }

    /// Whether `input` is a complete match of this production
    ///
    /// # Example
    /// ```
    /// use bodycheck_validation::formats::UriRule;
    ///
    /// assert!(UriRule::Uri.is_match("http://example.com/path"));
    /// assert!(!UriRule::Uri.is_match("/path"));
    /// assert!(UriRule::UriReference.is_match("/path"));
    /// ```
    pub fn is_match(&self, input: &str) -> bool {
        match self {
            Self::Uri => URI_REGEX.is_match(input),
            Self::UriReference => URI_REFERENCE_REGEX.is_match(input),
            Self::Iri => IRI_REGEX.is_match(input),
            Self::IriReference => IRI_REFERENCE_REGEX.is_match(input),
        }
    }
}

impl fmt::Display for UriRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Registry Patterns
// ============================================================================

/// A registry regex, compiled once in both matching modes
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    prefix: Regex,
    full: Regex,
}

impl Pattern {
    /// Compile a pattern as written in the registry
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            source: source.to_string(),
            prefix: Regex::new(&format!("^(?:{})", source))?,
            full: Regex::new(&format!("^(?:{})$", source))?,
        })
    }

    /// Pattern source as written in the registry
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether `input` matches, anchored at its start
    ///
    /// With [`PatternMatch::Prefix`] a match of any prefix is enough; with
    /// [`PatternMatch::Full`] the whole input must match.
    pub fn is_match(&self, input: &str, mode: PatternMatch) -> bool {
        match mode {
            PatternMatch::Prefix => self.prefix.is_match(input),
            PatternMatch::Full => self.full.is_match(input),
        }
    }
}

// ============================================================================
// Leaf Checkers
// ============================================================================

/// Check a string against a URI/IRI rule
pub fn check_uri(input: &str, rule: UriRule, path: &str) -> ValidationResult<()> {
    if rule.is_match(input) {
        tracing::trace!("{} matches rule {}", input, rule);
        Ok(())
    } else {
        Err(ValidationError::new(
            ErrorKind::UriViolation,
            path,
            format!("value ({}) does not satisfy the {} rule", input, rule),
        ))
    }
}

/// Check a string against a registry pattern
pub fn check_regex(
    input: &str,
    pattern: &Pattern,
    mode: PatternMatch,
    path: &str,
) -> ValidationResult<()> {
    if pattern.is_match(input, mode) {
        tracing::trace!("{} matches regex {}", input, pattern.as_str());
        Ok(())
    } else {
        Err(ValidationError::new(
            ErrorKind::RegexViolation,
            path,
            format!("input ({}) does not match regex ({})", input, pattern.as_str()),
        ))
    }
}
