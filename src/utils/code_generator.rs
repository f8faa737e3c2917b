//! Short code generation and alias validation.
//!
//! Generated codes use the 62-character alphabet `[0-9A-Za-z]`. Generators are
//! stateless with respect to the mapping store: they only propose candidates, and
//! uniqueness is decided by the store when the candidate is inserted.

use crate::error::AppError;
use rand::Rng;
use rand::distr::Alphanumeric;
use regex::Regex;
use serde_json::json;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Base-62 alphabet in ascending order.
const BASE62_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Shortest accepted short code.
pub const MIN_CODE_LENGTH: usize = 3;

/// Longest accepted short code.
pub const MAX_CODE_LENGTH: usize = 64;

/// Characters allowed anywhere in a short code.
static CODE_CHARSET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("valid code charset regex"));

/// Codes that cannot be used as short links.
///
/// These collide with service routes. Matching is case-insensitive.
pub const RESERVED_CODES: &[&str] = &["api", "health", "admin", "static", "links"];

/// Source of candidate short codes.
pub trait CodeGenerator: Send + Sync {
    /// Returns a syntactically valid candidate. Never fails.
    fn generate(&self) -> String;
}

/// Fixed-length random codes drawn uniformly from the base-62 alphabet.
///
/// At the default length of 7 the space holds about 3.5 * 10^12 codes.
#[derive(Debug, Clone)]
pub struct RandomCodeGenerator {
    length: usize,
}

impl RandomCodeGenerator {
    pub const DEFAULT_LENGTH: usize = 7;

    /// Creates a generator producing codes of `length` characters.
    ///
    /// `length` is clamped to the accepted code length range.
    pub fn new(length: usize) -> Self {
        Self {
            length: length.clamp(MIN_CODE_LENGTH, MAX_CODE_LENGTH),
        }
    }
}

impl Default for RandomCodeGenerator {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LENGTH)
    }
}

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self) -> String {
        rand::rng()
            .sample_iter(&Alphanumeric)
            .take(self.length)
            .map(char::from)
            .collect()
    }
}

/// Base-62 encoding of a monotonically increasing counter.
///
/// Codes are left-padded with `0` to `min_length`. The counter lives in process
/// memory, so a restarted process should be seeded past previously issued values;
/// collisions with earlier codes are still caught by the store.
#[derive(Debug)]
pub struct SequentialCodeGenerator {
    counter: AtomicU64,
    min_length: usize,
}

impl SequentialCodeGenerator {
    pub fn new(start: u64, min_length: usize) -> Self {
        Self {
            counter: AtomicU64::new(start),
            min_length: min_length.clamp(MIN_CODE_LENGTH, MAX_CODE_LENGTH),
        }
    }
}

impl CodeGenerator for SequentialCodeGenerator {
    fn generate(&self) -> String {
        let value = self.counter.fetch_add(1, Ordering::Relaxed);
        let encoded = encode_base62(value);

        if encoded.len() >= self.min_length {
            encoded
        } else {
            format!("{}{}", "0".repeat(self.min_length - encoded.len()), encoded)
        }
    }
}

/// Encodes `value` in base 62 without padding.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(encode_base62(0), "0");
/// assert_eq!(encode_base62(61), "z");
/// assert_eq!(encode_base62(62), "10");
/// ```
pub fn encode_base62(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::with_capacity(11);
    while value > 0 {
        digits.push(BASE62_ALPHABET[(value % 62) as usize]);
        value /= 62;
    }
    digits.reverse();

    String::from_utf8(digits).unwrap_or_default()
}

/// Returns true if `code` is one of [`RESERVED_CODES`].
pub fn is_reserved(code: &str) -> bool {
    RESERVED_CODES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(code))
}

/// Cheap syntactic check used on the redirect path.
///
/// A code failing this check can never exist in the store, so the lookup can be
/// skipped.
pub fn is_plausible_code(code: &str) -> bool {
    (MIN_CODE_LENGTH..=MAX_CODE_LENGTH).contains(&code.len()) && CODE_CHARSET_REGEX.is_match(code)
}

/// Validates a caller-chosen alias.
///
/// # Rules
///
/// - Length: 3-64 characters
/// - Allowed characters: ASCII letters, digits, `-` and `_`
/// - Cannot start or end with `-` or `_`
/// - Cannot be a reserved route word
///
/// # Errors
///
/// Returns [`AppError::InvalidAlias`] if any rule is violated.
///
/// # Examples
///
/// ```ignore
/// assert!(validate_alias("abc123").is_ok());
/// assert!(validate_alias("my-link_2024").is_ok());
///
/// assert!(validate_alias("ab").is_err());        // Too short
/// assert!(validate_alias("-invalid").is_err());  // Starts with hyphen
/// assert!(validate_alias("health").is_err());    // Reserved
/// ```
pub fn validate_alias(code: &str) -> Result<(), AppError> {
    if code.len() < MIN_CODE_LENGTH || code.len() > MAX_CODE_LENGTH {
        return Err(AppError::invalid_alias(
            format!(
                "Alias must be {}-{} characters",
                MIN_CODE_LENGTH, MAX_CODE_LENGTH
            ),
            json!({ "provided_length": code.len() }),
        ));
    }

    if !CODE_CHARSET_REGEX.is_match(code) {
        return Err(AppError::invalid_alias(
            "Alias can only contain letters, digits, hyphens and underscores",
            json!({ "short_code": code }),
        ));
    }

    let edge = |c: char| c == '-' || c == '_';
    if code.starts_with(edge) || code.ends_with(edge) {
        return Err(AppError::invalid_alias(
            "Alias cannot start or end with a hyphen or underscore",
            json!({ "short_code": code }),
        ));
    }

    if is_reserved(code) {
        return Err(AppError::invalid_alias(
            "This alias is reserved",
            json!({ "short_code": code }),
        ));
    }

    Ok(())
}
