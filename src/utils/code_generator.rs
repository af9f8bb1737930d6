//! Short code generation and validation.
//!
//! Provides the [`CodeGenerator`] policies used by
//! [`crate::application::allocator::CodeAllocator`] and validation for
//! user-provided custom codes.

use rand::Rng;
use rand::distr::Alphanumeric;
use regex::Regex;
use std::sync::LazyLock;

use crate::error::AppError;

/// Default dictionary for word-pair codes.
pub const DEFAULT_WORDS: &[&str] = &[
    "apple", "banana", "cherry", "delta", "echo", "foxtrot", "golf", "hotel", "india", "juliet",
    "kilo", "lima", "mango", "nectar", "oscar", "panda", "quokka", "romeo", "sierra", "tango",
    "umbrella", "violet", "whiskey", "xray", "yankee", "zulu",
];

/// Default length of random alphanumeric codes.
pub const DEFAULT_RANDOM_LENGTH: usize = 6;

/// Longest accepted custom code.
pub const MAX_CUSTOM_CODE_LENGTH: usize = 64;

/// Codes that would shadow fixed routes.
pub const RESERVED_CODES: &[&str] = &["shorten", "stats", "health", "static"];

static CUSTOM_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("custom code regex is valid"));

static SEPARATOR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]*$").expect("separator regex is valid"));

/// Produces candidate short codes.
///
/// Generators are pure: they never consult the store, so candidates may
/// collide and callers must check them.
pub trait CodeGenerator: Send + Sync {
    fn generate(&self) -> String;

    /// Short human-readable name for logs.
    fn name(&self) -> &'static str;
}

/// Joins two independently drawn dictionary words, e.g. `apple-zulu`.
#[derive(Debug, Clone)]
pub struct WordPairGenerator {
    words: Vec<String>,
    separator: String,
}

impl WordPairGenerator {
    /// Creates a generator over a custom dictionary.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidInput`] if the dictionary is empty,
    /// contains an empty word, or the separator is not URL-path safe.
    pub fn new(words: Vec<String>, separator: impl Into<String>) -> Result<Self, AppError> {
        let separator = separator.into();
        validate_separator(&separator)?;

        if words.is_empty() {
            return Err(AppError::invalid_input("Word dictionary must not be empty"));
        }
        if words.iter().any(|w| w.is_empty()) {
            return Err(AppError::invalid_input(
                "Word dictionary must not contain empty words",
            ));
        }

        Ok(Self { words, separator })
    }

    /// Generator over [`DEFAULT_WORDS`].
    pub fn with_separator(separator: impl Into<String>) -> Self {
        Self {
            words: DEFAULT_WORDS.iter().map(|w| w.to_string()).collect(),
            separator: separator.into(),
        }
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }
}

impl Default for WordPairGenerator {
    fn default() -> Self {
        Self::with_separator("-")
    }
}

impl CodeGenerator for WordPairGenerator {
    fn generate(&self) -> String {
        let mut rng = rand::rng();
        let first = &self.words[rng.random_range(0..self.words.len())];
        let second = &self.words[rng.random_range(0..self.words.len())];
        format!("{}{}{}", first, self.separator, second)
    }

    fn name(&self) -> &'static str {
        "words"
    }
}

/// Fixed-length string drawn uniformly from `[0-9A-Za-z]`.
#[derive(Debug, Clone)]
pub struct RandomCodeGenerator {
    length: usize,
}

impl RandomCodeGenerator {
    pub fn new(length: usize) -> Self {
        Self {
            length: length.max(1),
        }
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

impl Default for RandomCodeGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_RANDOM_LENGTH)
    }
}

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self) -> String {
        rand::rng()
            .sample_iter(Alphanumeric)
            .take(self.length)
            .map(char::from)
            .collect()
    }

    fn name(&self) -> &'static str {
        "random"
    }
}

/// Whether `code` would be shadowed by a fixed route.
pub fn is_reserved_code(code: &str) -> bool {
    RESERVED_CODES.contains(&code)
}

/// Validates the separator placed between the two words of a word-pair code.
///
/// Only characters allowed in custom codes are accepted, so generated codes
/// stay addressable as a single path segment. An empty separator is allowed.
///
/// # Errors
///
/// Returns [`AppError::InvalidInput`] for any other character.
pub fn validate_separator(separator: &str) -> Result<(), AppError> {
    if !SEPARATOR_REGEX.is_match(separator) {
        return Err(AppError::invalid_input(
            "Word separator can only contain letters, digits, hyphens and underscores",
        ));
    }
    Ok(())
}

/// Validates a user-provided custom short code.
///
/// # Rules
///
/// - Length: 1-64 characters
/// - Allowed characters: ASCII letters, digits, `-` and `_`
/// - Cannot be a reserved route name
///
/// Valid codes are used verbatim; nothing is lowercased or trimmed.
///
/// # Errors
///
/// Returns [`AppError::InvalidInput`] if any rule is violated.
pub fn validate_custom_code(code: &str) -> Result<(), AppError> {
    if code.is_empty() || code.len() > MAX_CUSTOM_CODE_LENGTH {
        return Err(AppError::invalid_input(format!(
            "Custom code must be 1-{} characters",
            MAX_CUSTOM_CODE_LENGTH
        )));
    }

    if !CUSTOM_CODE_REGEX.is_match(code) {
        return Err(AppError::invalid_input(
            "Custom code can only contain letters, digits, hyphens and underscores",
        ));
    }

    if is_reserved_code(code) {
        return Err(AppError::invalid_input("This code is reserved"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_default_dictionary_is_large_enough() {
        assert!(DEFAULT_WORDS.len() >= 20);
        let unique: HashSet<_> = DEFAULT_WORDS.iter().collect();
        assert_eq!(unique.len(), DEFAULT_WORDS.len());
    }

    #[test]
    fn test_word_pair_shape() {
        let generator = WordPairGenerator::default();

        for _ in 0..100 {
            let code = generator.generate();
            let (first, second) = code.split_once('-').unwrap();
            assert!(DEFAULT_WORDS.contains(&first));
            assert!(DEFAULT_WORDS.contains(&second));
        }
    }

    #[test]
    fn test_word_pair_custom_separator() {
        let generator = WordPairGenerator::new(vec!["solo".to_string()], "_").unwrap();
        assert_eq!(generator.generate(), "solo_solo");
    }

    #[test]
    fn test_word_pair_rejects_empty_dictionary() {
        assert!(WordPairGenerator::new(vec![], "-").is_err());
        assert!(WordPairGenerator::new(vec!["a".to_string(), String::new()], "-").is_err());
    }

    #[test]
    fn test_random_code_length_and_alphabet() {
        let generator = RandomCodeGenerator::new(8);

        for _ in 0..100 {
            let code = generator.generate();
            assert_eq!(code.len(), 8);
            assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn test_random_codes_are_mostly_unique() {
        let generator = RandomCodeGenerator::default();
        let codes: HashSet<_> = (0..1000).map(|_| generator.generate()).collect();

        // 62^6 candidates; a handful of collisions would already be suspicious.
        assert!(codes.len() >= 995);
    }

    #[test]
    fn test_random_length_is_at_least_one() {
        assert_eq!(RandomCodeGenerator::new(0).length(), 1);
    }

    #[test]
    fn test_validate_accepts_verbatim_codes() {
        assert!(validate_custom_code("abc").is_ok());
        assert!(validate_custom_code("My_Code-2024").is_ok());
        assert!(validate_custom_code("x").is_ok());
    }

    #[test]
    fn test_validate_length_limits() {
        assert!(validate_custom_code("").is_err());
        assert!(validate_custom_code(&"a".repeat(MAX_CUSTOM_CODE_LENGTH)).is_ok());
        assert!(validate_custom_code(&"a".repeat(MAX_CUSTOM_CODE_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_validate_rejects_path_characters() {
        for code in ["a/b", "a b", "a?b", "héllo", "a.b"] {
            assert!(validate_custom_code(code).is_err(), "{code} should be rejected");
        }
    }

    #[test]
    fn test_validate_all_reserved_codes() {
        for &reserved in RESERVED_CODES {
            let result = validate_custom_code(reserved);
            assert!(
                result.is_err(),
                "Reserved code '{}' should be invalid",
                reserved
            );
        }
    }

    #[test]
    fn test_separator_must_be_path_safe() {
        assert!(validate_separator("-").is_ok());
        assert!(validate_separator("_").is_ok());
        assert!(validate_separator("").is_ok());

        for sep in ["/", "?", "#", " ", "."] {
            assert!(validate_separator(sep).is_err(), "{sep:?} should be rejected");
            assert!(WordPairGenerator::new(vec!["a".to_string()], sep).is_err());
        }
    }

    #[test]
    fn test_is_reserved_code() {
        assert!(is_reserved_code("health"));
        assert!(!is_reserved_code("Health"));
        assert!(!is_reserved_code("apple-zulu"));
    }
}
