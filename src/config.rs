//! Application configuration loaded from environment variables.
//!
//! Configuration is loaded once at startup and validated before the server starts.
//!
//! ## Variables
//!
//! - `LISTEN` - Bind address (default: `0.0.0.0:3000`)
//! - `BASE_URL` - Public prefix of short URLs (default: `http://localhost:3000`)
//! - `STORE_PATH` - Snapshot file of the mapping store (default: `data/urls.json`)
//! - `CODE_STRATEGY` - `words`, `sequence` or `random` (default: `words`)
//! - `CODE_LENGTH` - Length of random codes, 4-32 (default: 6)
//! - `WORD_SEPARATOR` - Separator between the two words of a word-pair code (default: `-`)
//! - `MAX_ALLOCATION_ATTEMPTS` - Retry cap for generated codes, 1-10000 (default: 32)
//! - `RUST_LOG` - Log level (default: `info`)
//! - `LOG_FORMAT` - Log format: `text` or `json` (default: `text`)

use anyhow::{Context, Result};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::application::allocator::{CodePolicy, DEFAULT_MAX_ATTEMPTS};
use crate::utils::code_generator::{
    DEFAULT_RANDOM_LENGTH, RandomCodeGenerator, WordPairGenerator, validate_separator,
};

/// Which code generation strategy the service uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeStrategy {
    Words,
    Sequence,
    Random,
}

impl FromStr for CodeStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "words" | "word-pair" => Ok(Self::Words),
            "sequence" | "base62" => Ok(Self::Sequence),
            "random" => Ok(Self::Random),
            other => anyhow::bail!(
                "CODE_STRATEGY must be 'words', 'sequence' or 'random', got '{}'",
                other
            ),
        }
    }
}

impl fmt::Display for CodeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Words => "words",
            Self::Sequence => "sequence",
            Self::Random => "random",
        };
        f.write_str(name)
    }
}

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: String,
    pub base_url: String,
    pub store_path: PathBuf,
    pub code_strategy: CodeStrategy,
    pub code_length: usize,
    pub word_separator: String,
    pub max_allocation_attempts: usize,
    pub log_level: String,
    pub log_format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:3000".to_string(),
            base_url: "http://localhost:3000".to_string(),
            store_path: PathBuf::from("data/urls.json"),
            code_strategy: CodeStrategy::Words,
            code_length: DEFAULT_RANDOM_LENGTH,
            word_separator: "-".to_string(),
            max_allocation_attempts: DEFAULT_MAX_ATTEMPTS,
            log_level: "info".to_string(),
            log_format: "text".to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let code_strategy = match env::var("CODE_STRATEGY") {
            Ok(v) => v.parse()?,
            Err(_) => defaults.code_strategy,
        };

        let code_length =
            parse_var("CODE_LENGTH")?.unwrap_or(defaults.code_length);

        let max_allocation_attempts =
            parse_var("MAX_ALLOCATION_ATTEMPTS")?.unwrap_or(defaults.max_allocation_attempts);

        Ok(Self {
            listen_addr: env::var("LISTEN").unwrap_or(defaults.listen_addr),
            base_url: env::var("BASE_URL").unwrap_or(defaults.base_url),
            store_path: env::var("STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.store_path),
            code_strategy,
            code_length,
            word_separator: env::var("WORD_SEPARATOR").unwrap_or(defaults.word_separator),
            max_allocation_attempts,
            log_level: env::var("RUST_LOG").unwrap_or(defaults.log_level),
            log_format: env::var("LOG_FORMAT").unwrap_or(defaults.log_format),
        })
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `listen_addr` is not `host:port`
    /// - `base_url` is not an http(s) URL
    /// - `code_length` is outside 4-32
    /// - `word_separator` contains characters other than `[A-Za-z0-9_-]`
    /// - `max_allocation_attempts` is outside 1-10000
    /// - `log_format` is not `text` or `json`
    pub fn validate(&self) -> Result<()> {
        if !self.listen_addr.contains(':') {
            anyhow::bail!(
                "LISTEN must be in format 'host:port', got '{}'",
                self.listen_addr
            );
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            anyhow::bail!(
                "BASE_URL must start with 'http://' or 'https://', got '{}'",
                self.base_url
            );
        }

        if self.store_path.as_os_str().is_empty() {
            anyhow::bail!("STORE_PATH must not be empty");
        }

        if !(4..=32).contains(&self.code_length) {
            anyhow::bail!(
                "CODE_LENGTH must be between 4 and 32, got {}",
                self.code_length
            );
        }

        if validate_separator(&self.word_separator).is_err() {
            anyhow::bail!(
                "WORD_SEPARATOR may only contain letters, digits, '-' and '_', got '{}'",
                self.word_separator
            );
        }

        if self.max_allocation_attempts == 0 || self.max_allocation_attempts > 10_000 {
            anyhow::bail!(
                "MAX_ALLOCATION_ATTEMPTS must be between 1 and 10000, got {}",
                self.max_allocation_attempts
            );
        }

        if self.log_format != "text" && self.log_format != "json" {
            anyhow::bail!(
                "LOG_FORMAT must be 'text' or 'json', got '{}'",
                self.log_format
            );
        }

        Ok(())
    }

    /// Builds the code policy selected by `CODE_STRATEGY`.
    pub fn code_policy(&self) -> CodePolicy {
        match self.code_strategy {
            CodeStrategy::Words => {
                CodePolicy::generated(WordPairGenerator::with_separator(&self.word_separator))
            }
            CodeStrategy::Random => CodePolicy::generated(RandomCodeGenerator::new(self.code_length)),
            CodeStrategy::Sequence => CodePolicy::Sequence,
        }
    }

    /// Prints configuration summary.
    pub fn print_summary(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Listen address: {}", self.listen_addr);
        tracing::info!("  Base URL: {}", self.base_url);
        tracing::info!("  Store: {}", self.store_path.display());
        tracing::info!("  Code strategy: {}", self.code_strategy);
        tracing::info!("  Max allocation attempts: {}", self.max_allocation_attempts);
        tracing::info!("  Log level: {}", self.log_level);
        tracing::info!("  Log format: {}", self.log_format);
    }
}

fn parse_var<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(v) => v
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{} must be a number, got '{}'", name, v)),
        Err(_) => Ok(None),
    }
}

/// Loads and validates configuration from environment variables.
///
/// # Errors
///
/// Returns an error if a variable cannot be parsed or validation fails.
///
/// # Note
///
/// This function expects environment variables to be already loaded
/// (e.g., via `dotenvy::dotenv()` in `main.rs`).
pub fn load_from_env() -> Result<Config> {
    let config = Config::from_env()?;
    config.validate()?;
    Ok(config)
}
