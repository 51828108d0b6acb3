//! Machine Translation trait and utilities
//!
//! This module defines the `MachineTranslator` trait for backend abstraction.
//! The JSON pipeline only ever talks to this trait, so any provider that can
//! translate an ordered list of strings and detect the language of one string
//! can sit behind it (Google Translate, mock, etc.).
//!
//! # Example
//!
//! ```ignore
//! use json_translator::mt::{MachineTranslator, GoogleTranslateProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = GoogleTranslateProvider::from_env()?;
//!
//!     let texts = vec!["Hello".to_string(), "Goodbye".to_string()];
//!     let results = provider.translate_batch(&texts, Some("en"), "fr").await?;
//!     println!("{:?}", results);
//!
//!     let language = provider.detect("Bonjour tout le monde").await?;
//!     println!("{}", language); // "fr"
//!     Ok(())
//! }
//! ```

use crate::mt::error::{MtError, MtResult};
use async_trait::async_trait;
use icu_locale::Locale;

/// Language code reported by backends that could not identify the language
pub const UNDETERMINED_LANGUAGE: &str = "und";

/// Generic trait for machine translation backends
///
/// All methods are async to support I/O-bound operations like network requests.
#[async_trait]
pub trait MachineTranslator: Send + Sync {
    /// Translate multiple strings in a single backend request
    ///
    /// # Arguments
    ///
    /// * `texts` - Strings to translate
    /// * `source_locale` - Source language code, or `None` to let the backend decide
    /// * `target_locale` - Target language code
    ///
    /// # Guarantees
    ///
    /// - Output order matches input order
    /// - Output length equals input length
    async fn translate_batch(
        &self,
        texts: &[String],
        source_locale: Option<&str>,
        target_locale: &str,
    ) -> MtResult<Vec<String>>;

    /// Detect the language of a text
    ///
    /// Returns a language code, or [`UNDETERMINED_LANGUAGE`] when the backend
    /// cannot tell.
    async fn detect(&self, text: &str) -> MtResult<String>;

    /// Translate a single text string
    async fn translate(
        &self,
        text: &str,
        source_locale: Option<&str>,
        target_locale: &str,
    ) -> MtResult<String> {
        let results = self
            .translate_batch(&[text.to_string()], source_locale, target_locale)
            .await?;
        let actual = results.len();
        results.into_iter().next().ok_or(MtError::LengthMismatch {
            expected: 1,
            actual,
        })
    }

    /// Get the name of this translation provider, used for logging
    fn provider_name(&self) -> &str;
}

/// Normalize a language code to canonical BCP-47 form
///
/// - `EN-us` → `en-US`
/// - `zh_hant` → `zh-Hant`
/// - `ko` → `ko`
///
/// Regions and scripts are kept, since backends distinguish e.g. `zh-CN`
/// from `zh-TW`.
pub fn normalize_locale(locale: &str) -> MtResult<String> {
    validate_locale(locale)?;
    let parsed: Locale = locale
        .replace('_', "-")
        .parse()
        .map_err(|e| MtError::InvalidLocale(format!("{}: {:?}", locale, e)))?;
    Ok(parsed.to_string())
}

/// Validate that a language code is well-formed BCP-47
pub fn validate_locale(locale: &str) -> MtResult<()> {
    if locale.trim().is_empty() {
        return Err(MtError::InvalidLocale("Locale code is empty".to_string()));
    }

    locale
        .replace('_', "-")
        .parse::<Locale>()
        .map(|_| ())
        .map_err(|_| {
            MtError::InvalidLocale(format!("Invalid characters in locale code: {}", locale))
        })
}

/// Map a backend detection result to an optional language code
///
/// Undetermined or empty results become `None`.
pub fn resolve_detected(language: &str) -> Option<String> {
    let language = language.trim();
    if language.is_empty() || language.eq_ignore_ascii_case(UNDETERMINED_LANGUAGE) {
        None
    } else {
        Some(language.to_string())
    }
}
