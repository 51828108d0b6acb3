//! Google Translate API provider for machine translation
//!
//! This module integrates with Google Translate API v2 for both translation
//! and language detection.
//!
//! # Authentication
//!
//! The provider loads the API key from the `GOOGLE_TRANSLATE_API_KEY`
//! environment variable. Obtain a key from:
//! https://console.cloud.google.com/
//!
//! # Markup
//!
//! Texts are sent with `format: "html"` so the no-translate spans joining
//! packed strings come back untouched. Google escapes a handful of characters
//! in HTML responses (`&#39;`, `&quot;`, `&amp;`, ...); those entities are
//! decoded before results are returned.
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
//!     println!("{}", provider.detect("Guten Morgen").await?);
//!     Ok(())
//! }
//! ```

use std::sync::LazyLock;

use crate::mt::error::{MtError, MtResult};
use crate::mt::translator::{MachineTranslator, UNDETERMINED_LANGUAGE, normalize_locale};
use async_trait::async_trait;
use regex::{Captures, Regex};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

const BASE_URL: &str = "https://translation.googleapis.com/language/translate/v2";

static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|amp|lt|gt|quot|apos);").expect("valid entity pattern")
});

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    data: TranslateData,
}

#[derive(Debug, Deserialize)]
struct TranslateData {
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Translation {
    translated_text: String,
}

#[derive(Debug, Deserialize)]
struct DetectResponse {
    data: DetectData,
}

#[derive(Debug, Deserialize)]
struct DetectData {
    detections: Vec<Vec<Detection>>,
}

#[derive(Debug, Deserialize)]
struct Detection {
    language: String,
}

/// Google Translate API v2 provider
#[derive(Clone)]
pub struct GoogleTranslateProvider {
    /// API key for authentication
    api_key: String,
    /// HTTP client for async requests
    client: reqwest::Client,
    /// Base URL for Google Translate API
    base_url: String,
}

impl GoogleTranslateProvider {
    /// Maximum number of texts per API request
    /// Google Translate v2 API accepts up to 128 texts per request
    const MAX_BATCH_SIZE: usize = 128;

    /// Maximum characters per string (30KB per Google Translate API limits)
    const MAX_CHARS_PER_STRING: usize = 30_000;

    /// Create a new GoogleTranslateProvider with an explicit API key
    pub fn new(api_key: String) -> MtResult<Self> {
        if api_key.trim().is_empty() {
            return Err(MtError::ConfigError("API key cannot be empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| MtError::NetworkError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            client,
            base_url: BASE_URL.to_string(),
        })
    }

    /// Create a GoogleTranslateProvider from the `GOOGLE_TRANSLATE_API_KEY` environment variable
    pub fn from_env() -> MtResult<Self> {
        let api_key = std::env::var("GOOGLE_TRANSLATE_API_KEY").map_err(|_| {
            MtError::ConfigError(
                "GOOGLE_TRANSLATE_API_KEY environment variable not set".to_string(),
            )
        })?;

        Self::new(api_key)
    }

    /// POST a JSON body and return the raw response text
    async fn post(&self, url: &str, body: serde_json::Value) -> MtResult<String> {
        let url = format!("{}?key={}", url, self.api_key);
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if status.is_client_error() {
            return Err(MtError::ConfigError(format!(
                "API client error ({}): {}",
                status, text
            )));
        }
        if !status.is_success() {
            return Err(MtError::TranslationError(format!(
                "API server error ({}): {}",
                status, text
            )));
        }
        Ok(text)
    }

    /// Translate a single chunk of at most `MAX_BATCH_SIZE` texts
    async fn translate_chunk(
        &self,
        texts: &[String],
        source_locale: Option<&str>,
        target_locale: &str,
    ) -> MtResult<Vec<String>> {
        let mut body = json!({
            "q": texts,
            "target": target_locale,
            "format": "html",
        });
        if let Some(source) = source_locale {
            body["source"] = json!(source);
        }

        let response = self.post(&self.base_url, body).await?;
        let results = parse_translations(&response)?;
        if results.len() != texts.len() {
            return Err(MtError::LengthMismatch {
                expected: texts.len(),
                actual: results.len(),
            });
        }
        Ok(results)
    }
}

impl std::fmt::Debug for GoogleTranslateProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleTranslateProvider")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl MachineTranslator for GoogleTranslateProvider {
    async fn translate_batch(
        &self,
        texts: &[String],
        source_locale: Option<&str>,
        target_locale: &str,
    ) -> MtResult<Vec<String>> {
        let target = normalize_locale(target_locale)?;
        let source = source_locale.map(normalize_locale).transpose()?;

        if texts.is_empty() {
            return Ok(Vec::new());
        }

        for (i, text) in texts.iter().enumerate() {
            if text.chars().count() > Self::MAX_CHARS_PER_STRING {
                return Err(MtError::TranslationError(format!(
                    "Text at index {} exceeds maximum length of {} characters",
                    i,
                    Self::MAX_CHARS_PER_STRING
                )));
            }
        }

        let mut all_results = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(Self::MAX_BATCH_SIZE) {
            debug!(texts = chunk.len(), target = %target, "google translate request");
            let chunk_results = self
                .translate_chunk(chunk, source.as_deref(), &target)
                .await?;
            all_results.extend(chunk_results);
        }
        Ok(all_results)
    }

    async fn detect(&self, text: &str) -> MtResult<String> {
        if text.trim().is_empty() {
            return Ok(UNDETERMINED_LANGUAGE.to_string());
        }
        let url = format!("{}/detect", self.base_url);
        let response = self.post(&url, json!({ "q": text })).await?;
        parse_detection(&response)
    }

    fn provider_name(&self) -> &str {
        "Google Translate"
    }
}

/// Extract `data.translations[*].translatedText` from a translate response
fn parse_translations(body: &str) -> MtResult<Vec<String>> {
    let response: TranslateResponse = serde_json::from_str(body).map_err(|e| {
        MtError::TranslationError(format!("Failed to parse API response: {}", e))
    })?;
    Ok(response
        .data
        .translations
        .into_iter()
        .map(|t| decode_entities(&t.translated_text))
        .collect())
}

/// Extract the first language of `data.detections` from a detect response
fn parse_detection(body: &str) -> MtResult<String> {
    let response: DetectResponse = serde_json::from_str(body)
        .map_err(|e| MtError::DetectionError(format!("Failed to parse API response: {}", e)))?;
    Ok(response
        .data
        .detections
        .into_iter()
        .flatten()
        .next()
        .map(|d| d.language)
        .unwrap_or_else(|| UNDETERMINED_LANGUAGE.to_string()))
}

/// Decode the character references Google emits in HTML-format responses
fn decode_entities(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &Captures<'_>| {
            let entity = &caps[1];
            let decoded = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => {
                    let number = &entity[1..];
                    let code = match number.strip_prefix(['x', 'X']) {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => number.parse().ok(),
                    };
                    code.and_then(char::from_u32)
                }
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}
