//! Mock Machine Translator for testing
//!
//! This module provides a deterministic, API-free backend for testing the JSON
//! pipeline without API keys or network access. Like a markup-aware backend,
//! it keeps the packing separator intact and translates each segment between
//! separators on its own. Every call is recorded so tests can assert how many
//! requests were made and what they carried.
//!
//! # Example
//!
//! ```ignore
//! use json_translator::mt::{MachineTranslator, MockTranslator, MockMode};
//!
//! #[tokio::test]
//! async fn test_translation() {
//!     let mock = MockTranslator::new(MockMode::Suffix);
//!     let result = mock.translate("hello", Some("en"), "fr").await.unwrap();
//!     assert_eq!(result, "hello_fr");
//!     assert_eq!(mock.translate_calls().len(), 1);
//! }
//! ```

use crate::mt::error::{MtError, MtResult};
use crate::mt::translator::MachineTranslator;
use crate::packer::SEPARATOR;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock translation modes for testing different scenarios
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Append locale suffix to every segment: "hello" → "hello_fr"
    Suffix,

    /// Use predefined mappings for realistic translations
    /// (segment, target_locale) → translation, falling back to suffix
    Mappings(HashMap<(String, String), String>),

    /// Replace every entry wholesale, separators included
    Constant(String),

    /// Simulate API errors
    Error(String),

    /// No-op: return input unchanged
    NoOp,
}

/// One request received by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Translate {
        texts: Vec<String>,
        source: Option<String>,
        target: String,
    },
    Detect {
        text: String,
    },
}

/// Mock translator that simulates various translation scenarios
///
/// Clones share one call log.
#[derive(Debug, Clone)]
pub struct MockTranslator {
    mode: MockMode,
    /// Language reported by `detect`
    detected: String,
    /// Optional simulated network delay (in milliseconds)
    delay_ms: u64,
    calls: Arc<Mutex<Vec<MockCall>>>,
}

impl MockTranslator {
    /// Create a new MockTranslator with the given mode
    pub fn new(mode: MockMode) -> Self {
        Self {
            mode,
            detected: "en".to_string(),
            delay_ms: 0,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a MockTranslator with simulated network delay
    pub fn with_delay(mode: MockMode, delay_ms: u64) -> Self {
        Self {
            delay_ms,
            ..Self::new(mode)
        }
    }

    /// Language code `detect` will report, e.g. `"und"` to simulate failure
    pub fn detecting(mut self, language: &str) -> Self {
        self.detected = language.to_string();
        self
    }

    /// Every call received so far, in order
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Texts of every translate call received so far
    pub fn translate_calls(&self) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                MockCall::Translate { texts, .. } => Some(texts),
                MockCall::Detect { .. } => None,
            })
            .collect()
    }

    /// Texts of every detect call received so far
    pub fn detect_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                MockCall::Detect { text } => Some(text),
                MockCall::Translate { .. } => None,
            })
            .collect()
    }

    fn record(&self, call: MockCall) {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(call);
    }

    /// Internal helper to apply the simulated delay
    async fn apply_delay(&self) {
        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }
    }

    fn translate_segment(&self, segment: &str, target: &str) -> String {
        match &self.mode {
            MockMode::Mappings(map) => map
                .get(&(segment.to_string(), target.to_string()))
                .cloned()
                .unwrap_or_else(|| format!("{}_{}", segment, target)),
            MockMode::NoOp => segment.to_string(),
            _ => format!("{}_{}", segment, target),
        }
    }

    /// Apply translation logic based on the mode
    fn apply_translation(&self, text: &str, target: &str) -> MtResult<String> {
        match &self.mode {
            MockMode::Error(msg) => Err(MtError::TranslationError(msg.clone())),
            MockMode::Constant(value) => Ok(value.clone()),
            _ => Ok(text
                .split(SEPARATOR)
                .map(|segment| self.translate_segment(segment, target))
                .collect::<Vec<_>>()
                .join(SEPARATOR)),
        }
    }
}

#[async_trait]
impl MachineTranslator for MockTranslator {
    async fn translate_batch(
        &self,
        texts: &[String],
        source_locale: Option<&str>,
        target_locale: &str,
    ) -> MtResult<Vec<String>> {
        self.record(MockCall::Translate {
            texts: texts.to_vec(),
            source: source_locale.map(str::to_string),
            target: target_locale.to_string(),
        });

        // Apply simulated delay (per batch, not per string)
        self.apply_delay().await;

        texts
            .iter()
            .map(|text| self.apply_translation(text, target_locale))
            .collect()
    }

    async fn detect(&self, text: &str) -> MtResult<String> {
        self.record(MockCall::Detect {
            text: text.to_string(),
        });
        self.apply_delay().await;

        match &self.mode {
            MockMode::Error(msg) => Err(MtError::DetectionError(msg.clone())),
            _ => Ok(self.detected.clone()),
        }
    }

    fn provider_name(&self) -> &str {
        "Mock Translator"
    }
}
