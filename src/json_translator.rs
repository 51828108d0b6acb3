//! Translation Orchestrator
//!
//! [`JsonTranslator`] runs the whole pipeline against one backend:
//!
//! 1. **Collect** distinct strings from the input and clone it
//! 2. **Detect** the source language from the longest string, unless given
//! 3. **Pack** the strings into pieces and batches
//! 4. **Dispatch** batches one at a time and validate every response
//! 5. **Apply** the translations to the clone
//!
//! Any failure aborts before step 5, so a call either returns a fully
//! translated clone or an error, never a half-written one.
//!
//! # Example
//!
//! ```ignore
//! use json_translator::{JsonTranslator, TranslateRequest, SourceLanguage};
//! use json_translator::mt::GoogleTranslateProvider;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let translator = JsonTranslator::new(GoogleTranslateProvider::from_env()?);
//!     let input = json!({ "id": 7, "title": "Hello", "body": "Nice to meet you." });
//!
//!     let output = translator
//!         .translate(
//!             TranslateRequest::new(&input, "ko")
//!                 .source(SourceLanguage::Code("en".to_string()))
//!                 .filter(|explore| Ok(explore.key != Some("id"))),
//!         )
//!         .await?;
//!     println!("{}", output);
//!     Ok(())
//! }
//! ```

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::collector::collect;
use crate::config::PackingLimits;
use crate::dictionary::{Dictionary, compose_dictionary};
use crate::explore::{Explore, Filter};
use crate::mt::error::{MtError, MtResult};
use crate::mt::translator::{MachineTranslator, resolve_detected, validate_locale};
use crate::packer::{Batch, pack, split_segments};
use crate::texts::{list_texts, longest_text};

/// How the source language of a translation is chosen
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SourceLanguage {
    /// Ask the backend about the longest string
    #[default]
    Detect,
    /// Send no source language; suits documents mixing several languages
    Omit,
    /// Use this language code
    Code(String),
}

/// Arguments of [`JsonTranslator::translate`]
pub struct TranslateRequest<'a> {
    input: &'a Value,
    target: String,
    source: SourceLanguage,
    filter: Option<Box<Filter<'a>>>,
    dictionary: Option<&'a Dictionary>,
}

impl<'a> TranslateRequest<'a> {
    pub fn new(input: &'a Value, target: &str) -> Self {
        Self {
            input,
            target: target.to_string(),
            source: SourceLanguage::Detect,
            filter: None,
            dictionary: None,
        }
    }

    pub fn source(mut self, source: SourceLanguage) -> Self {
        self.source = source;
        self
    }

    /// Only leaves for which `filter` returns `Ok(true)` are translated
    pub fn filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&Explore<'_>) -> MtResult<bool> + Send + Sync + 'a,
    {
        self.filter = Some(Box::new(filter));
        self
    }

    /// Pre-translated values used instead of the backend on exact matches
    pub fn dictionary(mut self, dictionary: &'a Dictionary) -> Self {
        self.dictionary = Some(dictionary);
        self
    }
}

/// Arguments of [`JsonTranslator::detect`]
pub struct DetectRequest<'a> {
    input: &'a Value,
    filter: Option<Box<Filter<'a>>>,
    dictionary: Option<&'a Dictionary>,
}

impl<'a> DetectRequest<'a> {
    pub fn new(input: &'a Value) -> Self {
        Self {
            input,
            filter: None,
            dictionary: None,
        }
    }

    pub fn filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&Explore<'_>) -> MtResult<bool> + Send + Sync + 'a,
    {
        self.filter = Some(Box::new(filter));
        self
    }

    pub fn dictionary(mut self, dictionary: &'a Dictionary) -> Self {
        self.dictionary = Some(dictionary);
        self
    }
}

/// Arguments of [`JsonTranslator::dictionary`]
///
/// Re-apply the filter used for the translation, or strings that were never
/// translated end up mapped to themselves.
pub struct DictionaryRequest<'a> {
    input: &'a Value,
    output: &'a Value,
    filter: Option<Box<Filter<'a>>>,
}

impl<'a> DictionaryRequest<'a> {
    pub fn new(input: &'a Value, output: &'a Value) -> Self {
        Self {
            input,
            output,
            filter: None,
        }
    }

    pub fn filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&Explore<'_>) -> MtResult<bool> + Send + Sync + 'a,
    {
        self.filter = Some(Box::new(filter));
        self
    }
}

/// Translates JSON documents through a [`MachineTranslator`]
#[derive(Debug, Clone)]
pub struct JsonTranslator<T: MachineTranslator> {
    backend: T,
    limits: PackingLimits,
}

impl<T: MachineTranslator> JsonTranslator<T> {
    pub fn new(backend: T) -> Self {
        Self {
            backend,
            limits: PackingLimits::default(),
        }
    }

    pub fn with_limits(backend: T, limits: PackingLimits) -> MtResult<Self> {
        limits.validate()?;
        Ok(Self { backend, limits })
    }

    pub fn backend(&self) -> &T {
        &self.backend
    }

    pub fn limits(&self) -> &PackingLimits {
        &self.limits
    }

    /// Translate every admitted string of the input into `target`
    ///
    /// Returns a clone of the input with the same shape, where only string
    /// values differ.
    pub async fn translate(&self, request: TranslateRequest<'_>) -> MtResult<Value> {
        validate_locale(&request.target)?;
        if let SourceLanguage::Code(code) = &request.source {
            validate_locale(code)?;
        }

        let collection = collect(request.input, request.filter.as_deref(), request.dictionary)?;
        if collection.is_empty() {
            debug!("nothing to translate");
            return Ok(collection.into_output());
        }
        let texts = collection.texts();

        let source = match request.source {
            SourceLanguage::Detect => self.detect_language(&texts).await?,
            SourceLanguage::Omit => None,
            SourceLanguage::Code(code) => Some(code),
        };

        let batches = pack(&texts, &self.limits);
        let mut translated = Vec::with_capacity(texts.len());
        for (index, batch) in batches.iter().enumerate() {
            let segments = self
                .dispatch(index, batch, source.as_deref(), &request.target)
                .await?;
            translated.extend(segments);
        }

        info!(
            provider = self.backend.provider_name(),
            source = source.as_deref().unwrap_or("-"),
            target = %request.target,
            distinct = texts.len(),
            batches = batches.len(),
            "translated json"
        );
        collection.apply(&translated)
    }

    /// Detect the language of the input from its longest admitted string
    ///
    /// Returns `None` when there is nothing to detect or the backend cannot
    /// tell.
    pub async fn detect(&self, request: DetectRequest<'_>) -> MtResult<Option<String>> {
        let texts = list_texts(request.input, request.filter.as_deref(), request.dictionary)?;
        self.detect_language(&texts).await
    }

    /// Compose an original → translated dictionary from two parallel trees
    pub fn dictionary(&self, request: DictionaryRequest<'_>) -> MtResult<Dictionary> {
        compose_dictionary(request.input, request.output, request.filter.as_deref())
    }

    async fn detect_language<S: AsRef<str> + Sync>(&self, texts: &[S]) -> MtResult<Option<String>> {
        let Some(longest) = longest_text(texts) else {
            return Ok(None);
        };
        let language = resolve_detected(&self.backend.detect(longest).await?);
        info!(
            provider = self.backend.provider_name(),
            language = language.as_deref().unwrap_or("undetermined"),
            "detected source language"
        );
        Ok(language)
    }

    /// Send one batch and split the response back into per-string segments
    async fn dispatch(
        &self,
        index: usize,
        batch: &Batch,
        source: Option<&str>,
        target: &str,
    ) -> MtResult<Vec<String>> {
        let texts = batch.texts();
        debug!(
            batch = index,
            pieces = texts.len(),
            members = batch.members(),
            bytes = batch.bytes(),
            "dispatching batch"
        );

        let response = self.backend.translate_batch(&texts, source, target).await?;
        if response.len() != texts.len() {
            return Err(MtError::LengthMismatch {
                expected: texts.len(),
                actual: response.len(),
            });
        }

        let segments: Vec<String> = response
            .iter()
            .flat_map(|entry| split_segments(entry).map(|s| s.trim().to_string()))
            .collect();
        let expected = batch.members();
        if segments.len() != expected {
            for (piece, received) in batch.pieces().iter().zip(&response) {
                let actual = split_segments(received).count();
                if actual != piece.members() {
                    warn!(
                        batch = index,
                        sent = piece.text(),
                        received = %received,
                        expected = piece.members(),
                        actual,
                        "segment count changed in translation"
                    );
                }
            }
            return Err(MtError::SegmentMismatch {
                expected,
                actual: segments.len(),
            });
        }
        Ok(segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mt::mock::{MockMode, MockTranslator};
    use crate::packer::SEPARATOR;
    use async_trait::async_trait;
    use serde_json::json;

    /// Backend that answers with one entry fewer than requested
    struct Truncating;

    #[async_trait]
    impl MachineTranslator for Truncating {
        async fn translate_batch(
            &self,
            texts: &[String],
            _source_locale: Option<&str>,
            _target_locale: &str,
        ) -> MtResult<Vec<String>> {
            Ok(texts.iter().skip(1).cloned().collect())
        }

        async fn detect(&self, _text: &str) -> MtResult<String> {
            Ok("en".to_string())
        }

        fn provider_name(&self) -> &str {
            "Truncating"
        }
    }

    fn suffix_translator() -> JsonTranslator<MockTranslator> {
        JsonTranslator::new(MockTranslator::new(MockMode::Suffix))
    }

    #[tokio::test]
    async fn test_duplicates_receive_same_translation() {
        let translator =
            JsonTranslator::new(MockTranslator::new(MockMode::Constant("안녕".to_string())));
        let input = json!({ "a": "hello", "b": "hello" });

        let output = translator
            .translate(TranslateRequest::new(&input, "ko"))
            .await
            .unwrap();

        assert_eq!(output, json!({ "a": "안녕", "b": "안녕" }));
        assert_eq!(translator.backend().translate_calls(), vec![vec!["hello"]]);
    }

    #[tokio::test]
    async fn test_dictionary_hit_skips_backend() {
        let translator = suffix_translator();
        let input = json!({ "x": "brothers" });
        let dictionary = Dictionary::from([("brothers".to_string(), "형제님들".to_string())]);

        let output = translator
            .translate(TranslateRequest::new(&input, "ko").dictionary(&dictionary))
            .await
            .unwrap();

        assert_eq!(output, json!({ "x": "형제님들" }));
        assert!(translator.backend().calls().is_empty());
    }

    #[tokio::test]
    async fn test_filtered_leaf_unchanged() {
        let translator = suffix_translator();
        let input = json!({ "keep": "hello", "skip": "world" });

        let output = translator
            .translate(
                TranslateRequest::new(&input, "ko")
                    .source(SourceLanguage::Code("en".to_string()))
                    .filter(|explore| Ok(explore.key != Some("skip"))),
            )
            .await
            .unwrap();

        assert_eq!(output, json!({ "keep": "hello_ko", "skip": "world" }));
    }

    #[tokio::test]
    async fn test_long_strings_ride_in_one_batch() {
        let translator = suffix_translator();
        let first = "a".repeat(600);
        let second = "b".repeat(600);
        let input = json!([first, second]);

        let output = translator
            .translate(TranslateRequest::new(&input, "ko").source(SourceLanguage::Omit))
            .await
            .unwrap();

        let calls = translator.backend().translate_calls();
        assert_eq!(calls, vec![vec![first.clone(), second.clone()]]);
        assert_eq!(output, json!([format!("{}_ko", first), format!("{}_ko", second)]));
    }

    #[tokio::test]
    async fn test_segment_mismatch_aborts() {
        let translator =
            JsonTranslator::new(MockTranslator::new(MockMode::Constant("merged".to_string())));
        let input = json!({ "a": "hello", "b": "world" });

        let result = translator
            .translate(TranslateRequest::new(&input, "ko").source(SourceLanguage::Omit))
            .await;

        assert_eq!(
            result,
            Err(MtError::SegmentMismatch {
                expected: 2,
                actual: 1
            })
        );
        let sent = translator.backend().translate_calls();
        assert_eq!(sent, vec![vec![format!("hello{}world", SEPARATOR)]]);
    }

    #[tokio::test]
    async fn test_short_response_aborts() {
        let translator = JsonTranslator::with_limits(
            Truncating,
            PackingLimits::new().with_item_bytes(1),
        )
        .unwrap();
        let input = json!(["one", "two"]);

        let result = translator
            .translate(TranslateRequest::new(&input, "ko").source(SourceLanguage::Omit))
            .await;

        assert_eq!(
            result,
            Err(MtError::LengthMismatch {
                expected: 2,
                actual: 1
            })
        );
    }

    #[tokio::test]
    async fn test_request_ceiling_adds_batch_in_order() {
        let limits = PackingLimits::new()
            .with_item_bytes(1)
            .with_request_pieces(2);
        let translator =
            JsonTranslator::with_limits(MockTranslator::new(MockMode::Suffix), limits).unwrap();
        let input = json!({ "a": "one", "b": ["two", "three"], "c": { "d": "four", "e": 5 } });

        let output = translator
            .translate(TranslateRequest::new(&input, "fr").source(SourceLanguage::Omit))
            .await
            .unwrap();

        assert_eq!(
            translator.backend().translate_calls(),
            vec![vec!["one", "two"], vec!["three", "four"]]
        );
        assert_eq!(
            output,
            json!({ "a": "one_fr", "b": ["two_fr", "three_fr"], "c": { "d": "four_fr", "e": 5 } })
        );
    }

    #[tokio::test]
    async fn test_detects_from_longest_string() {
        let translator = JsonTranslator::new(MockTranslator::new(MockMode::Suffix).detecting("ko"));
        let input = json!({ "short": "안녕", "long": "만나서 반갑습니다", "tie": "만나서 반갑습니까" });

        translator
            .translate(TranslateRequest::new(&input, "en"))
            .await
            .unwrap();

        assert_eq!(translator.backend().detect_calls(), vec!["만나서 반갑습니다"]);
        match &translator.backend().calls()[1] {
            crate::mt::mock::MockCall::Translate { source, .. } => {
                assert_eq!(source.as_deref(), Some("ko"));
            }
            other => panic!("Expected translate call, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_undetermined_language_sends_no_source() {
        let translator =
            JsonTranslator::new(MockTranslator::new(MockMode::Suffix).detecting("und"));
        let input = json!(["bonjour"]);

        translator
            .translate(TranslateRequest::new(&input, "en"))
            .await
            .unwrap();

        let calls = translator.backend().calls();
        assert!(matches!(
            &calls[1],
            crate::mt::mock::MockCall::Translate { source: None, .. }
        ));
    }

    #[tokio::test]
    async fn test_explicit_source_skips_detection() {
        let translator = suffix_translator();
        let input = json!(["hello"]);

        translator
            .translate(
                TranslateRequest::new(&input, "de").source(SourceLanguage::Code("en".to_string())),
            )
            .await
            .unwrap();
        translator
            .translate(TranslateRequest::new(&input, "de").source(SourceLanguage::Omit))
            .await
            .unwrap();

        assert!(translator.backend().detect_calls().is_empty());
        assert_eq!(translator.backend().translate_calls().len(), 2);
    }

    #[tokio::test]
    async fn test_nothing_to_translate_makes_no_calls() {
        let translator = suffix_translator();
        let input = json!({ "n": 1, "blank": "  ", "list": [true, null] });

        let output = translator
            .translate(TranslateRequest::new(&input, "ko"))
            .await
            .unwrap();

        assert_eq!(output, input);
        assert!(translator.backend().calls().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_target_rejected_before_backend() {
        let translator = suffix_translator();
        let input = json!(["hello"]);

        let result = translator
            .translate(TranslateRequest::new(&input, "not a code!"))
            .await;

        assert!(matches!(result, Err(MtError::InvalidLocale(_))));
        assert!(translator.backend().calls().is_empty());
    }

    #[tokio::test]
    async fn test_backend_error_surfaces() {
        let translator =
            JsonTranslator::new(MockTranslator::new(MockMode::Error("quota".to_string())));
        let input = json!(["hello"]);

        let result = translator
            .translate(TranslateRequest::new(&input, "ko").source(SourceLanguage::Omit))
            .await;
        assert_eq!(result, Err(MtError::TranslationError("quota".to_string())));
    }

    #[tokio::test]
    async fn test_detect_operation() {
        let translator = JsonTranslator::new(MockTranslator::new(MockMode::Suffix).detecting("fr"));
        let input = json!({ "a": "bonjour", "b": "une phrase plus longue", "c": "ignored text that is longest" });

        let language = translator
            .detect(DetectRequest::new(&input).filter(|explore| Ok(explore.key != Some("c"))))
            .await
            .unwrap();

        assert_eq!(language.as_deref(), Some("fr"));
        assert_eq!(translator.backend().detect_calls(), vec!["une phrase plus longue"]);
    }

    #[tokio::test]
    async fn test_detect_without_texts() {
        let translator = suffix_translator();
        let language = translator
            .detect(DetectRequest::new(&json!({ "n": 1 })))
            .await
            .unwrap();
        assert_eq!(language, None);
        assert!(translator.backend().calls().is_empty());
    }

    #[test]
    fn test_dictionary_operation() {
        let translator = suffix_translator();
        let input = json!({ "id": "a-1", "title": "hello" });
        let output = json!({ "id": "a-1", "title": "안녕" });

        let dictionary = translator
            .dictionary(DictionaryRequest::new(&input, &output).filter(|explore| {
                Ok(explore.key != Some("id"))
            }))
            .unwrap();

        assert_eq!(
            dictionary,
            Dictionary::from([("hello".to_string(), "안녕".to_string())])
        );
    }

    #[test]
    fn test_with_limits_validates() {
        let result = JsonTranslator::with_limits(
            MockTranslator::new(MockMode::Suffix),
            PackingLimits::new().with_item_bytes(0),
        );
        assert!(matches!(result, Err(MtError::ConfigError(_))));
    }
}
