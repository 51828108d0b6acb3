//! Tree Collector
//!
//! Walks a JSON value once, producing a clone of it together with the list of
//! distinct translatable strings. Every occurrence of a string is bound to its
//! address in the clone, so one translation per distinct string is enough to
//! fill every location that shares it.
//!
//! # Example
//!
//! ```
//! use json_translator::collector::collect;
//! use serde_json::json;
//!
//! let input = json!({ "a": "hello", "b": ["hello", "world."] });
//! let collection = collect(&input, None, None).unwrap();
//! assert_eq!(collection.texts(), vec!["hello", "world"]);
//!
//! let output = collection
//!     .apply(&["안녕".to_string(), "세계".to_string()])
//!     .unwrap();
//! assert_eq!(output, json!({ "a": "안녕", "b": ["안녕", "세계."] }));
//! ```

use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use crate::dictionary::Dictionary;
use crate::explore::{Filter, Leaf, Trail, reattach};
use crate::mt::error::{MtError, MtResult};

/// One step from a container to a child
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Step {
    Key(String),
    Index(usize),
}

/// Location in the output clone that receives a translated string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteBinding {
    address: Vec<Step>,
    period: bool,
}

impl WriteBinding {
    /// Steps from the clone root; empty when the whole input is one string
    pub fn address(&self) -> &[Step] {
        &self.address
    }

    /// Whether a trailing period was detached from this occurrence
    pub fn period(&self) -> bool {
        self.period
    }

    fn write(&self, root: &mut Value, text: &str) {
        if let Some(slot) = slot(root, &self.address) {
            *slot = Value::String(reattach(text, self.period));
        }
    }
}

fn slot<'v>(root: &'v mut Value, address: &[Step]) -> Option<&'v mut Value> {
    address.iter().try_fold(root, |node, step| match step {
        Step::Key(key) => node.as_object_mut()?.get_mut(key),
        Step::Index(index) => node.as_array_mut()?.get_mut(*index),
    })
}

/// A distinct string and every location it was found at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEntry {
    text: String,
    bindings: Vec<WriteBinding>,
}

impl TextEntry {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn bindings(&self) -> &[WriteBinding] {
        &self.bindings
    }
}

/// Output clone plus the distinct strings still waiting for translation
#[derive(Debug, Clone)]
pub struct Collection {
    output: Value,
    entries: Vec<TextEntry>,
}

impl Collection {
    /// Clone of the input with dictionary hits already written
    pub fn output(&self) -> &Value {
        &self.output
    }

    /// Distinct strings in first-encountered order
    pub fn entries(&self) -> &[TextEntry] {
        &self.entries
    }

    pub fn texts(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.text.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write one translation per distinct string into the clone
    ///
    /// `translations[i]` goes to every binding of `entries()[i]`. Translations
    /// are trimmed; an empty one leaves its locations untouched. Nothing is
    /// written unless the counts agree.
    pub fn apply(mut self, translations: &[String]) -> MtResult<Value> {
        if translations.len() != self.entries.len() {
            return Err(MtError::SegmentMismatch {
                expected: self.entries.len(),
                actual: translations.len(),
            });
        }
        for (entry, translated) in self.entries.iter().zip(translations) {
            let translated = translated.trim();
            if translated.is_empty() {
                continue;
            }
            for binding in &entry.bindings {
                binding.write(&mut self.output, translated);
            }
        }
        Ok(self.output)
    }

    /// Give up on translation and keep the clone as it stands
    pub fn into_output(self) -> Value {
        self.output
    }
}

struct Collector<'f> {
    filter: Option<&'f Filter<'f>>,
    dictionary: Option<&'f Dictionary>,
    output: Value,
    entries: Vec<TextEntry>,
    positions: HashMap<String, usize>,
    dictionary_hits: usize,
}

impl<'f> Collector<'f> {
    fn visit<'a>(
        &mut self,
        value: &'a Value,
        trail: &Trail<'a>,
        address: &mut Vec<Step>,
    ) -> MtResult<()> {
        match value {
            Value::String(raw) => self.leaf(raw, trail, address),
            Value::Array(array) => {
                for (index, element) in array.iter().enumerate() {
                    address.push(Step::Index(index));
                    self.visit(element, &trail.element(array, index), address)?;
                    address.pop();
                }
                Ok(())
            }
            Value::Object(object) => {
                for (key, field) in object {
                    address.push(Step::Key(key.clone()));
                    self.visit(field, &trail.field(object, key), address)?;
                    address.pop();
                }
                Ok(())
            }
            Value::Null | Value::Bool(_) | Value::Number(_) => Ok(()),
        }
    }

    fn leaf(&mut self, raw: &str, trail: &Trail<'_>, address: &[Step]) -> MtResult<()> {
        let Some(leaf) = Leaf::parse(raw) else {
            return Ok(());
        };
        if !trail.admits(self.filter, raw)? {
            return Ok(());
        }

        let binding = WriteBinding {
            address: address.to_vec(),
            period: leaf.period,
        };
        if let Some(reserved) = self.dictionary.and_then(|d| d.get(leaf.text)) {
            binding.write(&mut self.output, reserved);
            self.dictionary_hits += 1;
            return Ok(());
        }

        match self.positions.get(leaf.text) {
            Some(&position) => self.entries[position].bindings.push(binding),
            None => {
                self.positions
                    .insert(leaf.text.to_string(), self.entries.len());
                self.entries.push(TextEntry {
                    text: leaf.text.to_string(),
                    bindings: vec![binding],
                });
            }
        }
        Ok(())
    }
}

/// Clone `input` and gather its distinct translatable strings
///
/// Leaves rejected by `filter` keep their original text; leaves found in
/// `dictionary` are written immediately and never reach the backend.
pub fn collect(
    input: &Value,
    filter: Option<&Filter<'_>>,
    dictionary: Option<&Dictionary>,
) -> MtResult<Collection> {
    let mut collector = Collector {
        filter,
        dictionary,
        output: input.clone(),
        entries: Vec::new(),
        positions: HashMap::new(),
        dictionary_hits: 0,
    };
    collector.visit(input, &Trail::root(), &mut Vec::new())?;

    let bindings: usize = collector.entries.iter().map(|e| e.bindings.len()).sum();
    debug!(
        distinct = collector.entries.len(),
        bindings,
        dictionary_hits = collector.dictionary_hits,
        "collected translatable strings"
    );

    Ok(Collection {
        output: collector.output,
        entries: collector.entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explore::Explore;
    use serde_json::json;

    fn nested_fixture(nested: Value) -> Value {
        let mut input = nested.clone();
        let object = input.as_object_mut().unwrap();
        object.insert("nested".to_string(), nested.clone());
        object.insert("instances".to_string(), json!(vec![nested; 5]));
        input
    }

    fn dictionary() -> Dictionary {
        Dictionary::from([
            ("brothers".to_string(), "형제님들".to_string()),
            ("sisters".to_string(), "자매님들".to_string()),
            ("descendants".to_string(), "후손님들".to_string()),
        ])
    }

    #[test]
    fn test_duplicated_strings_share_one_entry() {
        let input = nested_fixture(json!({
            "x": "hello",
            "y": "world",
            "z": "hello",
            "array": ["hello", "world", "hello", "world"],
        }));
        let collection = collect(&input, None, None).unwrap();

        assert_eq!(collection.texts(), vec!["hello", "world"]);
        // four occurrences in each of the seven copies
        assert_eq!(collection.entries()[0].bindings().len(), 28);

        let output = collection
            .apply(&["안녕".to_string(), "세계".to_string()])
            .unwrap();
        let translated = json!({
            "x": "안녕",
            "y": "세계",
            "z": "안녕",
            "array": ["안녕", "세계", "안녕", "세계"],
        });
        assert_eq!(output, nested_fixture(translated));
    }

    #[test]
    fn test_dictionary_hits_written_immediately() {
        let input = nested_fixture(json!({
            "x": "hello",
            "y": "brothers",
            "z": "sisters",
            "array": ["hello", "brothers", "sisters", "descendants"],
        }));
        let dictionary = dictionary();
        let collection = collect(&input, None, Some(&dictionary)).unwrap();

        assert_eq!(collection.texts(), vec!["hello"]);
        assert_eq!(collection.output()["y"], "형제님들");
        assert_eq!(collection.output()["instances"][4]["array"][3], "후손님들");

        let output = collection.apply(&["안녕하세요".to_string()]).unwrap();
        let translated = json!({
            "x": "안녕하세요",
            "y": "형제님들",
            "z": "자매님들",
            "array": ["안녕하세요", "형제님들", "자매님들", "후손님들"],
        });
        assert_eq!(output, nested_fixture(translated));
    }

    #[test]
    fn test_filter_and_dictionary_together() {
        let input = nested_fixture(json!({
            "x": "hello",
            "y": "brothers",
            "z": "sisters",
            "ancestors": "ancestors",
            "array": ["hello", "brothers", "sisters", "descendants"],
        }));
        let dictionary = dictionary();
        let filter = |explore: &Explore<'_>| -> MtResult<bool> {
            Ok(explore.key != Some("ancestors")
                && !(explore.key == Some("array") && explore.index == Some(3)))
        };
        let collection = collect(&input, Some(&filter), Some(&dictionary)).unwrap();
        assert_eq!(collection.texts(), vec!["hello"]);

        let output = collection.apply(&["안녕하세요".to_string()]).unwrap();
        let translated = json!({
            "x": "안녕하세요",
            "y": "형제님들",
            "z": "자매님들",
            "ancestors": "ancestors",
            "array": ["안녕하세요", "형제님들", "자매님들", "descendants"],
        });
        assert_eq!(output, nested_fixture(translated));
    }

    #[test]
    fn test_trailing_period_reattached_per_occurrence() {
        let input = json!({ "a": "Good morning.", "b": "  Good morning  " });
        let collection = collect(&input, None, None).unwrap();
        assert_eq!(collection.texts(), vec!["Good morning"]);

        let bindings = collection.entries()[0].bindings();
        assert!(bindings[0].period());
        assert!(!bindings[1].period());

        let output = collection.apply(&["좋은 아침".to_string()]).unwrap();
        assert_eq!(output, json!({ "a": "좋은 아침.", "b": "좋은 아침" }));
    }

    #[test]
    fn test_dictionary_matches_text_without_period() {
        let input = json!(["brothers.", "brothers"]);
        let dictionary = dictionary();
        let collection = collect(&input, None, Some(&dictionary)).unwrap();
        assert!(collection.is_empty());
        assert_eq!(collection.into_output(), json!(["형제님들.", "형제님들"]));
    }

    #[test]
    fn test_empty_and_whitespace_skipped() {
        let input = json!({ "empty": "", "blank": "   ", "dot": ".", "n": 1, "b": true, "z": null });
        let collection = collect(&input, None, None).unwrap();
        assert!(collection.is_empty());
        assert_eq!(collection.into_output(), input);
    }

    #[test]
    fn test_root_string_binding() {
        let input = json!("hello");
        let collection = collect(&input, None, None).unwrap();
        assert!(collection.entries()[0].bindings()[0].address().is_empty());
        assert_eq!(collection.apply(&["bonjour".to_string()]).unwrap(), json!("bonjour"));
    }

    #[test]
    fn test_addresses_follow_path() {
        let input = json!({ "list": [{ "name": "x" }] });
        let collection = collect(&input, None, None).unwrap();
        assert_eq!(
            collection.entries()[0].bindings()[0].address(),
            &[
                Step::Key("list".to_string()),
                Step::Index(0),
                Step::Key("name".to_string())
            ]
        );
    }

    #[test]
    fn test_input_never_mutated() {
        let input = json!({ "a": "hello" });
        let snapshot = input.clone();
        let output = collect(&input, None, None)
            .unwrap()
            .apply(&["안녕".to_string()])
            .unwrap();
        assert_eq!(input, snapshot);
        assert_ne!(output, input);
    }

    #[test]
    fn test_empty_translation_leaves_original() {
        let input = json!({ "a": "hello", "b": "world" });
        let output = collect(&input, None, None)
            .unwrap()
            .apply(&["  ".to_string(), "세계".to_string()])
            .unwrap();
        assert_eq!(output, json!({ "a": "hello", "b": "세계" }));
    }

    #[test]
    fn test_apply_count_mismatch() {
        let input = json!(["one", "two"]);
        let result = collect(&input, None, None)
            .unwrap()
            .apply(&["eins".to_string()]);
        assert_eq!(
            result,
            Err(MtError::SegmentMismatch {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_filter_error_aborts() {
        let input = json!({ "a": "hello", "b": "world" });
        let filter = |explore: &Explore<'_>| -> MtResult<bool> {
            if explore.key == Some("b") {
                Err(MtError::FilterError("cannot decide".to_string()))
            } else {
                Ok(true)
            }
        };
        let result = collect(&input, Some(&filter), None);
        assert!(matches!(result, Err(MtError::FilterError(_))));
    }

    #[test]
    fn test_key_order_preserved() {
        let input = json!({ "z": "last", "a": "first", "m": "middle" });
        let collection = collect(&input, None, None).unwrap();
        assert_eq!(collection.texts(), vec!["last", "first", "middle"]);
    }
}
