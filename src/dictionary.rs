//! Dictionary Differ
//!
//! Composes a dictionary of original → translated strings from an input tree
//! and its translated counterpart. Feeding the result back as the reserved
//! dictionary of a later translation skips the backend for every string that
//! was already translated.
//!
//! The two trees are walked in lockstep; wherever they diverge (a different
//! kind of node, a missing key, a missing index) that subtree is skipped and
//! the dictionary simply lacks its entries.

use std::collections::HashMap;

use serde_json::Value;

use crate::explore::{Filter, Trail, Visited};
use crate::mt::error::MtResult;

/// Exact-match map from original text to translated text
pub type Dictionary = HashMap<String, String>;

struct Differ<'f> {
    filter: Option<&'f Filter<'f>>,
    visited: Visited,
    dictionary: Dictionary,
}

impl<'f> Differ<'f> {
    fn visit<'a>(&mut self, input: &'a Value, output: &Value, trail: &Trail<'a>) -> MtResult<()> {
        match (input, output) {
            (Value::String(original), Value::String(translated)) => {
                if original.trim().is_empty() || !trail.admits(self.filter, original)? {
                    return Ok(());
                }
                self.dictionary
                    .insert(original.clone(), translated.clone());
            }
            (Value::Array(originals), Value::Array(translations))
                if self.visited.first_visit(input) =>
            {
                for (index, (original, translated)) in
                    originals.iter().zip(translations).enumerate()
                {
                    self.visit(original, translated, &trail.element(originals, index))?;
                }
            }
            (Value::Object(originals), Value::Object(translations))
                if self.visited.first_visit(input) =>
            {
                for (key, original) in originals {
                    if let Some(translated) = translations.get(key) {
                        self.visit(original, translated, &trail.field(originals, key))?;
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }
}

/// Pair every admitted string of `input` with the string at the same place in `output`
pub fn compose_dictionary(
    input: &Value,
    output: &Value,
    filter: Option<&Filter<'_>>,
) -> MtResult<Dictionary> {
    let mut differ = Differ {
        filter,
        visited: Visited::default(),
        dictionary: Dictionary::new(),
    };
    differ.visit(input, output, &Trail::root())?;
    Ok(differ.dictionary)
}
