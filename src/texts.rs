//! Text Lister
//!
//! Read-only walk listing the distinct strings a translation would send, used
//! for standalone language detection. Filter and dictionary behave exactly as
//! in [`crate::collector::collect`], but nothing is cloned.

use std::collections::HashSet;

use serde_json::Value;

use crate::dictionary::Dictionary;
use crate::explore::{Filter, Leaf, Trail, Visited};
use crate::mt::error::MtResult;

struct Lister<'f> {
    filter: Option<&'f Filter<'f>>,
    dictionary: Option<&'f Dictionary>,
    visited: Visited,
    seen: HashSet<String>,
    texts: Vec<String>,
}

impl<'f> Lister<'f> {
    fn visit<'a>(&mut self, value: &'a Value, trail: &Trail<'a>) -> MtResult<()> {
        match value {
            Value::String(raw) => {
                let Some(leaf) = Leaf::parse(raw) else {
                    return Ok(());
                };
                if !trail.admits(self.filter, raw)? {
                    return Ok(());
                }
                if self.dictionary.is_some_and(|d| d.contains_key(leaf.text)) {
                    return Ok(());
                }
                if self.seen.insert(leaf.text.to_string()) {
                    self.texts.push(leaf.text.to_string());
                }
            }
            Value::Array(array) if self.visited.first_visit(value) => {
                for (index, element) in array.iter().enumerate() {
                    self.visit(element, &trail.element(array, index))?;
                }
            }
            Value::Object(object) if self.visited.first_visit(value) => {
                for (key, field) in object {
                    self.visit(field, &trail.field(object, key))?;
                }
            }
            _ => {}
        }
        Ok(())
    }
}

/// Distinct translatable strings of `input` in first-encountered order
pub fn list_texts(
    input: &Value,
    filter: Option<&Filter<'_>>,
    dictionary: Option<&Dictionary>,
) -> MtResult<Vec<String>> {
    let mut lister = Lister {
        filter,
        dictionary,
        visited: Visited::default(),
        seen: HashSet::new(),
        texts: Vec::new(),
    };
    lister.visit(input, &Trail::root())?;
    Ok(lister.texts)
}

/// Longest text by character count; the first one wins ties
pub fn longest_text<S: AsRef<str>>(texts: &[S]) -> Option<&str> {
    let mut longest: Option<(&str, usize)> = None;
    for text in texts {
        let text = text.as_ref();
        let length = text.chars().count();
        if longest.is_none_or(|(_, best)| length > best) {
            longest = Some((text, length));
        }
    }
    longest.map(|(text, _)| text)
}
