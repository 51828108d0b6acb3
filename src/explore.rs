//! Exploration context handed to filter predicates
//!
//! Every walk over a JSON tree (collecting, listing, diffing) tracks where it
//! is: the container holding the current value, the nearest object key, the
//! array index, and the accessor path from the root. Filters receive this as an
//! [`Explore`] and decide whether a leaf string takes part.
//!
//! # Example
//!
//! ```
//! use json_translator::explore::Explore;
//! use json_translator::mt::MtResult;
//!
//! // translate everything except the fourth element of `array`
//! let filter = |explore: &Explore<'_>| -> MtResult<bool> {
//!     Ok(!(explore.key == Some("array") && explore.index == Some(3)))
//! };
//! # let _ = filter;
//! ```

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::mt::error::MtResult;

/// First element of every accessor path
pub const ROOT_ACCESSOR: &str = "$input";

/// Caller predicate deciding whether a leaf string is translated
///
/// Returning an error aborts the whole operation with that error.
pub type Filter<'f> = dyn Fn(&Explore<'_>) -> MtResult<bool> + Send + Sync + 'f;

/// Container directly holding the explored value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Parent<'a> {
    Object(&'a Map<String, Value>),
    Array(&'a [Value]),
}

/// Where a leaf string sits in the tree
#[derive(Debug, Clone, PartialEq)]
pub struct Explore<'a> {
    /// Container holding the value, `None` at the root
    pub parent: Option<Parent<'a>>,
    /// Nearest enclosing object key; array elements inherit their array's key
    pub key: Option<&'a str>,
    /// Index when the value is an array element
    pub index: Option<usize>,
    /// `["$input", "a", "0", "b"]` for `$input.a[0].b`
    pub accessor: &'a [String],
    /// The leaf string exactly as it appears in the input
    pub value: &'a str,
}

/// Position of a walk, extended one step per descent
#[derive(Debug, Clone)]
pub(crate) struct Trail<'a> {
    parent: Option<Parent<'a>>,
    key: Option<&'a str>,
    index: Option<usize>,
    accessor: Vec<String>,
}

impl<'a> Trail<'a> {
    pub fn root() -> Self {
        Self {
            parent: None,
            key: None,
            index: None,
            accessor: vec![ROOT_ACCESSOR.to_string()],
        }
    }

    pub fn field(&self, object: &'a Map<String, Value>, key: &'a str) -> Self {
        let mut accessor = self.accessor.clone();
        accessor.push(key.to_string());
        Self {
            parent: Some(Parent::Object(object)),
            key: Some(key),
            index: None,
            accessor,
        }
    }

    pub fn element(&self, array: &'a [Value], index: usize) -> Self {
        let mut accessor = self.accessor.clone();
        accessor.push(index.to_string());
        Self {
            parent: Some(Parent::Array(array)),
            key: self.key,
            index: Some(index),
            accessor,
        }
    }

    /// Ask the filter about `value` at this position; no filter admits everything
    pub fn admits(&self, filter: Option<&Filter<'_>>, value: &str) -> MtResult<bool> {
        match filter {
            Some(filter) => filter(&Explore {
                parent: self.parent,
                key: self.key,
                index: self.index,
                accessor: &self.accessor,
                value,
            }),
            None => Ok(true),
        }
    }
}

/// A leaf string reduced to the text that is matched and translated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Leaf<'a> {
    pub text: &'a str,
    pub period: bool,
}

impl<'a> Leaf<'a> {
    /// Trim surrounding whitespace and detach one trailing period
    ///
    /// Returns `None` when nothing translatable remains.
    pub fn parse(value: &'a str) -> Option<Self> {
        let trimmed = value.trim();
        let (text, period) = match trimmed.strip_suffix('.') {
            Some(text) => (text, true),
            None => (trimmed, false),
        };
        if text.is_empty() {
            None
        } else {
            Some(Self { text, period })
        }
    }
}

/// Put a detached trailing period back onto a written value
pub(crate) fn reattach(text: &str, period: bool) -> String {
    if period {
        format!("{}.", text)
    } else {
        text.to_string()
    }
}

/// Identities of containers already walked
///
/// Owned `Value` trees cannot share nodes, so this never fires on parsed
/// input; it keeps a walk from visiting one container twice regardless.
#[derive(Debug, Default)]
pub(crate) struct Visited(HashSet<usize>);

impl Visited {
    /// Record `node`, returning `false` if it was seen before
    pub fn first_visit(&mut self, node: &Value) -> bool {
        self.0.insert(node as *const Value as usize)
    }
}
