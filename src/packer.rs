//! Batch packing
//!
//! Distinct strings are merged into pieces joined by [`SEPARATOR`], and pieces
//! are grouped into batches, one batch per backend request. Packing is pure:
//! the same texts and limits always produce the same batches, so it runs
//! ahead of dispatch.

use crate::config::PackingLimits;

/// Marker joining merged strings inside one piece
///
/// Markup-aware backends keep no-translate spans verbatim, so the marker
/// survives translation and the response can be split back apart.
pub const SEPARATOR: &str = r#"<span translate="no"></span>"#;

/// One or more distinct strings merged into a single backend item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    text: String,
    members: usize,
    bytes: usize,
}

impl Piece {
    fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            members: 1,
            bytes: text.len(),
        }
    }

    fn push(&mut self, text: &str) {
        self.text.push_str(SEPARATOR);
        self.text.push_str(text);
        self.bytes += SEPARATOR.len() + text.len();
        self.members += 1;
    }

    /// Packed text as sent to the backend
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of distinct strings merged into this piece
    pub fn members(&self) -> usize {
        self.members
    }

    /// Encoded byte length of the packed text
    pub fn bytes(&self) -> usize {
        self.bytes
    }
}

/// Pieces dispatched together in one backend request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    pieces: Vec<Piece>,
    bytes: usize,
}

impl Batch {
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn texts(&self) -> Vec<String> {
        self.pieces.iter().map(|p| p.text.clone()).collect()
    }

    /// Total number of distinct strings carried by this batch
    pub fn members(&self) -> usize {
        self.pieces.iter().map(Piece::members).sum()
    }

    /// Running byte total of the strings placed in this batch
    pub fn bytes(&self) -> usize {
        self.bytes
    }

    fn is_full(&self, limits: &PackingLimits) -> bool {
        self.bytes >= limits.request_bytes() || self.pieces.len() >= limits.request_pieces()
    }

    fn place(&mut self, text: &str, limits: &PackingLimits) {
        let length = text.len();
        match self.pieces.last_mut() {
            Some(open) if open.bytes + SEPARATOR.len() + length < limits.item_bytes() => {
                open.push(text);
            }
            _ => self.pieces.push(Piece::new(text)),
        }
        self.bytes += length;
    }
}

/// Pack distinct strings into batches of pieces
///
/// Strings keep their order: flattening every piece of every batch, split on
/// [`SEPARATOR`], yields `texts` again.
pub fn pack<S: AsRef<str>>(texts: &[S], limits: &PackingLimits) -> Vec<Batch> {
    let mut batches = Vec::new();
    let mut pending = Batch::default();

    for text in texts {
        if pending.is_full(limits) {
            batches.push(std::mem::take(&mut pending));
        }
        pending.place(text.as_ref(), limits);
    }
    if !pending.pieces.is_empty() {
        batches.push(pending);
    }
    batches
}

/// Split a backend response entry back into its segments
pub fn split_segments(text: &str) -> impl Iterator<Item = &str> {
    text.split(SEPARATOR)
}
