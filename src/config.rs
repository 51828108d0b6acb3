//! Packing limits for backend requests
//!
//! Two levels of ceilings decide how distinct strings travel to the backend:
//! the per-item ceiling bounds one merged piece, the per-request ceilings bound
//! one dispatched batch.
//!
//! # Example
//!
//! ```
//! use json_translator::config::PackingLimits;
//!
//! let limits = PackingLimits::new()
//!     .with_item_bytes(1_000)
//!     .with_request_pieces(64);
//! assert!(limits.validate().is_ok());
//! ```

use crate::mt::error::{MtError, MtResult};

/// Default byte ceiling of a single packed piece
pub const DEFAULT_ITEM_BYTES: usize = 500;

/// Default byte ceiling of all pieces in one request
pub const DEFAULT_REQUEST_BYTES: usize = 150_000;

/// Default number of pieces in one request
pub const DEFAULT_REQUEST_PIECES: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackingLimits {
    /// A piece is closed before it would reach this many encoded bytes
    item_bytes: usize,
    /// A request is dispatched once its pieces reach this many bytes
    request_bytes: usize,
    /// A request is dispatched once it holds this many pieces
    request_pieces: usize,
}

impl PackingLimits {
    pub fn new() -> Self {
        Self {
            item_bytes: DEFAULT_ITEM_BYTES,
            request_bytes: DEFAULT_REQUEST_BYTES,
            request_pieces: DEFAULT_REQUEST_PIECES,
        }
    }

    pub fn item_bytes(&self) -> usize {
        self.item_bytes
    }

    pub fn request_bytes(&self) -> usize {
        self.request_bytes
    }

    pub fn request_pieces(&self) -> usize {
        self.request_pieces
    }

    pub fn with_item_bytes(mut self, bytes: usize) -> Self {
        self.item_bytes = bytes;
        self
    }

    pub fn with_request_bytes(mut self, bytes: usize) -> Self {
        self.request_bytes = bytes;
        self
    }

    pub fn with_request_pieces(mut self, pieces: usize) -> Self {
        self.request_pieces = pieces;
        self
    }

    /// Reject ceilings that could never admit a piece
    pub fn validate(&self) -> MtResult<()> {
        for (name, value) in [
            ("item_bytes", self.item_bytes),
            ("request_bytes", self.request_bytes),
            ("request_pieces", self.request_pieces),
        ] {
            if value == 0 {
                return Err(MtError::ConfigError(format!(
                    "{} must be greater than zero",
                    name
                )));
            }
        }
        Ok(())
    }
}

impl Default for PackingLimits {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let limits = PackingLimits::default();
        assert_eq!(limits.item_bytes(), 500);
        assert_eq!(limits.request_bytes(), 150_000);
        assert_eq!(limits.request_pieces(), 128);
        assert!(limits.validate().is_ok());
    }

    #[test]
    fn test_builder_overrides() {
        let limits = PackingLimits::new()
            .with_item_bytes(10)
            .with_request_bytes(20)
            .with_request_pieces(3);
        assert_eq!(limits.item_bytes(), 10);
        assert_eq!(limits.request_bytes(), 20);
        assert_eq!(limits.request_pieces(), 3);
    }

    #[test]
    fn test_zero_ceiling_rejected() {
        let result = PackingLimits::new().with_request_pieces(0).validate();
        match result {
            Err(MtError::ConfigError(msg)) => assert!(msg.contains("request_pieces")),
            _ => panic!("Expected ConfigError"),
        }
    }
}
