//! Machine translation for JSON documents
//!
//! Walks an arbitrary JSON value, translates every string leaf a caller
//! admits, and returns a clone of the input with the same shape. Identical
//! strings are translated once, short strings are packed together to cut
//! request counts, and a reserved dictionary can pin known translations.
//!
//! ```ignore
//! use json_translator::{JsonTranslator, TranslateRequest};
//! use json_translator::mt::{MockMode, MockTranslator};
//! use serde_json::json;
//!
//! let translator = JsonTranslator::new(MockTranslator::new(MockMode::Suffix));
//! let input = json!({ "greeting": "hello", "farewell": "bye." });
//! let output = translator.translate(TranslateRequest::new(&input, "fr")).await?;
//! assert_eq!(output, json!({ "greeting": "hello_fr", "farewell": "bye_fr." }));
//! ```

pub mod collector;
pub mod config;
pub mod dictionary;
pub mod explore;
pub mod json_translator;
pub mod mt;
pub mod packer;
pub mod texts;


pub use collector::{Collection, Step, TextEntry, WriteBinding, collect};
pub use config::PackingLimits;
pub use dictionary::{Dictionary, compose_dictionary};
pub use explore::{Explore, Filter, Parent};
pub use json_translator::{
    DetectRequest, DictionaryRequest, JsonTranslator, SourceLanguage, TranslateRequest,
};
pub use mt::{
    GoogleTranslateProvider, MachineTranslator, MockCall, MockMode, MockTranslator, MtError,
    MtResult,
};
pub use packer::{Batch, Piece, SEPARATOR, pack, split_segments};
pub use texts::{list_texts, longest_text};
