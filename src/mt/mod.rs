//! Machine Translation Backends
//!
//! Everything that talks to a translation service lives here, behind the
//! [`MachineTranslator`] trait:
//!
//! 1. **Trait & locale helpers** - batch translation, language detection, BCP-47 validation
//! 2. **Google Translate** - Cloud Translation v2 over HTTP
//! 3. **Mock** - deterministic, recording backend for tests and dry runs
//!
//! # Example
//!
//! ```ignore
//! use json_translator::mt::{MachineTranslator, GoogleTranslateProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = GoogleTranslateProvider::from_env()?;
//!     let texts = vec!["Hello".to_string(), "Goodbye".to_string()];
//!     let translated = provider.translate_batch(&texts, Some("en"), "fr").await?;
//!     println!("{:?}", translated);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod google_translate;
pub mod mock;
pub mod translator;

pub use error::{MtError, MtResult};
pub use google_translate::GoogleTranslateProvider;
pub use mock::{MockCall, MockMode, MockTranslator};
pub use translator::{
    MachineTranslator, UNDETERMINED_LANGUAGE, normalize_locale, resolve_detected,
    validate_locale,
};
