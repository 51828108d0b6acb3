/// Error types for JSON translation and the backends behind it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MtError {
    /// Split response segments disagree with the number of strings sent
    SegmentMismatch { expected: usize, actual: usize },
    /// Backend returned a different number of entries than it was given
    LengthMismatch { expected: usize, actual: usize },
    /// A caller-supplied filter refused to answer
    FilterError(String),
    /// Error during translation phase
    TranslationError(String),
    /// Error during language detection
    DetectionError(String),
    /// Transport failure talking to a backend
    NetworkError(String),
    /// Missing or invalid configuration (credentials, limits)
    ConfigError(String),
    /// Language code that is not valid BCP-47
    InvalidLocale(String),
    /// General error with context
    Other(String),
}

impl std::fmt::Display for MtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MtError::SegmentMismatch { expected, actual } => write!(
                f,
                "Mismatched translation count: delivered {} string values to the backend, but received {}",
                expected, actual
            ),
            MtError::LengthMismatch { expected, actual } => write!(
                f,
                "Backend returned {} entries for {} requested texts",
                actual, expected
            ),
            MtError::FilterError(msg) => write!(f, "Filter error: {}", msg),
            MtError::TranslationError(msg) => write!(f, "Translation error: {}", msg),
            MtError::DetectionError(msg) => write!(f, "Detection error: {}", msg),
            MtError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            MtError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            MtError::InvalidLocale(msg) => write!(f, "Invalid locale: {}", msg),
            MtError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for MtError {}

impl From<reqwest::Error> for MtError {
    fn from(error: reqwest::Error) -> Self {
        // request URLs carry the API key
        MtError::NetworkError(error.without_url().to_string())
    }
}

/// Result type for MT operations
pub type MtResult<T> = Result<T, MtError>;
