//! Error taxonomy shared by the core and client crates.

/// Errors produced while talking to whatthemovie or interpreting its pages.
///
/// Filtered content (NSFW, excluded tags) and shots without a solution are
/// not errors; the acquisition loop skips or accepts them silently.
#[derive(thiserror::Error, Debug)]
pub enum WtmError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Authentication failed: no element matched `{selector}`")]
    AuthExtraction { selector: &'static str },

    #[error("Required element `{selector}` missing on {page_url}")]
    MissingRequiredElement {
        selector: &'static str,
        page_url: String,
    },

    #[error("Empty image payload from {0}")]
    EmptyImage(String),

    #[error("Solution decode error: {0}")]
    SolutionDecode(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid header value: {0}")]
    InvalidHeader(String),

    #[error("Invalid selector: {0}")]
    Selector(String),

    #[error("Invalid difficulty: {0}")]
    InvalidDifficulty(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl WtmError {
    /// Whether this error belongs to the transport class (connection,
    /// HTTP status or deadline failures).
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            WtmError::Network(_) | WtmError::HttpStatus { .. } | WtmError::Timeout(_)
        )
    }
}

/// Convenience result type.
pub type WtmResult<T> = Result<T, WtmError>;
