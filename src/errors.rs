/*!
 * Error types for the scenegen application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur while turning a raw project document into a project tree
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The decoded document is not a JSON object at the top level
    #[error("Malformed document: expected a JSON object at the top level, found {found}")]
    NotAnObject {
        /// JSON type that was found instead
        found: &'static str,
    },

    /// A scene or shot entry is not a JSON object
    #[error("Malformed document: {path} must be a JSON object")]
    InvalidEntry {
        /// Location of the entry, e.g. `scenes[2].shots[0]`
        path: String,
    },

    /// A scene or shot is missing the identifier needed to build the tree
    #[error("Malformed document: {path} is missing required identifier `{field}`")]
    MissingIdentifier {
        /// Location of the entry
        path: String,
        /// Name of the missing field
        field: &'static str,
    },

    /// The byte stream could not be decoded as JSON
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    /// The document file does not carry a `.json` extension
    #[error("Unsupported document format: {0} (only .json files are accepted)")]
    UnsupportedFormat(String),

    /// The document file exceeds the configured size limit
    #[error("Document too large: {size} bytes exceeds the limit of {limit} bytes")]
    TooLarge {
        /// Actual file size in bytes
        size: u64,
        /// Configured limit in bytes
        limit: u64,
    },
}

impl DocumentError {
    /// Whether this error belongs to the MalformedDocument class: the JSON
    /// decoded fine but no valid project tree can be built from it.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Self::NotAnObject { .. } | Self::InvalidEntry { .. } | Self::MissingIdentifier { .. }
        )
    }
}

/// Errors that can occur when working with generation provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The request was rejected before it was sent
    #[error("Invalid generation request: {0}")]
    InvalidInput(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from loading or normalizing a project document
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(format!("{:#}", error))
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
