//! Error types for Ethos operations

/// Result type for Ethos operations
pub type Result<T> = std::result::Result<T, EthosError>;

/// Error types for the Ethos chat library
#[derive(Debug, thiserror::Error)]
pub enum EthosError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// No API credential could be found
    #[error("{0} not found. Set it in the environment or in the `llm.api_key` config field")]
    MissingCredential(String),

    /// Personality identifier not present in the catalog
    #[error("Unknown personality: {0}")]
    UnknownPersonality(String),

    /// Model identifier outside the supported set
    #[error("Unknown model: {0}")]
    UnknownModel(String),

    /// Personality catalog failed validation
    #[error("Invalid personality catalog: {0}")]
    InvalidCatalog(String),

    /// Transport-level HTTP failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status returned by the hosted API
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Response body did not have the expected shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Failure while reading a token stream
    #[error("Stream error: {0}")]
    Stream(String),

    /// Provider has no streaming endpoint
    #[error("Streaming not supported by provider {0}")]
    StreamingUnsupported(String),

    /// Export requested with nothing to write
    #[error("Transcript is empty, nothing to export")]
    EmptyTranscript,

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML catalog parse error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
