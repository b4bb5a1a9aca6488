//! Error types for MoodScope

/// Result type alias using MoodScope's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for MoodScope operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A scope identifier that is neither global nor a two-letter country code
    #[error("invalid scope: {0}")]
    InvalidScope(String),

    /// Text repository failures (fetching samples, listing scopes)
    #[error("text repository error: {0}")]
    Repository(String),

    /// The remote inference service needs a credential that is not configured
    #[error("missing credential: {0} is not set")]
    MissingCredential(String),

    /// Remote inference service answered with a non-success status
    #[error("remote classifier returned status {status}: {body}")]
    RemoteStatus { status: u16, body: String },

    /// Remote inference transport or decoding failures
    #[error("remote classifier error: {0}")]
    Remote(String),

    /// Sentiment classification failed for a mood computation
    #[error("sentiment classification failed: {0}")]
    Classification(#[source] Box<Error>),

    /// Local classifier pipeline errors
    #[error("classifier error: {0}")]
    Classifier(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new invalid scope error
    pub fn invalid_scope(msg: impl Into<String>) -> Self {
        Self::InvalidScope(msg.into())
    }

    /// Create a new repository error
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }

    /// Create a new missing credential error
    pub fn missing_credential(name: impl Into<String>) -> Self {
        Self::MissingCredential(name.into())
    }

    /// Create a new remote classifier error
    pub fn remote(msg: impl Into<String>) -> Self {
        Self::Remote(msg.into())
    }

    /// Wrap an error raised while classifying a scope's samples
    pub fn classification(inner: Error) -> Self {
        Self::Classification(Box::new(inner))
    }

    /// Create a new classifier error
    pub fn classifier(msg: impl Into<String>) -> Self {
        Self::Classifier(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
