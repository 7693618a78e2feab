use thiserror::Error;

/// Application-wide error types.
///
/// Errors fall into three groups:
/// - configuration errors, raised before any remote call is made
///   (`InvalidConfig`, `NoEntityKinds`, `OrgTypeBlocked`, `Settings`)
/// - transport errors, raised while talking to the Avni server
///   (`NetworkError`, `Timeout`, `ClientError`, `RateLimitExceeded`)
/// - remote errors, where the server answered but not with what we needed
///   (`RemoteStatus`, `UnexpectedResponse`)
///
/// # Examples
///
/// ```
/// use avniconf_core::error::AppError;
///
/// let err = AppError::RemoteStatus { status: 409, body: "duplicate".to_string() };
/// assert_eq!(err.status_code(), 409);
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// The configuration document is malformed.
    ///
    /// Raised for non-mapping input, records that fail to deserialize,
    /// and string booleans that are neither `true` nor `false`.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The configuration document has no known entity kinds.
    #[error("No configuration provided")]
    NoEntityKinds,

    /// The target organisation type does not allow automatic configuration.
    #[error("Automatic configuration is not supported for {0} organisations")]
    OrgTypeBlocked(String),

    /// The settings file could not be read or parsed.
    #[error("Settings error: {0}")]
    Settings(String),

    /// HTTP client request failed.
    ///
    /// This error occurs when a request cannot be built or its body
    /// cannot be read.
    #[error("API Client error: {0}")]
    ClientError(String),

    /// The server answered with a non-2xx status.
    ///
    /// The body is preserved verbatim for diagnostics.
    #[error("HTTP {status}: {body}")]
    RemoteStatus { status: u16, body: String },

    /// The server answered 2xx with a body shape we cannot interpret.
    #[error("Unexpected response format: {0}")]
    UnexpectedResponse(String),

    /// JSON serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Network or connection error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Request timeout.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded. Please wait and try again.")]
    RateLimitExceeded,

    /// Generic application error for cases not covered by specific variants.
    ///
    /// Use this sparingly - prefer creating specific error variants
    /// for better error handling and debugging.
    #[error("Error: {0}")]
    Generic(String),
}

impl AppError {
    /// Returns a user-friendly error message suitable for CLI output.
    pub fn user_message(&self) -> String {
        match self {
            AppError::NoEntityKinds => {
                "The configuration has no entity kinds.\n   Expected at least one of: addressLevelTypes, locations, catchments, subjectTypes, programs, encounterTypes".to_string()
            }
            AppError::OrgTypeBlocked(org_type) => {
                format!(
                    "We do not support automatic configurations for {} organisation types.\n   Use a trial or staging organisation instead.",
                    org_type
                )
            }
            AppError::RemoteStatus { status: 401, .. } | AppError::RemoteStatus { status: 403, .. } => {
                "The Avni server rejected the credentials.\n   Check your AVNI_AUTH_TOKEN environment variable.".to_string()
            }
            AppError::ClientError(msg) => {
                if msg.contains("timeout") || msg.contains("timed out") {
                    "Request timed out. The server may be slow or unreachable.\n   Try again later or check the base URL.".to_string()
                } else if msg.contains("connect") {
                    format!("Cannot connect to server: {}\n   Check your internet connection and the base URL.", msg)
                } else {
                    format!("API error: {}", msg)
                }
            }
            AppError::InvalidUrl(url) => {
                format!(
                    "Invalid base URL: {}\n   Example: https://staging.avniproject.org",
                    url
                )
            }
            AppError::NetworkError(msg) => {
                format!("Network error: {}\n   Check your internet connection.", msg)
            }
            AppError::Timeout(secs) => {
                format!("Request timed out after {} seconds.\n   The server may be overloaded. Try again later.", secs)
            }
            AppError::RateLimitExceeded => {
                "Too many requests. Please wait a moment and try again.".to_string()
            }
            _ => self.to_string(),
        }
    }

    /// Returns true if this error is retryable.
    ///
    /// # Examples
    ///
    /// ```
    /// use avniconf_core::error::AppError;
    ///
    /// // Network errors are retryable
    /// let err = AppError::NetworkError("connection reset".to_string());
    /// assert!(err.is_retryable());
    ///
    /// // Server errors are retryable, client errors are not
    /// assert!(AppError::RemoteStatus { status: 503, body: String::new() }.is_retryable());
    /// assert!(!AppError::RemoteStatus { status: 400, body: String::new() }.is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::RemoteStatus { status, .. } => *status >= 500,
            AppError::NetworkError(_) | AppError::Timeout(_) | AppError::RateLimitExceeded => true,
            _ => false,
        }
    }

    /// Returns true for errors detected before any remote call.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            AppError::InvalidConfig(_)
                | AppError::NoEntityKinds
                | AppError::OrgTypeBlocked(_)
                | AppError::Settings(_)
        )
    }

    /// HTTP status to report for this error.
    ///
    /// Remote status errors carry the server's status; everything else
    /// happened on our side of the wire and reports 500.
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::RemoteStatus { status, .. } => *status,
            AppError::RateLimitExceeded => 429,
            _ => 500,
        }
    }
}
