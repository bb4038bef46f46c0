use thiserror::Error;

/// Transient failures reported by a [`crate::GeocodeResolver`].
///
/// URLs never include query strings so API keys stay out of logs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeocodeError {
    /// The request exceeded its timeout.
    #[error("geocoding request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Endpoint without query parameters.
        url: String,
        /// Configured timeout.
        timeout_secs: u64,
    },
    /// The provider could not be reached.
    #[error("network error calling {url}: {message}")]
    NetworkError {
        /// Endpoint without query parameters.
        url: String,
        /// Transport error text.
        message: String,
    },
    /// The provider answered with a non-success HTTP status.
    #[error("HTTP {status} from {url}: {message}")]
    HttpError {
        /// Endpoint without query parameters.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Error text for the status.
        message: String,
    },
    /// The provider answered but reported a failure status.
    #[error("geocoding service returned {status}: {message}")]
    ServiceError {
        /// Provider status string, e.g. `OVER_QUERY_LIMIT`.
        status: String,
        /// Provider-supplied explanation, possibly empty.
        message: String,
    },
    /// The response body could not be decoded.
    #[error("failed to parse geocoding response: {message}")]
    ParseError {
        /// Decoder error text.
        message: String,
    },
}

/// The resolver has no usable API credential.
///
/// Raised once before a batch starts; never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing API credential for {provider}")]
pub struct MissingCredentialError {
    /// Name of the provider lacking a key.
    pub provider: String,
}
