//! Google Geocoding API resolver.
//!
//! The [`GeocodeResolver`] trait is synchronous so the enricher stays a
//! plain batch loop. This resolver bridges to async HTTP by blocking on a
//! Tokio runtime it owns.

use std::time::Duration;

use outlet_core::{
    Coordinates, GeocodeError, GeocodeOutcome, GeocodeResolver, MissingCredentialError,
};
use reqwest::Client;
use thiserror::Error;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};
use url::Url;

use super::google::{GeocodeResponse, STATUS_OK, STATUS_ZERO_RESULTS};

/// Errors raised while constructing a [`GoogleGeocoder`].
#[derive(Debug, Error)]
pub enum ProviderBuildError {
    #[error("invalid geocoding base URL {base_url}")]
    BaseUrl {
        base_url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("failed to build HTTP client")]
    HttpClient(#[source] reqwest::Error),
    #[error("failed to build Tokio runtime")]
    Runtime(#[source] std::io::Error),
}

/// Default user agent for geocoding requests.
pub const DEFAULT_USER_AGENT: &str = "outlet-locator/0.1";

/// Default Google Maps Platform host.
pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com";

const GEOCODE_PATH: &str = "maps/api/geocode/json";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

const PROVIDER_NAME: &str = "Google Geocoding API";

/// Configuration for [`GoogleGeocoder`].
#[derive(Clone)]
pub struct GoogleGeocoderConfig {
    /// API key sent with every request.
    pub api_key: Option<String>,
    /// Scheme and host of the API, optionally with a path prefix.
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl std::fmt::Debug for GoogleGeocoderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleGeocoderConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl Default for GoogleGeocoderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl GoogleGeocoderConfig {
    /// Create a configuration using `api_key` against the public API.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Resolver backed by the Google Geocoding API.
///
/// # Runtime behaviour
///
/// Outside any Tokio runtime the resolver blocks on its own current-thread
/// runtime. Inside a multi-threaded runtime it uses that runtime's handle
/// with [`tokio::task::block_in_place`]. Inside a `current_thread` runtime,
/// where neither is allowed, the request runs on its own runtime from a
/// scoped worker thread while the caller's thread waits.
///
/// # Example
///
/// ```no_run
/// use outlet_core::{GeocodeOutcome, GeocodeResolver};
/// use outlet_data::{GoogleGeocoder, GoogleGeocoderConfig};
///
/// let geocoder = GoogleGeocoder::with_config(GoogleGeocoderConfig::new("my-key"))?;
/// geocoder.ensure_credentials()?;
/// if let GeocodeOutcome::Found(position) = geocoder.resolve("Suria KLCC, Kuala Lumpur") {
///     println!("{}, {}", position.latitude, position.longitude);
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct GoogleGeocoder {
    client: Client,
    config: GoogleGeocoderConfig,
    endpoint: Url,
    runtime: Runtime,
}

impl std::fmt::Debug for GoogleGeocoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleGeocoder")
            .field("config", &self.config)
            .field("endpoint", &self.endpoint.as_str())
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish_non_exhaustive()
    }
}

impl GoogleGeocoder {
    /// Create a resolver for the public API with `api_key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(GoogleGeocoderConfig::new(api_key))
    }

    /// Create a resolver with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL does not parse or the HTTP client or
    /// Tokio runtime fails to build.
    pub fn with_config(config: GoogleGeocoderConfig) -> Result<Self, ProviderBuildError> {
        let endpoint = build_endpoint(&config.base_url)?;
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(ProviderBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ProviderBuildError::Runtime)?;
        Ok(Self {
            client,
            config,
            endpoint,
            runtime,
        })
    }

    /// Geocoding endpoint without query parameters.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn request_url(&self, address: &str) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("address", address);
            if let Some(key) = &self.config.api_key {
                query.append_pair("key", key);
            }
        }
        url
    }

    async fn lookup_async(&self, address: &str) -> Result<GeocodeResponse, GeocodeError> {
        let response = self
            .client
            .get(self.request_url(address))
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(err))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(err))?;

        response
            .json()
            .await
            .map_err(|err| GeocodeError::ParseError {
                message: err.without_url().to_string(),
            })
    }

    /// Run a lookup on the owned runtime from a fresh thread, since
    /// `block_on` panics on a thread already driving a runtime.
    fn lookup_on_worker_thread(&self, address: &str) -> Result<GeocodeResponse, GeocodeError> {
        std::thread::scope(|scope| {
            scope
                .spawn(|| self.runtime.block_on(self.lookup_async(address)))
                .join()
                .unwrap_or_else(|_| {
                    Err(GeocodeError::NetworkError {
                        url: self.endpoint.to_string(),
                        message: "geocoding worker thread panicked".to_owned(),
                    })
                })
        })
    }

    /// Convert a reqwest error, dropping the request URL so the key never
    /// reaches error messages.
    fn convert_reqwest_error(&self, error: reqwest::Error) -> GeocodeError {
        let url = self.endpoint.to_string();
        let error = error.without_url();
        if error.is_timeout() {
            return GeocodeError::Timeout {
                url,
                timeout_secs: self.config.timeout.as_secs(),
            };
        }

        if let Some(status) = error.status() {
            return GeocodeError::HttpError {
                url,
                status: status.as_u16(),
                message: error.to_string(),
            };
        }

        GeocodeError::NetworkError {
            url,
            message: error.to_string(),
        }
    }
}

fn build_endpoint(base_url: &str) -> Result<Url, ProviderBuildError> {
    let invalid = |source| ProviderBuildError::BaseUrl {
        base_url: base_url.to_owned(),
        source,
    };
    let base = Url::parse(&format!("{}/", base_url.trim_end_matches('/'))).map_err(invalid)?;
    base.join(GEOCODE_PATH).map_err(invalid)
}

/// Map a decoded response onto a resolver outcome.
pub(crate) fn outcome_from_response(response: GeocodeResponse) -> GeocodeOutcome {
    match response.status.as_str() {
        STATUS_OK => match response.results.first() {
            Some(best) => {
                let location = best.geometry.location;
                match Coordinates::checked(location.lat, location.lng) {
                    Ok(coordinates) => GeocodeOutcome::Found(coordinates),
                    Err(err) => GeocodeOutcome::Transient(GeocodeError::ParseError {
                        message: err.to_string(),
                    }),
                }
            }
            None => GeocodeOutcome::NoMatch,
        },
        STATUS_ZERO_RESULTS => GeocodeOutcome::NoMatch,
        _ => GeocodeOutcome::Transient(GeocodeError::ServiceError {
            message: response.error_message.unwrap_or_default(),
            status: response.status,
        }),
    }
}

impl GeocodeResolver for GoogleGeocoder {
    fn ensure_credentials(&self) -> Result<(), MissingCredentialError> {
        match self.config.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(()),
            _ => Err(MissingCredentialError {
                provider: PROVIDER_NAME.to_owned(),
            }),
        }
    }

    /// Resolve `address` with a single API request.
    ///
    /// # Runtime requirements
    ///
    /// Inside a `current_thread` runtime the call blocks that runtime's only
    /// worker until the request completes.
    fn resolve(&self, address: &str) -> GeocodeOutcome {
        let response = match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(self.lookup_async(address)))
            }
            Ok(_) => self.lookup_on_worker_thread(address),
            Err(_) => self.runtime.block_on(self.lookup_async(address)),
        };
        match response {
            Ok(response) => outcome_from_response(response),
            Err(err) => GeocodeOutcome::Transient(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn geocoder(base_url: &str) -> GoogleGeocoder {
        GoogleGeocoder::with_config(GoogleGeocoderConfig::new("secret").with_base_url(base_url))
            .expect("geocoder should build")
    }

    fn response(json: &str) -> GeocodeResponse {
        serde_json::from_str(json).expect("valid response JSON")
    }

    #[rstest]
    #[case("https://maps.googleapis.com")]
    #[case("https://maps.googleapis.com/")]
    fn endpoint_appends_geocode_path(#[case] base_url: &str) {
        assert_eq!(
            geocoder(base_url).endpoint().as_str(),
            "https://maps.googleapis.com/maps/api/geocode/json"
        );
    }

    #[rstest]
    fn endpoint_keeps_base_path_prefix() {
        assert_eq!(
            geocoder("http://127.0.0.1:8080/proxy").endpoint().as_str(),
            "http://127.0.0.1:8080/proxy/maps/api/geocode/json"
        );
    }

    #[rstest]
    fn request_url_encodes_address_and_key() {
        let url = geocoder(DEFAULT_BASE_URL).request_url("1 Jalan Ampang, Kuala Lumpur");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("address".into(), "1 Jalan Ampang, Kuala Lumpur".into()),
                ("key".into(), "secret".into()),
            ]
        );
    }

    #[rstest]
    fn invalid_base_url_fails_to_build() {
        let err = GoogleGeocoder::with_config(GoogleGeocoderConfig::new("k").with_base_url("::"))
            .expect_err("base URL should be rejected");
        assert!(matches!(err, ProviderBuildError::BaseUrl { .. }));
    }

    #[rstest]
    #[case(None)]
    #[case(Some(String::new()))]
    #[case(Some("   ".to_owned()))]
    fn blank_or_missing_key_fails_credential_check(#[case] api_key: Option<String>) {
        let geocoder =
            GoogleGeocoder::with_config(GoogleGeocoderConfig::default().with_api_key(api_key))
                .expect("geocoder should build");
        let err = geocoder.ensure_credentials().expect_err("credential missing");
        assert_eq!(err.provider, PROVIDER_NAME);
    }

    #[rstest]
    fn present_key_passes_credential_check() {
        assert!(geocoder(DEFAULT_BASE_URL).ensure_credentials().is_ok());
    }

    #[rstest]
    fn debug_output_redacts_api_key() {
        let rendered = format!("{:?}", GoogleGeocoderConfig::new("secret"));
        assert!(!rendered.contains("secret"));
    }

    #[rstest]
    fn ok_status_takes_first_result() {
        let outcome = outcome_from_response(response(
            r#"{"status": "OK", "results": [
                {"geometry": {"location": {"lat": 3.1579, "lng": 101.7116}}},
                {"geometry": {"location": {"lat": 1.0, "lng": 1.0}}}
            ]}"#,
        ));
        assert_eq!(
            outcome,
            GeocodeOutcome::Found(Coordinates::new(3.1579, 101.7116))
        );
    }

    #[rstest]
    #[case(r#"{"status": "ZERO_RESULTS", "results": []}"#)]
    #[case(r#"{"status": "OK", "results": []}"#)]
    fn empty_answers_are_no_match(#[case] json: &str) {
        assert_eq!(outcome_from_response(response(json)), GeocodeOutcome::NoMatch);
    }

    #[rstest]
    fn failure_status_is_transient_service_error() {
        let outcome = outcome_from_response(response(
            r#"{"status": "OVER_QUERY_LIMIT", "error_message": "slow down"}"#,
        ));
        assert_eq!(
            outcome,
            GeocodeOutcome::Transient(GeocodeError::ServiceError {
                status: "OVER_QUERY_LIMIT".into(),
                message: "slow down".into(),
            })
        );
    }

    #[rstest]
    fn out_of_range_position_is_transient_parse_error() {
        let outcome = outcome_from_response(response(
            r#"{"status": "OK", "results": [
                {"geometry": {"location": {"lat": 123.0, "lng": 101.7}}}
            ]}"#,
        ));
        assert!(matches!(
            outcome,
            GeocodeOutcome::Transient(GeocodeError::ParseError { .. })
        ));
    }

    #[rstest]
    fn resolves_from_inside_current_thread_runtime() {
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .and_then(|listener| listener.local_addr())
            .expect("free local port")
            .port();
        let geocoder = geocoder(&format!("http://127.0.0.1:{port}"));
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("test runtime");

        let outcome = runtime.block_on(async { geocoder.resolve("Jalan Ampang") });

        assert!(matches!(
            outcome,
            GeocodeOutcome::Transient(GeocodeError::NetworkError { .. })
        ));
    }
}
