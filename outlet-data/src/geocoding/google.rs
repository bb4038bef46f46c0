//! Google Geocoding API response types.
//!
//! Only the fields the resolver reads are modelled.
//!
//! See: <https://developers.google.com/maps/documentation/geocoding/requests-geocoding>

use serde::Deserialize;

/// Status reported when the request succeeded.
pub const STATUS_OK: &str = "OK";

/// Status reported when the address is valid but unknown.
pub const STATUS_ZERO_RESULTS: &str = "ZERO_RESULTS";

/// Geocoding API response.
#[derive(Debug, Deserialize)]
pub struct GeocodeResponse {
    /// Status code such as `"OK"`, `"ZERO_RESULTS"`, `"OVER_QUERY_LIMIT"` or
    /// `"REQUEST_DENIED"`.
    pub status: String,

    /// Candidates ranked best first.
    #[serde(default)]
    pub results: Vec<GeocodeResult>,

    /// Explanation accompanying a failure status.
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeResult {
    pub geometry: Geometry,
}

#[derive(Debug, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialise_success_response() {
        let json = r#"{
            "results": [
                {"geometry": {"location": {"lat": 3.1579, "lng": 101.7116}},
                 "formatted_address": "Kuala Lumpur City Centre"},
                {"geometry": {"location": {"lat": 3.0, "lng": 101.0}}}
            ],
            "status": "OK"
        }"#;

        let response: GeocodeResponse = serde_json::from_str(json).expect("should deserialise");

        assert_eq!(response.status, STATUS_OK);
        assert_eq!(response.results.len(), 2);
        assert_eq!(response.results[0].geometry.location.lat, 3.1579);
        assert_eq!(response.results[0].geometry.location.lng, 101.7116);
    }

    #[test]
    fn deserialise_error_response_without_results() {
        let json = r#"{
            "error_message": "The provided API key is invalid.",
            "status": "REQUEST_DENIED"
        }"#;

        let response: GeocodeResponse = serde_json::from_str(json).expect("should deserialise");

        assert_eq!(response.status, "REQUEST_DENIED");
        assert!(response.results.is_empty());
        assert_eq!(
            response.error_message.as_deref(),
            Some("The provided API key is invalid.")
        );
    }
}
