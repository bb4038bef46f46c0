//! Outlet records and the coordinate pair attached to them.

use geo::Point;
use thiserror::Error;

/// Store-assigned outlet identifier.
pub type OutletId = i64;

/// A WGS84 latitude/longitude pair in decimal degrees.
///
/// Conversions to [`geo`] types follow the crate convention of
/// `x = longitude` and `y = latitude`.
///
/// # Examples
/// ```
/// use outlet_core::Coordinates;
///
/// let klcc = Coordinates::checked(3.1579, 101.7116)?;
/// assert_eq!(klcc.to_point().x(), 101.7116);
/// # Ok::<(), outlet_core::CoordinatesError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coordinates {
    /// Degrees north of the equator.
    pub latitude: f64,
    /// Degrees east of the prime meridian.
    pub longitude: f64,
}

/// Reasons a latitude/longitude pair is rejected by [`Coordinates::checked`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoordinatesError {
    /// Latitude is non-finite or beyond a pole.
    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),
    /// Longitude is non-finite or beyond the antimeridian.
    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
}

impl Coordinates {
    /// Build a pair without range checks.
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Build a pair, rejecting non-finite or out-of-range values.
    pub fn checked(latitude: f64, longitude: f64) -> Result<Self, CoordinatesError> {
        let coordinates = Self::new(latitude, longitude);
        coordinates.validate()?;
        Ok(coordinates)
    }

    /// Check that both components are finite and within WGS84 bounds.
    pub fn validate(&self) -> Result<(), CoordinatesError> {
        // NaN fails `contains`, so non-finite values are rejected here too.
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(CoordinatesError::LatitudeOutOfRange(self.latitude));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(CoordinatesError::LongitudeOutOfRange(self.longitude));
        }
        Ok(())
    }

    /// Convert to a [`geo::Point`] with longitude as `x`.
    pub fn to_point(self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}

/// An outlet as produced by the scraper, before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawOutlet {
    /// Display name, e.g. `Subway KLCC`.
    pub name: String,
    /// Street address used for geocoding.
    pub address: String,
    /// Free-text opening hours; may be empty.
    #[cfg_attr(feature = "serde", serde(default))]
    pub operating_hours: String,
    /// Waze navigation link; may be empty.
    #[cfg_attr(feature = "serde", serde(default))]
    pub waze_link: String,
}

impl RawOutlet {
    /// Build a record from its four text fields.
    pub fn new(
        name: impl Into<String>,
        address: impl Into<String>,
        operating_hours: impl Into<String>,
        waze_link: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            operating_hours: operating_hours.into(),
            waze_link: waze_link.into(),
        }
    }

    /// Whether the record lacks the name or address needed for storage.
    ///
    /// Whitespace-only values count as blank.
    pub fn is_blank(&self) -> bool {
        self.name.trim().is_empty() || self.address.trim().is_empty()
    }
}

/// A persisted outlet.
///
/// `location` is `None` until the enricher resolves the address. Keeping
/// the pair in one `Option` means a record can never carry only a latitude
/// or only a longitude.
///
/// With the `serde` feature the record serialises to the flat wire shape
/// `{id, name, address, operating_hours, waze_link, latitude, longitude}`
/// where both coordinates are `null` for an unlocated outlet.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(into = "OutletRecord", try_from = "OutletRecord")
)]
pub struct Outlet {
    /// Unique identifier.
    pub id: OutletId,
    /// Display name.
    pub name: String,
    /// Street address.
    pub address: String,
    /// Free-text opening hours.
    pub operating_hours: String,
    /// Waze navigation link.
    pub waze_link: String,
    /// Resolved position, if geocoding has succeeded.
    pub location: Option<Coordinates>,
}

impl Outlet {
    /// Attach a store-assigned id to a raw record.
    pub fn from_raw(id: OutletId, raw: RawOutlet) -> Self {
        Self {
            id,
            name: raw.name,
            address: raw.address,
            operating_hours: raw.operating_hours,
            waze_link: raw.waze_link,
            location: None,
        }
    }

    /// Return the outlet with `location` set.
    #[must_use]
    pub fn with_location(mut self, location: Coordinates) -> Self {
        self.location = Some(location);
        self
    }

    /// Whether the outlet has coordinates.
    pub fn is_located(&self) -> bool {
        self.location.is_some()
    }
}

/// `(id, address)` of an outlet still waiting for coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnlocatedOutlet {
    /// Outlet to update once resolved.
    pub id: OutletId,
    /// Address to hand to the geocoder.
    pub address: String,
}

#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct OutletRecord {
    id: OutletId,
    name: String,
    address: String,
    operating_hours: String,
    waze_link: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

#[cfg(feature = "serde")]
impl From<Outlet> for OutletRecord {
    fn from(outlet: Outlet) -> Self {
        Self {
            id: outlet.id,
            name: outlet.name,
            address: outlet.address,
            operating_hours: outlet.operating_hours,
            waze_link: outlet.waze_link,
            latitude: outlet.location.map(|c| c.latitude),
            longitude: outlet.location.map(|c| c.longitude),
        }
    }
}

#[cfg(feature = "serde")]
impl TryFrom<OutletRecord> for Outlet {
    type Error = String;

    fn try_from(record: OutletRecord) -> Result<Self, Self::Error> {
        let location = match (record.latitude, record.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates::new(latitude, longitude)),
            (None, None) => None,
            _ => {
                return Err(format!(
                    "outlet {} must set latitude and longitude together",
                    record.id
                ));
            }
        };
        Ok(Self {
            id: record.id,
            name: record.name,
            address: record.address,
            operating_hours: record.operating_hours,
            waze_link: record.waze_link,
            location,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "1 Jalan Ampang")]
    #[case("Subway KLCC", "")]
    #[case("   ", "1 Jalan Ampang")]
    #[case("Subway KLCC", "\t\n")]
    fn blank_name_or_address_is_detected(#[case] name: &str, #[case] address: &str) {
        assert!(RawOutlet::new(name, address, "", "").is_blank());
    }

    #[rstest]
    fn populated_record_is_not_blank() {
        let raw = RawOutlet::new("Subway KLCC", "1 Jalan Ampang", "", "");
        assert!(!raw.is_blank());
    }

    #[rstest]
    #[case(90.0, 180.0)]
    #[case(-90.0, -180.0)]
    #[case(3.139, 101.6869)]
    fn checked_accepts_valid_coordinates(#[case] latitude: f64, #[case] longitude: f64) {
        assert!(Coordinates::checked(latitude, longitude).is_ok());
    }

    #[rstest]
    #[case(90.5, 0.0)]
    #[case(f64::NAN, 0.0)]
    #[case(0.0, -180.5)]
    #[case(0.0, f64::INFINITY)]
    fn checked_rejects_invalid_coordinates(#[case] latitude: f64, #[case] longitude: f64) {
        assert!(Coordinates::checked(latitude, longitude).is_err());
    }

    #[rstest]
    fn point_uses_longitude_as_x() {
        let point = Coordinates::new(3.0, 101.0).to_point();
        assert_eq!((point.x(), point.y()), (101.0, 3.0));
    }

    #[cfg(feature = "serde")]
    mod wire {
        use super::*;
        use serde_json::json;

        fn outlet() -> Outlet {
            Outlet::from_raw(
                7,
                RawOutlet::new("Subway KLCC", "1 Jalan Ampang", "8am - 10pm", "https://waze.com/ul?q=klcc"),
            )
        }

        #[rstest]
        fn unlocated_outlet_serialises_null_coordinates() {
            let value = serde_json::to_value(outlet()).expect("serialise outlet");
            assert_eq!(
                value,
                json!({
                    "id": 7,
                    "name": "Subway KLCC",
                    "address": "1 Jalan Ampang",
                    "operating_hours": "8am - 10pm",
                    "waze_link": "https://waze.com/ul?q=klcc",
                    "latitude": null,
                    "longitude": null,
                })
            );
        }

        #[rstest]
        fn located_outlet_serialises_flat_coordinates() {
            let located = outlet().with_location(Coordinates::new(3.1579, 101.7116));
            let value = serde_json::to_value(located).expect("serialise outlet");
            assert_eq!(value["latitude"], json!(3.1579));
            assert_eq!(value["longitude"], json!(101.7116));
        }

        #[rstest]
        fn half_located_record_is_rejected() {
            let payload = json!({
                "id": 1,
                "name": "n",
                "address": "a",
                "operating_hours": "",
                "waze_link": "",
                "latitude": 3.0,
                "longitude": null,
            });
            let err = serde_json::from_value::<Outlet>(payload).expect_err("half pair should fail");
            assert!(err.to_string().contains("together"));
        }

        #[rstest]
        fn raw_outlet_defaults_optional_fields() {
            let raw: RawOutlet = serde_json::from_value(json!({
                "name": "Subway Bangsar",
                "address": "Jalan Telawi",
            }))
            .expect("deserialise raw outlet");
            assert!(raw.operating_hours.is_empty());
            assert!(raw.waze_link.is_empty());
        }
    }
}
