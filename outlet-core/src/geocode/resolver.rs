//! Resolver trait and the tagged result of a single lookup.

use crate::Coordinates;

use super::error::{GeocodeError, MissingCredentialError};

/// Result of resolving one address.
#[derive(Debug, Clone, PartialEq)]
pub enum GeocodeOutcome {
    /// The best-ranked candidate position.
    Found(Coordinates),
    /// The provider definitively knows no position for the address.
    NoMatch,
    /// The lookup failed in a way that may succeed on retry.
    Transient(GeocodeError),
}

/// Resolve addresses to coordinates.
///
/// Implementations return the first candidate when the provider ranks
/// several.
///
/// # Examples
///
/// ```rust
/// use outlet_core::{Coordinates, GeocodeOutcome, GeocodeResolver};
///
/// struct Gazetteer;
///
/// impl GeocodeResolver for Gazetteer {
///     fn resolve(&self, address: &str) -> GeocodeOutcome {
///         match address {
///             "KLCC" => GeocodeOutcome::Found(Coordinates::new(3.1579, 101.7116)),
///             _ => GeocodeOutcome::NoMatch,
///         }
///     }
/// }
///
/// assert!(Gazetteer.ensure_credentials().is_ok());
/// assert_eq!(Gazetteer.resolve("Atlantis"), GeocodeOutcome::NoMatch);
/// ```
pub trait GeocodeResolver {
    /// Check that the resolver holds the credentials it needs.
    ///
    /// Called once before a batch run. Resolvers without credentials keep
    /// the default.
    fn ensure_credentials(&self) -> Result<(), MissingCredentialError> {
        Ok(())
    }

    /// Resolve `address` to a single position.
    fn resolve(&self, address: &str) -> GeocodeOutcome;
}

impl<R: GeocodeResolver + ?Sized> GeocodeResolver for &R {
    fn ensure_credentials(&self) -> Result<(), MissingCredentialError> {
        (**self).ensure_credentials()
    }

    fn resolve(&self, address: &str) -> GeocodeOutcome {
        (**self).resolve(address)
    }
}
