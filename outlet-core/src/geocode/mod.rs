//! Resolve free-form addresses to coordinates.
//!
//! The [`GeocodeResolver`] trait abstracts the external geocoding provider.
//! Each lookup yields a [`GeocodeOutcome`] that separates a definitive "no
//! match" from a transient failure, since the enricher retries only the
//! latter.

mod error;
mod resolver;

pub use error::{GeocodeError, MissingCredentialError};
pub use resolver::{GeocodeOutcome, GeocodeResolver};
