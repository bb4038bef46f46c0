//! Fill in coordinates for stored outlets that lack them.
//!
//! The [`Enricher`] asks a [`GeocodeResolver`] for each unlocated outlet's
//! address, retrying transient failures with a fixed delay, and writes each
//! successful result with a single [`OutletStore::set_coordinates`] call.
//! Per-record failures are logged and counted; only a missing credential or
//! a failure to list unlocated outlets stops the run.

use std::fmt;
use std::thread;
use std::time::Duration;

use log::{debug, info, warn};
use outlet_core::{
    GeocodeOutcome, GeocodeResolver, MissingCredentialError, OutletStore, OutletStoreError,
    UnlocatedOutlet,
};
use thiserror::Error;

/// Default number of resolution attempts per outlet.
pub const DEFAULT_ATTEMPTS: u32 = 3;

/// Default pause between attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// How many times to try each address and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    attempts: u32,
    delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Build a policy; zero attempts is raised to one.
    #[must_use]
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            delay,
        }
    }

    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

/// What to do when the resolver reports that an address has no match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoMatchPolicy {
    /// Give up on the outlet straight away.
    #[default]
    Stop,
    /// Treat the answer like a transient failure and try again.
    Retry,
}

/// Counters from one enrichment run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EnrichReport {
    /// Outlets that lacked coordinates at the start of the run.
    pub pending: usize,
    /// Outlets whose coordinates were written.
    pub located: usize,
    /// Outlets the resolver had no position for.
    pub no_match: usize,
    /// Outlets still failing after every attempt.
    pub exhausted: usize,
    /// Resolved outlets whose coordinates could not be written.
    pub write_failures: usize,
}

/// Errors that abort an enrichment run.
#[derive(Debug, Error)]
pub enum EnrichError {
    #[error(transparent)]
    MissingCredential(#[from] MissingCredentialError),
    #[error("failed to list outlets without coordinates")]
    Store(#[source] OutletStoreError),
}

enum RecordOutcome {
    Located,
    NoMatch,
    Exhausted,
    WriteFailed,
}

type Sleeper = Box<dyn Fn(Duration) + Send + Sync>;

/// Batch geocoder over an [`OutletStore`].
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use outlet_core::{
///     Coordinates, GeocodeOutcome, OutletStore, RawOutlet,
///     test_support::{MemoryStore, ScriptedResolver},
/// };
/// use outlet_data::{Enricher, RetryPolicy};
///
/// let store = MemoryStore::default();
/// store.bulk_insert(&[RawOutlet::new("Subway KLCC", "Jalan Ampang", "", "")])?;
/// let resolver =
///     ScriptedResolver::always(GeocodeOutcome::Found(Coordinates::new(3.1579, 101.7116)));
///
/// let report = Enricher::new(&resolver)
///     .with_retry_policy(RetryPolicy::new(3, Duration::ZERO))
///     .run(&store)?;
/// assert_eq!(report.located, 1);
/// assert!(store.get_unlocated()?.is_empty());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Enricher<R> {
    resolver: R,
    retry: RetryPolicy,
    no_match: NoMatchPolicy,
    sleep: Sleeper,
}

impl<R: fmt::Debug> fmt::Debug for Enricher<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Enricher")
            .field("resolver", &self.resolver)
            .field("retry", &self.retry)
            .field("no_match", &self.no_match)
            .finish_non_exhaustive()
    }
}

impl<R: GeocodeResolver> Enricher<R> {
    /// Create an enricher with the default retry and no-match policies.
    pub fn new(resolver: R) -> Self {
        Self {
            resolver,
            retry: RetryPolicy::default(),
            no_match: NoMatchPolicy::default(),
            sleep: Box::new(thread::sleep),
        }
    }

    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn with_no_match_policy(mut self, policy: NoMatchPolicy) -> Self {
        self.no_match = policy;
        self
    }

    /// Replace the function used to wait between attempts.
    #[must_use]
    pub fn with_sleeper(mut self, sleep: impl Fn(Duration) + Send + Sync + 'static) -> Self {
        self.sleep = Box::new(sleep);
        self
    }

    /// Resolve every unlocated outlet in `store`.
    ///
    /// # Errors
    ///
    /// Returns [`EnrichError::MissingCredential`] before touching the store
    /// when the resolver has no credential, and [`EnrichError::Store`] when
    /// the unlocated outlets cannot be listed.
    pub fn run(&self, store: &dyn OutletStore) -> Result<EnrichReport, EnrichError> {
        self.resolver.ensure_credentials()?;

        let pending = store.get_unlocated().map_err(EnrichError::Store)?;
        let mut report = EnrichReport {
            pending: pending.len(),
            ..EnrichReport::default()
        };
        if pending.is_empty() {
            info!("no outlets to geocode; every address already has coordinates");
            return Ok(report);
        }
        info!("geocoding {} outlets", pending.len());

        for outlet in &pending {
            match self.enrich_one(store, outlet) {
                RecordOutcome::Located => report.located += 1,
                RecordOutcome::NoMatch => report.no_match += 1,
                RecordOutcome::Exhausted => report.exhausted += 1,
                RecordOutcome::WriteFailed => report.write_failures += 1,
            }
        }

        info!(
            "geocoding finished: {} located, {} without match, {} exhausted, {} write failures",
            report.located, report.no_match, report.exhausted, report.write_failures
        );
        Ok(report)
    }

    fn enrich_one(&self, store: &dyn OutletStore, outlet: &UnlocatedOutlet) -> RecordOutcome {
        let attempts = self.retry.attempts();
        for attempt in 1..=attempts {
            debug!(
                "geocoding outlet {}: {} (attempt {attempt} of {attempts})",
                outlet.id, outlet.address
            );
            match self.resolver.resolve(&outlet.address) {
                GeocodeOutcome::Found(coordinates) => {
                    return match store.set_coordinates(outlet.id, coordinates) {
                        Ok(()) => {
                            info!(
                                "located outlet {} at ({}, {})",
                                outlet.id, coordinates.latitude, coordinates.longitude
                            );
                            RecordOutcome::Located
                        }
                        Err(err) => {
                            warn!("failed to store coordinates for outlet {}: {err}", outlet.id);
                            RecordOutcome::WriteFailed
                        }
                    };
                }
                GeocodeOutcome::NoMatch => {
                    warn!("no geocoding match for outlet {}: {}", outlet.id, outlet.address);
                    if self.no_match == NoMatchPolicy::Stop {
                        return RecordOutcome::NoMatch;
                    }
                }
                GeocodeOutcome::Transient(err) => {
                    warn!(
                        "geocoding outlet {} failed on attempt {attempt}: {err}",
                        outlet.id
                    );
                }
            }
            if attempt < attempts {
                (self.sleep)(self.retry.delay());
            }
        }
        warn!(
            "giving up on outlet {} after {attempts} attempts",
            outlet.id
        );
        RecordOutcome::Exhausted
    }
}
