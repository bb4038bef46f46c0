//! In-memory doubles for the store and resolver traits, used by unit and
//! behaviour tests across the workspace. Built for unit tests and behind the
//! `test-support` feature.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use crate::{
    Coordinates, GeocodeOutcome, GeocodeResolver, MissingCredentialError, Outlet, OutletId,
    OutletStore, OutletStoreError, RawOutlet, UnlocatedOutlet,
};

#[derive(Debug, Default)]
struct MemoryState {
    outlets: Vec<Outlet>,
    coordinate_writes: usize,
    fail_insert_at: Option<usize>,
    fail_coordinates_for: Option<OutletId>,
}

/// In-memory `OutletStore` performing linear scans.
///
/// Identifiers continue from the largest stored id.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    /// Create a store holding `outlets` as-is, ids included.
    pub fn with_outlets<I>(outlets: I) -> Self
    where
        I: IntoIterator<Item = Outlet>,
    {
        Self {
            state: Mutex::new(MemoryState {
                outlets: outlets.into_iter().collect(),
                ..MemoryState::default()
            }),
        }
    }

    /// Make the `index`-th record of the next bulk insert fail.
    #[must_use]
    pub fn failing_insert_at(self, index: usize) -> Self {
        self.state().fail_insert_at = Some(index);
        self
    }

    /// Make every `set_coordinates` call for `id` fail.
    #[must_use]
    pub fn failing_coordinates_for(self, id: OutletId) -> Self {
        self.state().fail_coordinates_for = Some(id);
        self
    }

    /// Number of successful `set_coordinates` calls so far.
    pub fn coordinate_writes(&self) -> usize {
        self.state().coordinate_writes
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        // A panicking test thread must not hide the data from assertions.
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl OutletStore for MemoryStore {
    fn create_schema(&self) -> Result<(), OutletStoreError> {
        Ok(())
    }

    fn bulk_insert(&self, records: &[RawOutlet]) -> Result<usize, OutletStoreError> {
        let mut state = self.state();
        let fail_at = state.fail_insert_at.take();
        for (index, record) in records.iter().enumerate() {
            if fail_at == Some(index) {
                return Err(OutletStoreError::BulkInsert {
                    inserted: index,
                    attempted: records.len(),
                    source: "injected insert failure".into(),
                });
            }
            let id = state.outlets.iter().map(|o| o.id).max().unwrap_or(0) + 1;
            state.outlets.push(Outlet::from_raw(id, record.clone()));
        }
        Ok(records.len())
    }

    fn get_all(&self) -> Result<Vec<Outlet>, OutletStoreError> {
        Ok(self.state().outlets.clone())
    }

    fn get_by_id(&self, id: OutletId) -> Result<Outlet, OutletStoreError> {
        self.state()
            .outlets
            .iter()
            .find(|outlet| outlet.id == id)
            .cloned()
            .ok_or(OutletStoreError::NotFound { id })
    }

    fn search_by_name(&self, fragment: &str) -> Result<Vec<Outlet>, OutletStoreError> {
        let needle = fragment.to_ascii_lowercase();
        Ok(self
            .state()
            .outlets
            .iter()
            .filter(|outlet| outlet.name.to_ascii_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    fn get_unlocated(&self) -> Result<Vec<UnlocatedOutlet>, OutletStoreError> {
        Ok(self
            .state()
            .outlets
            .iter()
            .filter(|outlet| !outlet.is_located())
            .map(|outlet| UnlocatedOutlet {
                id: outlet.id,
                address: outlet.address.clone(),
            })
            .collect())
    }

    fn set_coordinates(
        &self,
        id: OutletId,
        coordinates: Coordinates,
    ) -> Result<(), OutletStoreError> {
        let mut state = self.state();
        if state.fail_coordinates_for == Some(id) {
            return Err(OutletStoreError::Query {
                operation: "update outlet coordinates",
                source: "injected coordinate write failure".into(),
            });
        }
        let outlet = state
            .outlets
            .iter_mut()
            .find(|outlet| outlet.id == id)
            .ok_or(OutletStoreError::NotFound { id })?;
        outlet.location = Some(coordinates);
        state.coordinate_writes += 1;
        Ok(())
    }
}

/// Resolver replaying scripted outcomes per address.
///
/// Addresses without a script, or whose script is used up, receive the
/// fallback outcome. Every call is recorded.
#[derive(Debug)]
pub struct ScriptedResolver {
    fallback: GeocodeOutcome,
    scripts: Mutex<HashMap<String, VecDeque<GeocodeOutcome>>>,
    calls: Mutex<Vec<String>>,
    has_credentials: bool,
}

impl ScriptedResolver {
    /// Answer every lookup with `outcome`.
    pub fn always(outcome: GeocodeOutcome) -> Self {
        Self {
            fallback: outcome,
            scripts: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            has_credentials: true,
        }
    }

    /// Queue `outcomes` for successive lookups of `address`.
    #[must_use]
    pub fn with_script<I>(self, address: &str, outcomes: I) -> Self
    where
        I: IntoIterator<Item = GeocodeOutcome>,
    {
        lock(&self.scripts).insert(address.to_owned(), outcomes.into_iter().collect());
        self
    }

    /// Fail the credential check.
    #[must_use]
    pub fn without_credentials(mut self) -> Self {
        self.has_credentials = false;
        self
    }

    /// Lookups made for `address` so far.
    pub fn calls_for(&self, address: &str) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|call| call.as_str() == address)
            .count()
    }

    /// Lookups made for any address.
    pub fn total_calls(&self) -> usize {
        lock(&self.calls).len()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

impl GeocodeResolver for ScriptedResolver {
    fn ensure_credentials(&self) -> Result<(), MissingCredentialError> {
        if self.has_credentials {
            Ok(())
        } else {
            Err(MissingCredentialError {
                provider: "scripted resolver".to_owned(),
            })
        }
    }

    fn resolve(&self, address: &str) -> GeocodeOutcome {
        lock(&self.calls).push(address.to_owned());
        lock(&self.scripts)
            .get_mut(address)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| self.fallback.clone())
    }
}
