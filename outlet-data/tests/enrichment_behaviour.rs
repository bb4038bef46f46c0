//! Behavioural tests for the coordinate enricher over a SQLite store.

use std::cell::RefCell;
use std::time::Duration;

use outlet_core::{
    Coordinates, GeocodeError, GeocodeOutcome, OutletStore, RawOutlet, SqliteOutletStore,
    test_support::ScriptedResolver,
};
use outlet_data::{EnrichError, EnrichReport, Enricher, RetryPolicy};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

struct EnrichWorld {
    store: SqliteOutletStore,
    resolver: RefCell<Option<ScriptedResolver>>,
    result: RefCell<Option<Result<EnrichReport, EnrichError>>>,
}

impl EnrichWorld {
    fn new() -> Self {
        let store = SqliteOutletStore::open_in_memory().expect("open in-memory store");
        store.create_schema().expect("create schema");
        Self {
            store,
            resolver: RefCell::new(None),
            result: RefCell::new(None),
        }
    }

    fn report(&self) -> EnrichReport {
        match self.result.borrow().as_ref() {
            Some(Ok(report)) => *report,
            Some(Err(err)) => panic!("enrichment failed: {err}"),
            None => panic!("enricher has not run"),
        }
    }

    fn with_resolver<T>(&self, f: impl FnOnce(&ScriptedResolver) -> T) -> T {
        let borrowed = self.resolver.borrow();
        f(borrowed.as_ref().expect("resolver should be configured"))
    }
}

#[fixture]
fn world() -> EnrichWorld {
    EnrichWorld::new()
}

fn found() -> GeocodeOutcome {
    GeocodeOutcome::Found(Coordinates::new(3.1390, 101.6869))
}

#[given("a store with {count} unlocated outlets")]
fn given_unlocated_outlets(world: &EnrichWorld, count: usize) {
    let records: Vec<_> = (1..=count)
        .map(|n| RawOutlet::new(format!("Subway {n}"), format!("Address {n}"), "", ""))
        .collect();
    world.store.bulk_insert(&records).expect("seed store");
}

#[given("a resolver that always finds a position")]
fn given_succeeding_resolver(world: &EnrichWorld) {
    world
        .resolver
        .replace(Some(ScriptedResolver::always(found())));
}

#[given("a resolver that always fails for \"{address}\"")]
fn given_failing_resolver(world: &EnrichWorld, address: String) {
    let failure = GeocodeOutcome::Transient(GeocodeError::Timeout {
        url: "https://maps.googleapis.com/maps/api/geocode/json".into(),
        timeout_secs: 30,
    });
    let resolver = ScriptedResolver::always(found()).with_script(
        &address,
        std::iter::repeat_n(failure, 10),
    );
    world.resolver.replace(Some(resolver));
}

#[given("a resolver without credentials")]
fn given_resolver_without_credentials(world: &EnrichWorld) {
    world
        .resolver
        .replace(Some(ScriptedResolver::always(found()).without_credentials()));
}

#[when("I run the enricher")]
fn run_enricher(world: &EnrichWorld) {
    let result = world.with_resolver(|resolver| {
        Enricher::new(resolver)
            .with_retry_policy(RetryPolicy::new(3, Duration::ZERO))
            .run(&world.store)
    });
    world.result.replace(Some(result));
}

#[then("{count} outlets are located")]
fn then_located(world: &EnrichWorld, count: usize) {
    assert_eq!(world.report().located, count);
}

#[then("no outlets remain unlocated")]
fn then_none_unlocated(world: &EnrichWorld) {
    assert!(world.store.get_unlocated().expect("list unlocated").is_empty());
}

#[then("the resolver was asked about \"{address}\" {times} times")]
fn then_asked(world: &EnrichWorld, address: String, times: usize) {
    assert_eq!(world.with_resolver(|r| r.calls_for(&address)), times);
}

#[then("only \"{address}\" remains unlocated")]
fn then_only_unlocated(world: &EnrichWorld, address: String) {
    let unlocated = world.store.get_unlocated().expect("list unlocated");
    let addresses: Vec<_> = unlocated.iter().map(|o| o.address.as_str()).collect();
    assert_eq!(addresses, vec![address.as_str()]);
}

#[then("the run fails with a missing credential")]
fn then_missing_credential(world: &EnrichWorld) {
    assert!(matches!(
        world.result.borrow().as_ref(),
        Some(Err(EnrichError::MissingCredential(_)))
    ));
}

#[then("the resolver was never called")]
fn then_never_called(world: &EnrichWorld) {
    assert_eq!(world.with_resolver(ScriptedResolver::total_calls), 0);
}

#[scenario(path = "tests/features/enrichment.feature", index = 0)]
fn all_located(world: EnrichWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/enrichment.feature", index = 1)]
fn transient_failures_skip_one_outlet(world: EnrichWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/enrichment.feature", index = 2)]
fn missing_credential(world: EnrichWorld) {
    let _ = world;
}
