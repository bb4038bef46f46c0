//! Behavioural tests for radius queries over stored outlets.

use std::cell::RefCell;

use outlet_core::{
    Coordinates, OutletStore, ProximityError, RawOutlet, SqliteOutletStore,
    proximity::{find_within, find_within_by_distance},
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

struct ProximityWorld {
    store: SqliteOutletStore,
    matches: RefCell<Vec<String>>,
    error: RefCell<Option<ProximityError>>,
}

impl ProximityWorld {
    fn new() -> Self {
        let store = SqliteOutletStore::open_in_memory().expect("open in-memory store");
        store.create_schema().expect("create schema");
        Self {
            store,
            matches: RefCell::new(Vec::new()),
            error: RefCell::new(None),
        }
    }

    fn add(&self, name: &str, location: Option<Coordinates>) {
        self.store
            .bulk_insert(&[RawOutlet::new(name, format!("{name} street"), "", "")])
            .expect("insert outlet");
        if let Some(location) = location {
            let id = self
                .store
                .get_all()
                .expect("list outlets")
                .iter()
                .map(|outlet| outlet.id)
                .max()
                .expect("inserted outlet has an id");
            self.store
                .set_coordinates(id, location)
                .expect("record coordinates");
        }
    }

    fn record<T>(&self, result: Result<Vec<T>, ProximityError>, name: impl Fn(&T) -> String) {
        match result {
            Ok(found) => {
                self.matches.replace(found.iter().map(name).collect());
            }
            Err(err) => {
                self.error.replace(Some(err));
            }
        }
    }
}

#[fixture]
fn world() -> ProximityWorld {
    ProximityWorld::new()
}

#[given("outlet \"{name}\" at latitude {latitude} and longitude {longitude}")]
fn given_located_outlet(world: &ProximityWorld, name: String, latitude: f64, longitude: f64) {
    world.add(&name, Some(Coordinates::new(latitude, longitude)));
}

#[given("outlet \"{name}\" without coordinates")]
fn given_unlocated_outlet(world: &ProximityWorld, name: String) {
    world.add(&name, None);
}

#[when("I search within {radius} km of latitude {latitude} and longitude {longitude}")]
fn search_within(world: &ProximityWorld, radius: f64, latitude: f64, longitude: f64) {
    let origin = Coordinates::new(latitude, longitude);
    world.record(find_within(&world.store, origin, radius), |outlet| {
        outlet.name.clone()
    });
}

#[when("I search by distance within {radius} km of latitude {latitude} and longitude {longitude}")]
fn search_by_distance(world: &ProximityWorld, radius: f64, latitude: f64, longitude: f64) {
    let origin = Coordinates::new(latitude, longitude);
    world.record(
        find_within_by_distance(&world.store, origin, radius),
        |nearby| nearby.outlet.name.clone(),
    );
}

#[then("the matching outlets are \"{names}\"")]
fn then_matches(world: &ProximityWorld, names: String) {
    assert!(world.error.borrow().is_none(), "unexpected proximity error");
    let expected: Vec<_> = names.split(',').map(str::to_owned).collect();
    assert_eq!(*world.matches.borrow(), expected);
}

#[then("the search is rejected as an invalid radius")]
fn then_invalid_radius(world: &ProximityWorld) {
    assert!(matches!(
        world.error.borrow().as_ref(),
        Some(ProximityError::InvalidRadius { .. })
    ));
}

#[scenario(path = "tests/features/proximity.feature", index = 0)]
fn small_radius(world: ProximityWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/proximity.feature", index = 1)]
fn wide_radius(world: ProximityWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/proximity.feature", index = 2)]
fn distance_ordering(world: ProximityWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/proximity.feature", index = 3)]
fn negative_radius(world: ProximityWorld) {
    let _ = world;
}
