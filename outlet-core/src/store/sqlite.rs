//! SQLite-backed outlet store.

use std::{
    fmt,
    sync::{Mutex, MutexGuard},
};

use camino::Utf8Path;
use log::debug;
use rusqlite::{Connection, OptionalExtension, Row};

use crate::{Coordinates, Outlet, OutletId, RawOutlet, UnlocatedOutlet};

use super::{BoxError, OutletStore, OutletStoreError};

const SELECT_OUTLET_COLUMNS: &str =
    "SELECT id, name, address, operating_hours, waze_link, latitude, longitude FROM outlets";

/// Outlet store persisted in a single SQLite table.
///
/// The connection sits behind a mutex so one store can be shared between
/// threads; each operation holds the lock for a single statement or, for
/// [`OutletStore::bulk_insert`], a single transaction.
pub struct SqliteOutletStore {
    connection: Mutex<Connection>,
    location: String,
}

impl fmt::Debug for SqliteOutletStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteOutletStore")
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

impl SqliteOutletStore {
    /// Open or create the database at `path`, creating parent directories.
    ///
    /// The schema is not created here; call [`OutletStore::create_schema`].
    pub fn open(path: &Utf8Path) -> Result<Self, OutletStoreError> {
        let storage_init = |source: BoxError| OutletStoreError::StorageInit {
            location: path.to_string(),
            source,
        };

        outlet_fs::ensure_parent_dir(path).map_err(|source| storage_init(source.into()))?;
        let connection =
            Connection::open(path.as_std_path()).map_err(|source| storage_init(source.into()))?;
        debug!("opened outlet database at {path}");

        Ok(Self {
            connection: Mutex::new(connection),
            location: path.to_string(),
        })
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self, OutletStoreError> {
        let connection =
            Connection::open_in_memory().map_err(|source| OutletStoreError::StorageInit {
                location: ":memory:".to_owned(),
                source: Box::new(source),
            })?;
        Ok(Self {
            connection: Mutex::new(connection),
            location: ":memory:".to_owned(),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, OutletStoreError> {
        self.connection
            .lock()
            .map_err(|err| OutletStoreError::Query {
                operation: "acquire the connection",
                source: err.to_string().into(),
            })
    }

    fn query_outlets(
        &self,
        operation: &'static str,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<Outlet>, OutletStoreError> {
        let connection = self.lock()?;
        let mut statement = connection.prepare(sql).map_err(query_error(operation))?;
        let rows = statement
            .query_map(params, outlet_from_row)
            .map_err(query_error(operation))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(query_error(operation))
    }
}

fn query_error(operation: &'static str) -> impl FnOnce(rusqlite::Error) -> OutletStoreError {
    move |source| OutletStoreError::Query {
        operation,
        source: Box::new(source),
    }
}

fn outlet_from_row(row: &Row<'_>) -> rusqlite::Result<Outlet> {
    let latitude: Option<f64> = row.get(5)?;
    let longitude: Option<f64> = row.get(6)?;
    let location = match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => Some(Coordinates::new(latitude, longitude)),
        _ => None,
    };

    Ok(Outlet {
        id: row.get(0)?,
        name: row.get(1)?,
        address: row.get(2)?,
        operating_hours: row.get(3)?,
        waze_link: row.get(4)?,
        location,
    })
}

impl OutletStore for SqliteOutletStore {
    fn create_schema(&self) -> Result<(), OutletStoreError> {
        let connection = self.lock()?;
        connection
            .execute(
                "CREATE TABLE IF NOT EXISTS outlets (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    address TEXT NOT NULL,
                    operating_hours TEXT NOT NULL,
                    waze_link TEXT NOT NULL,
                    latitude REAL,
                    longitude REAL,
                    CHECK ((latitude IS NULL) = (longitude IS NULL))
                )",
                [],
            )
            .map(|_| ())
            .map_err(|source| OutletStoreError::StorageInit {
                location: self.location.clone(),
                source: Box::new(source),
            })
    }

    fn bulk_insert(&self, records: &[RawOutlet]) -> Result<usize, OutletStoreError> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut connection = self.lock()?;
        let transaction = connection
            .transaction()
            .map_err(query_error("begin the insert transaction"))?;

        let mut inserted = 0;
        let failure = {
            let mut statement = transaction
                .prepare(
                    "INSERT INTO outlets (name, address, operating_hours, waze_link)
                     VALUES (?1, ?2, ?3, ?4)",
                )
                .map_err(query_error("prepare the insert statement"))?;

            let mut failure = None;
            for record in records {
                match statement.execute((
                    &record.name,
                    &record.address,
                    &record.operating_hours,
                    &record.waze_link,
                )) {
                    Ok(_) => inserted += 1,
                    Err(source) => {
                        failure = Some(source);
                        break;
                    }
                }
            }
            failure
        };

        let Some(source) = failure else {
            transaction
                .commit()
                .map_err(query_error("commit the insert transaction"))?;
            return Ok(inserted);
        };

        // Some errors abort the whole transaction; nothing is left to commit.
        if transaction.is_autocommit() {
            return Err(OutletStoreError::BulkInsert {
                inserted: 0,
                attempted: records.len(),
                source: Box::new(source),
            });
        }

        // Rows before a failure are kept rather than rolled back.
        transaction
            .commit()
            .map_err(query_error("commit the insert transaction"))?;
        Err(OutletStoreError::BulkInsert {
            inserted,
            attempted: records.len(),
            source: Box::new(source),
        })
    }

    fn get_all(&self) -> Result<Vec<Outlet>, OutletStoreError> {
        self.query_outlets(
            "list outlets",
            &format!("{SELECT_OUTLET_COLUMNS} ORDER BY id"),
            [],
        )
    }

    fn get_by_id(&self, id: OutletId) -> Result<Outlet, OutletStoreError> {
        let connection = self.lock()?;
        connection
            .query_row(
                &format!("{SELECT_OUTLET_COLUMNS} WHERE id = ?1"),
                [id],
                outlet_from_row,
            )
            .optional()
            .map_err(query_error("fetch an outlet"))?
            .ok_or(OutletStoreError::NotFound { id })
    }

    fn search_by_name(&self, fragment: &str) -> Result<Vec<Outlet>, OutletStoreError> {
        // `instr` avoids LIKE wildcard escaping; `lower` folds ASCII only.
        self.query_outlets(
            "search outlets by name",
            &format!("{SELECT_OUTLET_COLUMNS} WHERE instr(lower(name), lower(?1)) > 0 ORDER BY id"),
            [fragment],
        )
    }

    fn get_unlocated(&self) -> Result<Vec<UnlocatedOutlet>, OutletStoreError> {
        let operation = "list unlocated outlets";
        let connection = self.lock()?;
        let mut statement = connection
            .prepare(
                "SELECT id, address FROM outlets
                 WHERE latitude IS NULL OR longitude IS NULL
                 ORDER BY id",
            )
            .map_err(query_error(operation))?;
        let rows = statement
            .query_map([], |row| {
                Ok(UnlocatedOutlet {
                    id: row.get(0)?,
                    address: row.get(1)?,
                })
            })
            .map_err(query_error(operation))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(query_error(operation))
    }

    fn set_coordinates(
        &self,
        id: OutletId,
        coordinates: Coordinates,
    ) -> Result<(), OutletStoreError> {
        let connection = self.lock()?;
        let changed = connection
            .execute(
                "UPDATE outlets SET latitude = ?1, longitude = ?2 WHERE id = ?3",
                (coordinates.latitude, coordinates.longitude, id),
            )
            .map_err(query_error("update outlet coordinates"))?;
        if changed == 0 {
            return Err(OutletStoreError::NotFound { id });
        }
        Ok(())
    }
}
