//! Load raw outlet records into the store.
//!
//! Records whose name or address is blank are dropped before storage. A
//! bulk insert that stops part way is reported, not propagated, so the rows
//! stored before the failure are still counted.

mod source;

use log::{info, warn};
use outlet_core::{OutletStore, OutletStoreError, RawOutlet};
use thiserror::Error;

pub use source::{JsonFileSource, RawOutletSource, SourceError};

/// Counts from one ingestion run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IngestReport {
    /// Records produced by the source.
    pub received: usize,
    /// Records dropped for a blank name or address.
    pub discarded: usize,
    /// Records stored.
    pub inserted: usize,
}

/// Errors that abort an ingestion run.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to produce raw outlet records")]
    Source(#[from] SourceError),
    #[error("failed to prepare the outlet store")]
    Schema(#[source] OutletStoreError),
    #[error("failed to store outlet records")]
    Store(#[source] OutletStoreError),
}

/// Drop records that lack a usable name or address.
pub fn discard_blank(records: Vec<RawOutlet>) -> Vec<RawOutlet> {
    records
        .into_iter()
        .filter(|record| !record.is_blank())
        .collect()
}

/// Produce records from `source`, clean them and store them.
///
/// # Examples
/// ```
/// use outlet_core::{OutletStore, RawOutlet, test_support::MemoryStore};
/// use outlet_data::ingest;
///
/// let records = vec![
///     RawOutlet::new("Subway KLCC", "Jalan Ampang", "", ""),
///     RawOutlet::new("  ", "Jalan Telawi", "", ""),
/// ];
/// let store = MemoryStore::default();
/// let report = ingest(&records, &store)?;
/// assert_eq!((report.received, report.discarded, report.inserted), (2, 1, 1));
/// # Ok::<(), outlet_data::IngestError>(())
/// ```
pub fn ingest(
    source: &dyn RawOutletSource,
    store: &dyn OutletStore,
) -> Result<IngestReport, IngestError> {
    let records = source.produce_raw_records()?;
    let received = records.len();
    let cleaned = discard_blank(records);
    let discarded = received - cleaned.len();
    if discarded > 0 {
        info!("discarded {discarded} outlet records with a blank name or address");
    }

    store.create_schema().map_err(IngestError::Schema)?;

    let inserted = match store.bulk_insert(&cleaned) {
        Ok(inserted) => inserted,
        Err(OutletStoreError::BulkInsert {
            inserted,
            attempted,
            source,
        }) => {
            warn!("stored {inserted} of {attempted} outlet records before a failure: {source}");
            inserted
        }
        Err(other) => return Err(IngestError::Store(other)),
    };
    info!("stored {inserted} outlet records");

    Ok(IngestReport {
        received,
        discarded,
        inserted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use outlet_core::test_support::MemoryStore;
    use rstest::{fixture, rstest};

    #[fixture]
    fn records() -> Vec<RawOutlet> {
        vec![
            RawOutlet::new("Subway KLCC", "Jalan Ampang", "8am-10pm", ""),
            RawOutlet::new("", "Jalan Telawi", "", ""),
            RawOutlet::new("Subway Mid Valley", "   ", "", ""),
            RawOutlet::new("Subway Bangsar", "Jalan Telawi 3", "", ""),
        ]
    }

    #[rstest]
    fn discard_blank_keeps_complete_records_in_order(records: Vec<RawOutlet>) {
        let kept = discard_blank(records);
        let names: Vec<_> = kept.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Subway KLCC", "Subway Bangsar"]);
    }

    #[rstest]
    fn ingest_stores_only_complete_records(records: Vec<RawOutlet>) {
        let store = MemoryStore::default();

        let report = ingest(&records, &store).expect("ingest succeeds");

        assert_eq!(
            report,
            IngestReport {
                received: 4,
                discarded: 2,
                inserted: 2,
            }
        );
        let stored = store.get_all().expect("list outlets");
        assert_eq!(stored.len(), 2);
        assert!(stored.iter().all(|outlet| outlet.location.is_none()));
    }

    #[rstest]
    fn partial_bulk_insert_is_reported_not_fatal(records: Vec<RawOutlet>) {
        let store = MemoryStore::default().failing_insert_at(1);

        let report = ingest(&records, &store).expect("ingest reports partial insert");

        assert_eq!(report.inserted, 1);
        assert_eq!(store.get_all().expect("list outlets").len(), 1);
    }

    #[rstest]
    fn empty_source_still_creates_schema() {
        let store = MemoryStore::default();
        let report = ingest(&Vec::<RawOutlet>::new(), &store).expect("ingest succeeds");
        assert_eq!(report, IngestReport::default());
    }
}
