//! Producers of raw outlet records.

use std::io::Read;

use camino::{Utf8Path, Utf8PathBuf};
use outlet_core::RawOutlet;
use thiserror::Error;

/// Errors raised while producing raw records.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read outlet records from {path}")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse outlet records in {path}")]
    Parse {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Something that yields raw outlet records, such as a scraper or an export.
pub trait RawOutletSource {
    fn produce_raw_records(&self) -> Result<Vec<RawOutlet>, SourceError>;
}

impl<S: RawOutletSource + ?Sized> RawOutletSource for &S {
    fn produce_raw_records(&self) -> Result<Vec<RawOutlet>, SourceError> {
        (**self).produce_raw_records()
    }
}

impl RawOutletSource for Vec<RawOutlet> {
    fn produce_raw_records(&self) -> Result<Vec<RawOutlet>, SourceError> {
        Ok(self.clone())
    }
}

/// Reads a JSON array of raw records from a file.
///
/// Each element needs `name` and `address`; `operating_hours` and
/// `waze_link` default to empty strings.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: Utf8PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

impl RawOutletSource for JsonFileSource {
    fn produce_raw_records(&self) -> Result<Vec<RawOutlet>, SourceError> {
        let read_error = |source| SourceError::Read {
            path: self.path.clone(),
            source,
        };
        let mut file = outlet_fs::open_utf8_file(&self.path).map_err(read_error)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents).map_err(read_error)?;
        serde_json::from_str(&contents).map_err(|source| SourceError::Parse {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::fs;
    use tempfile::TempDir;

    fn write_source(dir: &TempDir, contents: &str) -> Utf8PathBuf {
        let path = dir.path().join("outlets.json");
        fs::write(&path, contents).expect("write source file");
        Utf8PathBuf::from_path_buf(path).expect("utf-8 temp path")
    }

    #[rstest]
    fn reads_records_with_optional_fields() {
        let dir = TempDir::new().expect("temp dir");
        let path = write_source(
            &dir,
            r#"[
                {"name": "Subway KLCC", "address": "Jalan Ampang",
                 "operating_hours": "8am-10pm", "waze_link": "https://waze.com/ul/klcc"},
                {"name": "Subway Bangsar", "address": "Jalan Telawi"}
            ]"#,
        );

        let records = JsonFileSource::new(path)
            .produce_raw_records()
            .expect("read records");

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].operating_hours, "8am-10pm");
        assert_eq!(records[1].waze_link, "");
    }

    #[rstest]
    fn missing_file_reports_read_error() {
        let dir = TempDir::new().expect("temp dir");
        let path = Utf8PathBuf::from_path_buf(dir.path().join("absent.json")).expect("utf-8 path");

        let err = JsonFileSource::new(path.clone())
            .produce_raw_records()
            .expect_err("missing file");

        assert!(matches!(err, SourceError::Read { path: p, .. } if p == path));
    }

    #[rstest]
    #[case("not json")]
    #[case(r#"{"name": "Subway"}"#)]
    #[case(r#"[{"name": "Subway"}]"#)]
    fn malformed_contents_report_parse_error(#[case] contents: &str) {
        let dir = TempDir::new().expect("temp dir");
        let path = write_source(&dir, contents);

        let err = JsonFileSource::new(path)
            .produce_raw_records()
            .expect_err("malformed source");

        assert!(matches!(err, SourceError::Parse { .. }));
    }
}
