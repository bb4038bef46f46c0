//! Test helpers for CLI scenarios: a scratch directory with an export file.

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;

pub(super) const SAMPLE_EXPORT: &str = r#"[
    {"name": "Subway KLCC", "address": "Suria KLCC, Kuala Lumpur", "operating_hours": "8am-10pm"},
    {"name": "Subway Bangsar", "address": "Jalan Telawi 3, Bangsar"},
    {"name": "", "address": "Jalan Tanpa Nama"}
]"#;

pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 tempdir");
        Self { _dir: dir, root }
    }

    pub(super) fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }

    pub(super) fn write(&self, name: &str, contents: &str) -> Utf8PathBuf {
        let path = self.path(name);
        fs::write(&path, contents).expect("write workspace file");
        path
    }

    pub(super) fn root(&self) -> &Utf8Path {
        &self.root
    }
}
