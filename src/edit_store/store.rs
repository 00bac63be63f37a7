//! `EditStore`: the five operations from §4.6, backed by one JSON document
//! keyed by `file_path`, read and written atomically via
//! [`crate::config::read_json_file`] / [`crate::config::write_json_file`].

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde_json::Value;

use crate::config::{read_json_file, write_json_file};
use crate::domain::{EditCut, EditList};
use crate::error::ArchiverResult;

use super::migrate::migrate_legacy_blob;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Project,
    Global,
}

pub struct EditStore {
    path: PathBuf,
}

impl EditStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> ArchiverResult<BTreeMap<String, Value>> {
        read_json_file(&self.path)
    }

    fn save(&self, table: &BTreeMap<String, Value>) -> ArchiverResult<()> {
        write_json_file(&self.path, table)
    }

    fn record_for(table: &BTreeMap<String, Value>, file_path: &str) -> EditList {
        match table.get(file_path) {
            Some(raw) => serde_json::from_value(raw.clone())
                .ok()
                .or_else(|| migrate_legacy_blob(raw))
                .unwrap_or_default(),
            None => EditList::default(),
        }
    }

    /// Returns the project override if present and non-empty, otherwise
    /// the globals.
    pub fn read(&self, file_path: &str, project: &str) -> ArchiverResult<Vec<EditCut>> {
        let table = self.load()?;
        let record = Self::record_for(&table, file_path);
        Ok(record.effective_cuts(project).to_vec())
    }

    /// Replaces the target scope: globals if `project` is empty, otherwise
    /// that project's override.
    pub fn write(&self, file_path: &str, project: &str, cuts: Vec<EditCut>) -> ArchiverResult<()> {
        let mut table = self.load()?;
        let mut record = Self::record_for(&table, file_path);
        if project.is_empty() {
            record.global_cuts = cuts;
        } else {
            record.project_cuts.insert(project.to_string(), cuts);
        }
        table.insert(file_path.to_string(), serde_json::to_value(&record)?);
        self.save(&table)
    }

    /// `project` empty deletes the whole record; otherwise removes just
    /// that project's override.
    pub fn delete(&self, file_path: &str, project: &str) -> ArchiverResult<()> {
        let mut table = self.load()?;
        if project.is_empty() {
            table.remove(file_path);
        } else if let Some(raw) = table.get(file_path) {
            let mut record = serde_json::from_value(raw.clone())
                .ok()
                .or_else(|| migrate_legacy_blob(raw))
                .unwrap_or_default();
            record.project_cuts.remove(project);
            table.insert(file_path.to_string(), serde_json::to_value(&record)?);
        }
        self.save(&table)
    }

    /// Moves a project override to global; if `combine`, unions it with the
    /// existing globals instead of replacing them.
    pub fn promote(&self, file_path: &str, project: &str, combine: bool) -> ArchiverResult<()> {
        let mut table = self.load()?;
        let mut record = Self::record_for(&table, file_path);
        if let Some(overridden) = record.project_cuts.remove(project) {
            if combine {
                record.global_cuts.extend(overridden);
            } else {
                record.global_cuts = overridden;
            }
        }
        table.insert(file_path.to_string(), serde_json::to_value(&record)?);
        self.save(&table)
    }

    pub fn visibility(&self, file_path: &str, project: &str) -> ArchiverResult<Visibility> {
        let table = self.load()?;
        let record = Self::record_for(&table, file_path);
        let has_override = record.project_cuts.get(project).is_some_and(|cuts| !cuts.is_empty());
        Ok(if has_override { Visibility::Project } else { Visibility::Global })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cut(mark_in: u64, mark_out: u64, clip_name: &str) -> EditCut {
        EditCut { mark_in_frame: mark_in, mark_out_frame: mark_out, clip_name: clip_name.to_string() }
    }

    #[test]
    fn write_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = EditStore::new(dir.path().join("edits.json"));
        store.write("movie.mkv", "", vec![cut(0, 100, "a")]).unwrap();
        let read = store.read("movie.mkv", "").unwrap();
        assert_eq!(read, vec![cut(0, 100, "a")]);
    }

    #[test]
    fn project_override_shadows_global_until_deleted() {
        let dir = tempfile::tempdir().unwrap();
        let store = EditStore::new(dir.path().join("edits.json"));
        store.write("movie.mkv", "", vec![cut(0, 100, "g")]).unwrap();
        store.write("movie.mkv", "proj", vec![cut(10, 90, "p")]).unwrap();

        assert_eq!(store.read("movie.mkv", "proj").unwrap(), vec![cut(10, 90, "p")]);
        assert_eq!(store.visibility("movie.mkv", "proj").unwrap(), Visibility::Project);

        store.delete("movie.mkv", "proj").unwrap();
        assert_eq!(store.read("movie.mkv", "proj").unwrap(), vec![cut(0, 100, "g")]);
        assert_eq!(store.visibility("movie.mkv", "proj").unwrap(), Visibility::Global);
    }

    #[test]
    fn promote_with_combine_unions_into_global() {
        let dir = tempfile::tempdir().unwrap();
        let store = EditStore::new(dir.path().join("edits.json"));
        store.write("movie.mkv", "", vec![cut(0, 50, "g")]).unwrap();
        store.write("movie.mkv", "proj", vec![cut(60, 90, "p")]).unwrap();

        store.promote("movie.mkv", "proj", true).unwrap();

        let globals = store.read("movie.mkv", "").unwrap();
        assert_eq!(globals, vec![cut(0, 50, "g"), cut(60, 90, "p")]);
        assert_eq!(store.visibility("movie.mkv", "proj").unwrap(), Visibility::Global);
    }

    #[test]
    fn legacy_blob_migrates_on_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("edits.json");
        std::fs::write(&path, r#"{"movie.mkv": {"cuts": [[0, 10, "x"]]}}"#).unwrap();

        let store = EditStore::new(path);
        assert_eq!(store.read("movie.mkv", "").unwrap(), vec![cut(0, 10, "x")]);
    }
}
