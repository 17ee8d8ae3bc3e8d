//! Keeps the canonical participant set across restarts.
//!
//! The set is stored as a JSON array in a small key/value table. Restoring it
//! rebuilds the identifier set, so duplicates cannot creep back in.

use crate::error::StorageError;
use crate::ingest::normalize::CanonicalSet;
use common::model::participant::Participant;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

pub const PARTICIPANTS_KEY: &str = "kncci_participants_fixed";

#[derive(Clone, Debug)]
pub struct ParticipantStore {
    path: PathBuf,
}

impl ParticipantStore {
    /// Opens (or creates) the database at `path` and makes sure the table exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let store = ParticipantStore {
            path: path.as_ref().to_path_buf(),
        };
        store.connect()?.execute(
            "CREATE TABLE IF NOT EXISTS kv (key TEXT PRIMARY KEY, value TEXT NOT NULL)",
            [],
        )?;
        Ok(store)
    }

    fn connect(&self) -> Result<Connection, StorageError> {
        Ok(Connection::open(&self.path)?)
    }

    pub fn save(&self, set: &CanonicalSet) -> Result<(), StorageError> {
        let json = serde_json::to_string(set.participants())?;
        self.connect()?.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![PARTICIPANTS_KEY, json],
        )?;
        Ok(())
    }

    /// The stored set, or an empty one when nothing was saved yet.
    pub fn load(&self) -> Result<CanonicalSet, StorageError> {
        let json: Option<String> = self
            .connect()?
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                params![PARTICIPANTS_KEY],
                |row| row.get(0),
            )
            .optional()?;
        match json {
            Some(json) => {
                let participants: Vec<Participant> = serde_json::from_str(&json)?;
                Ok(CanonicalSet::restore(participants))
            }
            None => Ok(CanonicalSet::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn participant(id: &str) -> Participant {
        Participant {
            name: format!("Person {id}"),
            national_id: id.into(),
            region: "Nyeri".into(),
            course: String::new(),
            date: "2026-01-30".into(),
            issue_date: String::new(),
        }
    }

    #[test]
    fn empty_store_loads_empty_set() {
        let dir = tempfile::tempdir().unwrap();
        let store = ParticipantStore::open(dir.path().join("db.sqlite")).unwrap();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn save_then_load_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = ParticipantStore::open(dir.path().join("db.sqlite")).unwrap();
        let set = CanonicalSet::restore(vec![participant("3"), participant("1"), participant("2")]);
        store.save(&set).unwrap();

        let reopened = ParticipantStore::open(dir.path().join("db.sqlite")).unwrap();
        assert_eq!(reopened.load().unwrap(), set);
    }

    #[test]
    fn restore_drops_repeated_ids_from_stored_json() {
        let dir = tempfile::tempdir().unwrap();
        let store = ParticipantStore::open(dir.path().join("db.sqlite")).unwrap();
        let json = serde_json::to_string(&vec![participant("7"), participant(" 7 ")]).unwrap();
        store
            .connect()
            .unwrap()
            .execute(
                "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
                params![PARTICIPANTS_KEY, json],
            )
            .unwrap();

        let set = store.load().unwrap();
        assert_eq!(set.len(), 1);
        assert!(set.contains_id("7"));
    }

    #[test]
    fn corrupt_value_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = ParticipantStore::open(dir.path().join("db.sqlite")).unwrap();
        store
            .connect()
            .unwrap()
            .execute(
                "INSERT INTO kv (key, value) VALUES (?1, 'not json')",
                params![PARTICIPANTS_KEY],
            )
            .unwrap();
        assert!(matches!(store.load(), Err(StorageError::Json(_))));
    }
}
