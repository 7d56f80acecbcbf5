// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! File-backed JSON record store.
//!
//! Each record set is one JSON array on disk (`<data_dir>/<set>.json`).
//! `load` returns a full snapshot; `save` replaces the full snapshot by
//! writing a temp file and renaming it over the old one, so a concurrent
//! reader never sees a torn file.
//!
//! The store itself provides no multi-key transactions. Callers that do a
//! load → mutate → save cycle must hold the set's lock (`lock_set`) across
//! the whole cycle; the purchase path holds the users and cars locks
//! together, always acquired in that order.

use crate::error::AppError;
use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// JSON record store rooted at a data directory.
#[derive(Clone)]
pub struct JsonStore {
    root: PathBuf,
    /// One writer lock per record set, created on first use.
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl JsonStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, AppError> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)
            .map_err(|e| AppError::Storage(format!("create {}: {e}", root.display())))?;

        Ok(Self {
            root,
            locks: Arc::new(DashMap::new()),
        })
    }

    fn set_path(&self, set: &str) -> PathBuf {
        self.root.join(format!("{set}.json"))
    }

    /// Acquire the writer lock for a record set.
    ///
    /// Hold the returned guard across an entire load → mutate → save cycle.
    pub async fn lock_set(&self, set: &str) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(set.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }

    /// Load the full snapshot of a record set.
    ///
    /// An absent or unreadable set reads as empty; only records that fail
    /// to parse surface as a storage error, since that means the file was
    /// written by something else.
    pub async fn load<T: DeserializeOwned>(&self, set: &str) -> Result<Vec<T>, AppError> {
        let path = self.set_path(set);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(_) => return Ok(Vec::new()),
        };

        serde_json::from_slice(&bytes)
            .map_err(|e| AppError::Storage(format!("parse {}: {e}", path.display())))
    }

    /// Replace the full snapshot of a record set.
    pub async fn save<T: Serialize>(&self, set: &str, records: &[T]) -> Result<(), AppError> {
        let path = self.set_path(set);
        let tmp = self.root.join(format!("{set}.json.tmp"));

        let bytes = serde_json::to_vec_pretty(records)
            .map_err(|e| AppError::Storage(format!("serialize {set}: {e}")))?;

        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| AppError::Storage(format!("write {}: {e}", tmp.display())))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| AppError::Storage(format!("rename {}: {e}", path.display())))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Rec {
        id: String,
        n: u32,
    }

    fn temp_store() -> JsonStore {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path()).unwrap();
        // Leak the tempdir so it outlives the store in these short tests.
        std::mem::forget(dir);
        store
    }

    #[tokio::test]
    async fn test_absent_set_reads_empty() {
        let store = temp_store();
        let records: Vec<Rec> = store.load("missing").await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load_roundtrip() {
        let store = temp_store();
        let records = vec![
            Rec {
                id: "a".to_string(),
                n: 1,
            },
            Rec {
                id: "b".to_string(),
                n: 2,
            },
        ];
        store.save("recs", &records).await.unwrap();

        let loaded: Vec<Rec> = store.load("recs").await.unwrap();
        assert_eq!(loaded, records);
    }

    #[tokio::test]
    async fn test_save_replaces_snapshot() {
        let store = temp_store();
        store
            .save(
                "recs",
                &[Rec {
                    id: "a".to_string(),
                    n: 1,
                }],
            )
            .await
            .unwrap();
        store
            .save(
                "recs",
                &[Rec {
                    id: "b".to_string(),
                    n: 2,
                }],
            )
            .await
            .unwrap();

        let loaded: Vec<Rec> = store.load("recs").await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, "b");
    }

    #[tokio::test]
    async fn test_lock_serializes_read_modify_write() {
        let store = temp_store();
        store.save("counter", &[Rec { id: "c".to_string(), n: 0 }]).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..10 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let _guard = store.lock_set("counter").await;
                let mut records: Vec<Rec> = store.load("counter").await.unwrap();
                records[0].n += 1;
                store.save("counter", &records).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let records: Vec<Rec> = store.load("counter").await.unwrap();
        assert_eq!(records[0].n, 10, "increments must not be lost");
    }
}
