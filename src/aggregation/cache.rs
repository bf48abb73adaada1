//! Result caching at the batch boundary.
//!
//! A batch is identified by the JSON encoding of everything that determines
//! its output. Callers cannot tell a cached result from a fresh one.
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::aggregation::error::AggregationError;
use crate::aggregation::types::{AggregateResult, BatchSettings, EffectSource};
use crate::error::CtbayesErr;
use crate::inference::InferenceEngine;
use crate::study::{Study, StudyIdentity};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BatchKey(String);

#[derive(Serialize)]
struct KeyParts<'a> {
    study: StudyIdentity<'a>,
    effects: &'a EffectSource,
    settings: &'a BatchSettings,
}

impl BatchKey {
    pub fn new<E: InferenceEngine + ?Sized>(
        study: &Study<'_, E>,
        effects: &EffectSource,
        settings: &BatchSettings,
    ) -> Result<Self, CtbayesErr> {
        let parts = KeyParts {
            study: study.identity(),
            effects,
            settings,
        };
        let encoded = serde_json::to_string(&parts).map_err(AggregationError::from)?;
        Ok(BatchKey(encoded))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 64-bit FNV-1a of the key, stable across runs and platforms
    pub fn digest(&self) -> u64 {
        self.0.bytes().fold(0xcbf29ce484222325_u64, |hash, byte| {
            (hash ^ u64::from(byte)).wrapping_mul(0x100000001b3)
        })
    }
}

pub trait SimulationCache: Send + Sync {
    fn get(&self, key: &BatchKey) -> Option<AggregateResult>;
    fn put(&self, key: &BatchKey, result: &AggregateResult);
}

#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<BatchKey, AggregateResult>>,
}

impl MemoryCache {
    /// Entries survive a panic in another holder of the lock; the map is
    /// only ever mutated by single inserts
    fn lock_entries(&self) -> MutexGuard<'_, HashMap<BatchKey, AggregateResult>> {
        self.entries.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("memory cache lock was poisoned; recovering entries");
            poisoned.into_inner()
        })
    }

    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SimulationCache for MemoryCache {
    fn get(&self, key: &BatchKey) -> Option<AggregateResult> {
        self.lock_entries().get(key).copied()
    }

    fn put(&self, key: &BatchKey, result: &AggregateResult) {
        self.lock_entries().insert(key.clone(), *result);
    }
}

#[derive(Serialize, Deserialize)]
struct CacheEntry {
    key: BatchKey,
    result: AggregateResult,
}

/// One JSON file per batch under `dir`. Unreadable or mismatched files are
/// treated as misses.
#[derive(Debug, Clone)]
pub struct JsonFileCache {
    dir: PathBuf,
}

impl JsonFileCache {
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, CtbayesErr> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|source| AggregationError::CacheDir {
            path: dir.clone(),
            source,
        })?;
        Ok(JsonFileCache { dir })
    }

    fn path_for(&self, key: &BatchKey) -> PathBuf {
        self.dir.join(format!("{:016x}.json", key.digest()))
    }
}

impl SimulationCache for JsonFileCache {
    fn get(&self, key: &BatchKey) -> Option<AggregateResult> {
        let text = fs::read_to_string(self.path_for(key)).ok()?;
        match serde_json::from_str::<CacheEntry>(&text) {
            Ok(entry) if entry.key == *key => Some(entry.result),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring corrupt cache entry");
                None
            }
        }
    }

    fn put(&self, key: &BatchKey, result: &AggregateResult) {
        let entry = CacheEntry {
            key: key.clone(),
            result: *result,
        };
        let path = self.path_for(key);
        let written = serde_json::to_string_pretty(&entry)
            .map_err(|e| e.to_string())
            .and_then(|text| fs::write(&path, text).map_err(|e| e.to_string()));
        if let Err(error) = written {
            tracing::warn!(%error, path = %path.display(), "failed to write cache entry");
        }
    }
}
