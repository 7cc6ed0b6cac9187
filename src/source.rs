//! Collaborator interfaces for obtaining and caching the rule set.
//!
//! The core never performs I/O itself: a [`ListSource`] hands over the raw
//! list text and a [`SnapshotCache`] stores parsed snapshots between runs.
//! Expiry is owned by the cache implementation and opaque here.

use std::collections::HashMap;
use std::sync::Mutex;

use log::debug;

use crate::error::Result;
use crate::rules::RuleSet;

/// Producer of the raw Public Suffix List text: an HTTP client in
/// production, a file or a fixture in tests.
///
/// Implementations report failures as
/// [`Error::UnableToLoadList`](crate::Error::UnableToLoadList).
pub trait ListSource {
    /// Fetches the list text behind `uri`.
    fn get(&self, uri: &str) -> Result<String>;
}

/// Key/value store for rule-set snapshots.
pub trait SnapshotCache {
    /// The snapshot stored under `uri`, if any.
    fn fetch(&self, uri: &str) -> Option<String>;

    /// Stores `snapshot` under `uri`; reports whether the write took.
    fn store(&self, uri: &str, snapshot: &str) -> bool;
}

/// An in-memory cache without expiry, for tests and one-shot tools.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotCache for MemoryCache {
    fn fetch(&self, uri: &str) -> Option<String> {
        self.entries.lock().ok()?.get(uri).cloned()
    }

    fn store(&self, uri: &str, snapshot: &str) -> bool {
        match self.entries.lock() {
            Ok(mut entries) => {
                entries.insert(uri.to_string(), snapshot.to_string());
                true
            }
            Err(_) => false,
        }
    }
}

/// Loads the rule set for `uri`, preferring a cached snapshot and filling
/// the cache after a fetch. A corrupt snapshot falls back to the source
/// instead of failing the load.
pub fn load_rules(
    source: &dyn ListSource,
    cache: &dyn SnapshotCache,
    uri: &str,
) -> Result<RuleSet> {
    if let Some(snapshot) = cache.fetch(uri) {
        match RuleSet::from_snapshot(&snapshot) {
            Ok(rules) => {
                debug!("rule set for {uri} served from cache");
                return Ok(rules);
            }
            Err(err) => debug!("cached snapshot for {uri} is unusable: {err}"),
        }
    }
    let text = source.get(uri)?;
    let rules = RuleSet::from_text(&text)?;
    if !cache.store(uri, &rules.to_snapshot()) {
        debug!("snapshot for {uri} could not be cached");
    }
    Ok(rules)
}
