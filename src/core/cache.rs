use std::path::Path;
use parking_lot::RwLock;
use tracing::{debug, trace};
use crate::core::config::{Config, KeysScope};
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::stats::CacheStats;
use crate::core::types::{DisplayFormatter, Value, ValueFormatter, ValueRef};
use crate::search::engine;
use crate::search::history::SearchHistory;
use crate::search::query::{TextRemove, TextSearch};
use crate::storage::snapshot::{self, SnapshotFormat, SnapshotRecord};
use crate::store::fulltext::FullTextStore;
use crate::store::plain::PlainStore;

/// Everything guarded by the cache lock. A key lives in at most one store.
#[derive(Debug)]
struct CacheState {
    size: usize,
    plain: PlainStore,
    full_text: FullTextStore,
}

impl CacheState {
    fn new() -> Self {
        CacheState {
            size: 0,
            plain: PlainStore::new(),
            full_text: FullTextStore::new(),
        }
    }

    fn contains(&self, key: &str) -> bool {
        self.full_text.contains(key) || self.plain.contains(key)
    }

    fn remove(&mut self, key: &str) -> Option<Value> {
        let removed = match self.plain.remove(key) {
            Some(value) => Some(value),
            None => self.full_text.remove(key).map(Value::Text),
        };
        if removed.is_some() {
            self.size -= 1;
        }
        removed
    }

    /// Replaces any entry for `key` with the new one. `text` is the
    /// formatted value when the entry goes to the full-text store.
    fn insert(
        &mut self,
        key: String,
        value: Value,
        text: Option<String>,
        max_entries: Option<usize>,
    ) -> Result<()> {
        let replaced = self.remove(&key).is_some();

        if !replaced {
            if let Some(max) = max_entries {
                if self.size >= max {
                    debug!(key = %key, max_entries = max, "rejecting insert into full cache");
                    return Err(Error::new(
                        ErrorKind::CapacityExceeded,
                        format!("cache holds {} of {} entries", self.size, max),
                    ));
                }
            }
        }

        match text {
            Some(text) => {
                self.full_text.append(key, text);
            }
            None => {
                self.plain.insert(key, value);
            }
        }
        self.size += 1;
        Ok(())
    }
}

/// Thread-safe cache with a plain key/value store and a searchable
/// full-text store.
///
/// One read-write lock guards the whole instance: lookups, walks and
/// searches share it, every mutation holds it exclusively. Public methods
/// take the lock exactly once and never call each other while holding it.
///
/// # Example
///
/// ```rust
/// use ftcache::{Cache, Value};
///
/// let cache = Cache::new();
/// cache.set("k1", "hello world", true).unwrap();
/// cache.set("k2", 42, false).unwrap();
///
/// assert_eq!(cache.get("k1"), Some(Value::from("hello world")));
/// assert_eq!(cache.full_text_search("WORLD", 0, false), vec!["hello world"]);
/// assert!(cache.full_text_search("WORLD", 0, true).is_empty());
/// ```
pub struct Cache {
    config: Config,
    formatter: Box<dyn ValueFormatter>,
    state: RwLock<CacheState>,
}

impl Default for Cache {
    fn default() -> Self {
        Self::new()
    }
}

impl Cache {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self::with_formatter(config, Box::new(DisplayFormatter))
    }

    /// Creates a cache that stringifies full-text values with `formatter`.
    pub fn with_formatter(config: Config, formatter: Box<dyn ValueFormatter>) -> Self {
        Cache {
            config,
            formatter,
            state: RwLock::new(CacheState::new()),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn formatter_name(&self) -> &str {
        self.formatter.name()
    }

    /// Stores `value` under `key`, replacing any entry for `key` in either
    /// store. Full-text values are stringified before the lock is taken.
    ///
    /// Fails only when a capacity is configured and `key` is new to a full
    /// cache.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>, full_text: bool) -> Result<()> {
        let key = key.into();
        let value = value.into();
        let text = full_text.then(|| self.formatter.format(&value));

        trace!(key = %key, full_text, "set");
        let mut state = self.state.write();
        state.insert(key, value, text, self.config.max_entries)
    }

    /// Full-text entries come back as `Value::Text`.
    pub fn get(&self, key: &str) -> Option<Value> {
        let state = self.state.read();
        if let Some(text) = state.full_text.get(key) {
            return Some(Value::Text(text.to_string()));
        }
        state.plain.get(key).cloned()
    }

    pub fn exists(&self, key: &str) -> bool {
        self.state.read().contains(key)
    }

    /// Removes `key` from whichever store holds it. Absent keys are a no-op.
    pub fn remove(&self, key: &str) -> Option<Value> {
        let mut state = self.state.write();
        let removed = state.remove(key);
        trace!(key, removed = removed.is_some(), "remove");
        removed
    }

    /// Visits every entry of one store until `visit` returns `false`.
    ///
    /// Full-text entries are visited in scan order, plain entries in no
    /// particular order. The shared lock is held for the whole walk, so
    /// `visit` must not call back into mutating methods of this cache.
    pub fn walk<F>(&self, full_text: bool, mut visit: F)
    where
        F: FnMut(&str, ValueRef<'_>) -> bool,
    {
        let state = self.state.read();
        if full_text {
            for (key, text) in state.full_text.iter() {
                if !visit(key, ValueRef::Text(text)) {
                    return;
                }
            }
        } else {
            for (key, value) in state.plain.iter() {
                if !visit(key, ValueRef::Plain(value)) {
                    return;
                }
            }
        }
    }

    /// Keys in the configured `KeysScope`.
    pub fn keys(&self) -> Vec<String> {
        self.keys_in(self.config.keys_scope)
    }

    pub fn keys_in(&self, scope: KeysScope) -> Vec<String> {
        let state = self.state.read();
        let plain = state.plain.keys().map(str::to_string);
        match scope {
            KeysScope::Plain => plain.collect(),
            KeysScope::All => plain
                .chain(state.full_text.keys().map(str::to_string))
                .collect(),
        }
    }

    /// Drops every entry, leaving the cache as freshly constructed.
    pub fn clear(&self) {
        let mut state = self.state.write();
        debug!(entries = state.size, "clearing cache");
        state.plain.clear();
        state.full_text.clear();
        state.size = 0;
    }

    /// Number of live entries across both stores.
    pub fn size(&self) -> usize {
        self.state.read().size
    }

    pub fn len(&self) -> usize {
        self.size()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.state.read();
        CacheStats {
            entries: state.size,
            plain_entries: state.plain.len(),
            full_text_entries: state.full_text.len(),
            max_entries: self.config.max_entries,
        }
    }

    /// Texts of full-text entries containing `query`, in scan order.
    ///
    /// `limit == 0` means unlimited; `strict_mode` compares bytes exactly
    /// instead of case-folding both sides.
    pub fn full_text_search(&self, query: &str, limit: usize, strict_mode: bool) -> Vec<String> {
        self.search(&TextSearch::new(query).with_limit(limit).strict(strict_mode))
    }

    pub fn search(&self, search: &TextSearch) -> Vec<String> {
        let state = self.state.read();
        engine::scan(&state.full_text, search)
    }

    /// Runs `search` and records its results in `history` under the query.
    pub fn search_recorded(&self, search: &TextSearch, history: &SearchHistory) -> Vec<String> {
        let results = self.search(search);
        history.record(search.query.clone(), results.clone());
        results
    }

    /// Removes up to `amount` full-text entries containing `query`
    /// (case-insensitive, `amount == 0` means all) and returns their texts.
    pub fn full_text_remove(&self, query: &str, amount: usize) -> Vec<String> {
        self.remove_matching(&TextRemove::new(query).with_amount(amount))
    }

    pub fn full_text_remove_all(&self, query: &str) -> Vec<String> {
        self.remove_matching(&TextRemove::new(query))
    }

    pub fn remove_matching(&self, request: &TextRemove) -> Vec<String> {
        let mut state = self.state.write();
        let removed = engine::remove_matching(&mut state.full_text, request);
        state.size -= removed.len();
        debug!(query = %request.query, removed = removed.len(), "bulk full-text removal");
        removed
    }

    /// Writes every entry to `path`.
    ///
    /// Entries are collected under one shared lock, the file is written
    /// after it is released. A JSON flush fails with `ErrorKind::Parse` if
    /// any float is NaN or infinite; the binary format keeps them.
    pub fn flush(&self, path: impl AsRef<Path>, format: SnapshotFormat) -> Result<usize> {
        let records = self.snapshot_records();
        snapshot::write(path.as_ref(), format, &records)?;
        debug!(path = %path.as_ref().display(), entries = records.len(), "flushed cache");
        Ok(records.len())
    }

    /// Builds a new cache from a snapshot written by `flush`.
    pub fn load(path: impl AsRef<Path>, config: Config) -> Result<Self> {
        let cache = Self::with_config(config);
        cache.restore(path)?;
        Ok(cache)
    }

    /// Replaces the contents of this cache with a snapshot, atomically with
    /// respect to other callers. On error the cache is left untouched.
    pub fn restore(&self, path: impl AsRef<Path>) -> Result<usize> {
        let records = snapshot::read(path.as_ref())?;
        let count = records.len();

        let mut restored = CacheState::new();
        for record in records {
            // full-text records already hold formatted text
            let text = record.full_text.then(|| record.value.to_string());
            restored.insert(record.key, record.value, text, self.config.max_entries)?;
        }

        *self.state.write() = restored;
        debug!(path = %path.as_ref().display(), entries = count, "restored cache");
        Ok(count)
    }

    fn snapshot_records(&self) -> Vec<SnapshotRecord> {
        let state = self.state.read();
        let full_text = state.full_text.iter().map(|(key, text)| SnapshotRecord {
            key: key.to_string(),
            value: Value::Text(text.to_string()),
            full_text: true,
        });
        let plain = state.plain.iter().map(|(key, value)| SnapshotRecord {
            key: key.to_string(),
            value: value.clone(),
            full_text: false,
        });
        full_text.chain(plain).collect()
    }

    #[cfg(test)]
    fn check_invariants(&self) -> bool {
        let state = self.state.read();
        let disjoint = state.plain.keys().all(|k| !state.full_text.contains(k));
        disjoint
            && state.full_text.check_invariants()
            && state.size == state.plain.len() + state.full_text.len()
    }

    #[cfg(test)]
    fn full_text_position(&self, key: &str) -> Option<usize> {
        self.state.read().full_text.position(key)
    }
}
