/// Which keys `Cache::keys` reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeysScope {
    /// Only keys of the plain store.
    Plain,
    /// Plain keys followed by full-text keys in scan order.
    #[default]
    All,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub max_entries: Option<usize>,     // None = unlimited
    pub keys_scope: KeysScope,
    pub history_capacity: usize,        // SearchHistory::from_config
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_entries: None,
            keys_scope: KeysScope::All,
            history_capacity: 128,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps the number of live entries across both stores.
    ///
    /// Inserting a new key into a full cache fails; overwriting an existing
    /// key always succeeds.
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = Some(max_entries);
        self
    }

    pub fn with_keys_scope(mut self, scope: KeysScope) -> Self {
        self.keys_scope = scope;
        self
    }

    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }
}
