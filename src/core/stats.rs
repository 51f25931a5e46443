use serde::{Serialize, Deserialize};

/// Point-in-time entry counts, read under a single shared lock
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: usize,
    pub plain_entries: usize,
    pub full_text_entries: usize,
    pub max_entries: Option<usize>,
}

impl CacheStats {
    /// Fraction of the configured capacity in use, `None` when unlimited.
    pub fn utilization(&self) -> Option<f64> {
        match self.max_entries {
            Some(0) => Some(1.0),
            Some(max) => Some(self.entries as f64 / max as f64),
            None => None,
        }
    }
}
