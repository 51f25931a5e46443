pub mod core;
pub mod store;
pub mod search;
pub mod storage;
pub mod expiry;

/*
┌──────────────────────────────────────── struct Cache ────────────────────────────────────────┐
│  config: Config                       // per-instance limits, keys scope                      │
│  formatter: Box<dyn ValueFormatter>   // stringifies values entering the full-text store      │
│  state: RwLock<CacheState>            // one lock for the whole instance                      │
│     ├─ size: usize                    // live entries across both stores                      │
│     ├─ plain: PlainStore              // HashMap<String, Value>                               │
│     └─ full_text: FullTextStore                                                                 │
│          ├─ entries: Vec<TextEntry>   // (key, text) in insertion order, scanned by searches  │
│          └─ indices: HashMap<String, usize>   // key -> position, kept dense on removal       │
└──────────────────────────────────────────────────────────────────────────────────────────────┘

  set ──► remove old entry (either store) ──► plain.insert | full_text.append ──► size += 1
  remove(key at p) ──► entries.remove(p) ──► every position > p moves down by one
  search ──► scan entries in order, substring match on text (case-folded unless strict)
  bulk remove ──► collect matching keys ──► remove each by key

  collaborators:  storage::snapshot (flush / load)   expiry::Expirer (timed remove)
                  search::history::SearchHistory (previous query results)
*/

pub use crate::core::cache::Cache;
pub use crate::core::config::{Config, KeysScope};
pub use crate::core::error::{Error, ErrorKind, Result};
pub use crate::core::stats::CacheStats;
pub use crate::core::types::{DisplayFormatter, Value, ValueFormatter, ValueRef};
pub use crate::expiry::expirer::Expirer;
pub use crate::search::history::{HistoryStats, SearchHistory};
pub use crate::search::query::{TextRemove, TextSearch};
pub use crate::storage::snapshot::{SnapshotFormat, SnapshotRecord};
