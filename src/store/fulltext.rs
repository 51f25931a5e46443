use std::collections::HashMap;

/// One searchable entry. The key is kept beside the text, never inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEntry {
    pub key: String,
    pub text: String,
}

/// Ordered text entries plus a dense key -> position index.
///
/// `indices` maps its key set one-to-one onto `0..entries.len()`, and
/// `entries[indices[k]].key == k` for every key. Entries keep insertion
/// order (minus removals), which is the order searches scan in.
#[derive(Debug, Default)]
pub struct FullTextStore {
    entries: Vec<TextEntry>,
    indices: HashMap<String, usize>,
}

impl FullTextStore {
    pub fn new() -> Self {
        FullTextStore {
            entries: Vec::new(),
            indices: HashMap::new(),
        }
    }

    /// Appends an entry at the end of the sequence and returns its position.
    ///
    /// The caller removes any previous entry for `key` first.
    pub fn append(&mut self, key: String, text: String) -> usize {
        debug_assert!(!self.indices.contains_key(&key), "duplicate full-text key");
        let position = self.entries.len();
        self.indices.insert(key.clone(), position);
        self.entries.push(TextEntry { key, text });
        position
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        let position = *self.indices.get(key)?;
        Some(self.entries[position].text.as_str())
    }

    pub fn position(&self, key: &str) -> Option<usize> {
        self.indices.get(key).copied()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.indices.contains_key(key)
    }

    /// Removes `key` and re-densifies the index.
    ///
    /// Every entry after the removed slot moves down by one, and so does its
    /// recorded position. O(n) in the number of entries.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let removed_at = *self.indices.get(key)?;
        let entry = self.entries.remove(removed_at);

        for position in self.indices.values_mut() {
            if *position > removed_at {
                *position -= 1;
            }
        }
        self.indices.remove(key);

        Some(entry.text)
    }

    /// Entries in scan order.
    pub fn entries(&self) -> &[TextEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|e| (e.key.as_str(), e.text.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.indices.clear();
    }

    /// Verifies that the index is a bijection onto the entry positions.
    pub fn check_invariants(&self) -> bool {
        if self.indices.len() != self.entries.len() {
            return false;
        }
        self.entries
            .iter()
            .enumerate()
            .all(|(position, entry)| self.indices.get(&entry.key) == Some(&position))
    }
}
