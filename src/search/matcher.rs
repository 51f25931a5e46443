/// Presence-of-substring test, optionally case-folded
pub struct TextMatcher {
    needle: String,
    case_sensitive: bool,
}

impl TextMatcher {
    pub fn new(query: &str, case_sensitive: bool) -> Self {
        let needle = if case_sensitive {
            query.to_string()
        } else {
            query.to_lowercase()
        };
        TextMatcher { needle, case_sensitive }
    }

    /// Case-folded matching lowercases `text` on every call, so a scan
    /// allocates one copy per entry on top of its O(n) walk. Full Unicode
    /// folding needs the copy; an ASCII-only comparison would not.
    pub fn matches(&self, text: &str) -> bool {
        if self.case_sensitive {
            text.contains(self.needle.as_str())
        } else {
            text.to_lowercase().contains(self.needle.as_str())
        }
    }
}
