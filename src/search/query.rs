/// Substring search over the full-text store.
///
/// `limit == 0` returns every match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSearch {
    pub query: String,
    pub limit: usize,
    pub strict_mode: bool,   // true: byte-exact, false: case-folded
}

impl TextSearch {
    pub fn new(query: impl Into<String>) -> Self {
        TextSearch {
            query: query.into(),
            limit: 0,
            strict_mode: false,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn strict(mut self, strict_mode: bool) -> Self {
        self.strict_mode = strict_mode;
        self
    }
}

/// Bulk removal of full-text entries whose text contains `query`.
///
/// `amount == 0` removes every match. Matching is case-insensitive unless
/// `strict_mode` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRemove {
    pub query: String,
    pub amount: usize,
    pub strict_mode: bool,
}

impl TextRemove {
    pub fn new(query: impl Into<String>) -> Self {
        TextRemove {
            query: query.into(),
            amount: 0,
            strict_mode: false,
        }
    }

    pub fn with_amount(mut self, amount: usize) -> Self {
        self.amount = amount;
        self
    }

    pub fn strict(mut self, strict_mode: bool) -> Self {
        self.strict_mode = strict_mode;
        self
    }
}
