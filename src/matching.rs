// 🔍 Fuzzy Matcher - case-insensitive substring lookup
// An entity qualifies when ANY query token is contained in ANY of its target
// fields. No token order, no token-to-field mapping.

// ============================================================================
// SEARCHABLE
// ============================================================================

/// Exposes the fields a query is matched against
pub trait Searchable {
    fn search_fields(&self) -> Vec<&str>;
}

// ============================================================================
// FUZZY MATCHER
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuzzyMatcher {
    /// Lowercased, non-empty tokens
    tokens: Vec<String>,
}

impl FuzzyMatcher {
    /// Build a matcher from individual query tokens.
    /// Blank tokens are dropped, so `["", " "]` behaves like an empty query.
    pub fn new<S: AsRef<str>>(tokens: &[S]) -> Self {
        let tokens = tokens
            .iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();

        FuzzyMatcher { tokens }
    }

    /// Join the words back into one phrase and match it as a single token.
    /// Used for contract names, which may contain spaces.
    pub fn phrase<S: AsRef<str>>(words: &[S]) -> Self {
        let joined = words
            .iter()
            .map(|w| w.as_ref().trim())
            .filter(|w| !w.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        Self::new(&[joined])
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// OR over tokens, OR over fields
    pub fn matches_fields(&self, fields: &[&str]) -> bool {
        if self.tokens.is_empty() {
            return false;
        }

        let lowered: Vec<String> = fields.iter().map(|f| f.to_lowercase()).collect();

        self.tokens
            .iter()
            .any(|token| lowered.iter().any(|field| field.contains(token.as_str())))
    }

    pub fn matches<T: Searchable>(&self, item: &T) -> bool {
        self.matches_fields(&item.search_fields())
    }

    /// All hits, in the order the items were given
    pub fn filter<'a, T, I>(&self, items: I) -> Vec<&'a T>
    where
        T: Searchable + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        if self.tokens.is_empty() {
            return Vec::new();
        }

        items.into_iter().filter(|item| self.matches(*item)).collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================
