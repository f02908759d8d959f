use std::collections::HashSet;

/// Identifiers of documents that were already converted into a host scene.
///
/// Owned and persisted by the caller; a document is admitted only if its
/// identifier is absent and recorded after a successful run.
pub trait ProcessedLedger {
    fn contains(&self, id: &str) -> bool;
    fn record(&mut self, id: &str);
}

impl ProcessedLedger for HashSet<String> {
    fn contains(&self, id: &str) -> bool {
        HashSet::contains(self, id)
    }

    fn record(&mut self, id: &str) {
        self.insert(id.to_owned());
    }
}

/// A ledger stored as one `$`-separated string, the way hosts keep it in a
/// single text parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DelimitedLedger {
    text: String,
}

impl DelimitedLedger {
    pub const SEPARATOR: char = '$';

    /// Wraps a persisted ledger string.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Iterates over the recorded identifiers, skipping empty entries.
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.text.split(Self::SEPARATOR).filter(|e| !e.is_empty())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.text
    }
}

impl ProcessedLedger for DelimitedLedger {
    fn contains(&self, id: &str) -> bool {
        self.entries().any(|e| e == id)
    }

    fn record(&mut self, id: &str) {
        self.text.push(Self::SEPARATOR);
        self.text.push_str(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimited_entries_match_whole_names() {
        let ledger = DelimitedLedger::new("$C:/data/delft.json$$C:/data/den_haag.json");
        assert!(ledger.contains("C:/data/delft.json"));
        assert!(ledger.contains("C:/data/den_haag.json"));
        assert!(!ledger.contains("delft.json"));
        assert!(!ledger.contains(""));
        assert_eq!(ledger.entries().count(), 2);
    }

    #[test]
    fn record_appends_with_separator() {
        let mut ledger = DelimitedLedger::default();
        ledger.record("a.json");
        ledger.record("b.json");
        assert_eq!(ledger.as_str(), "$a.json$b.json");
        assert!(ledger.contains("b.json"));
    }

    #[test]
    fn hash_set_ledger() {
        let mut ledger: HashSet<String> = HashSet::new();
        assert!(!ProcessedLedger::contains(&ledger, "x"));
        ledger.record("x");
        assert!(ProcessedLedger::contains(&ledger, "x"));
    }
}
