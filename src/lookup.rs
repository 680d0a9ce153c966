//! Ordered exact / partial / default lookup.
//!
//! Section colours and directorate categories are both resolved by trying an
//! exact key first, then a case-insensitive containment match in table order,
//! then a fallback.

use indexmap::IndexMap;

#[derive(Debug, Clone)]
pub struct TieredLookup<V> {
    entries: IndexMap<String, V>,
    default: V,
}

impl<V> TieredLookup<V> {
    pub fn new(entries: IndexMap<String, V>, default: V) -> Self {
        Self { entries, default }
    }

    /// Case-sensitive exact key match.
    pub fn exact(&self, key: &str) -> Option<&V> {
        self.entries.get(key)
    }

    /// First entry, in table order, whose key contains `needle` or is
    /// contained by it, ignoring case. An empty needle matches nothing.
    pub fn partial(&self, needle: &str) -> Option<&V> {
        if needle.is_empty() {
            return None;
        }
        let needle = needle.to_lowercase();
        self.entries
            .iter()
            .find(|(key, _)| {
                let key = key.to_lowercase();
                needle.contains(&key) || key.contains(&needle)
            })
            .map(|(_, value)| value)
    }

    pub fn default_value(&self) -> &V {
        &self.default
    }

    /// Exact, then partial, then the default.
    pub fn resolve(&self, key: &str) -> &V {
        self.exact(key)
            .or_else(|| self.partial(key))
            .unwrap_or(&self.default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup() -> TieredLookup<u32> {
        let mut entries = IndexMap::new();
        entries.insert("Assessment".to_string(), 1);
        entries.insert("Secondary Assessment".to_string(), 2);
        entries.insert("Management".to_string(), 3);
        TieredLookup::new(entries, 0)
    }

    #[test]
    fn test_exact_before_partial() {
        // "Secondary Assessment" also contains "Assessment", which comes first
        assert_eq!(*lookup().resolve("Secondary Assessment"), 2);
    }

    #[test]
    fn test_partial_in_table_order() {
        let lookup = lookup();
        assert_eq!(*lookup.resolve("ongoing assessment and management"), 1);
        assert_eq!(*lookup.resolve("manage"), 3);
    }

    #[test]
    fn test_default() {
        let lookup = lookup();
        assert_eq!(*lookup.resolve("Background"), 0);
        assert_eq!(*lookup.resolve(""), 0);
        assert_eq!(lookup.partial(""), None);
    }
}
