use indexmap::IndexMap;

use crate::parser::{ParsedQuery, sql_ident};

/// Ordered set of distinct output names across all queries.
///
/// Names are keyed case-insensitively; the first spelling seen is the
/// canonical one and insertion order is the output column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnifiedSchema {
    /// Map of name key -> canonical spelling
    columns: IndexMap<String, String>,
}

impl UnifiedSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Walks the queries in submission order, appending unseen names.
    pub fn from_queries(queries: &[ParsedQuery]) -> Self {
        let mut schema = Self::new();
        for query in queries {
            for column in &query.columns {
                schema.insert(&column.output_name);
            }
        }
        schema
    }

    /// Returns `true` when the name was not known yet.
    pub fn insert(&mut self, name: &str) -> bool {
        let key = sql_ident::name_key(name);
        if self.columns.contains_key(&key) {
            return false;
        }
        self.columns.insert(key, name.to_string());
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(&sql_ident::name_key(name))
    }

    pub fn canonical(&self, name: &str) -> Option<&str> {
        self.columns.get(&sql_ident::name_key(name)).map(String::as_str)
    }

    /// Canonical names in output order.
    pub fn names(&self) -> Vec<&str> {
        self.columns.values().map(String::as_str).collect()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use crate::unifier::UnifiedSchema;

    #[test]
    pub fn test_insert_is_case_insensitive() {
        let mut schema = UnifiedSchema::new();

        assert!(schema.insert("Total"));
        assert!(!schema.insert("TOTAL"));
        assert!(!schema.insert("\"total\""));
        assert!(schema.insert("count"));

        assert_eq!(schema.names(), vec!["Total", "count"]);
        assert_eq!(schema.canonical("total"), Some("Total"));
        assert!(schema.contains("COUNT"));
    }
}
