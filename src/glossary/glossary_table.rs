use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord};
use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::{UnifyError, glossary::GlossaryEntry, parser::sql_ident};

/// Canonical column name -> abbreviation/type, keyed case-insensitively.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Glossary {
    entries: IndexMap<String, GlossaryEntry>,
}

impl Glossary {
    /// First entry wins on duplicate names; blank names are ignored.
    pub fn from_entries(entries: impl IntoIterator<Item = GlossaryEntry>) -> Self {
        let mut glossary = Self::default();

        for entry in entries {
            if entry.canonical_name.is_empty() || entry.abbreviation.is_empty() {
                debug!("Skipping glossary row without name or abbreviation: {:?}", entry);
                continue;
            }

            let key = sql_ident::name_key(&entry.canonical_name);
            if glossary.entries.contains_key(&key) {
                warn!("Duplicate glossary entry for `{}`; keeping the first one", entry.canonical_name);
                continue;
            }
            glossary.entries.insert(key, entry);
        }

        glossary
    }

    pub fn from_csv_str(content: &str, delimiter: u8, source: &Path) -> Result<Self, UnifyError> {
        let load_error = |message: String| UnifyError::GlossaryLoad { path: source.to_path_buf(), message };

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(content.trim_start_matches('\u{feff}').as_bytes());

        let headers = reader
            .headers()
            .map_err(|err| load_error(format!("cannot read header row: {err}")))?
            .iter()
            .map(|header| header.trim().to_lowercase().replace(' ', "_"))
            .collect::<StringRecord>();
        reader.set_headers(headers.clone());

        let mut entries = vec![];
        for record in reader.records() {
            let record = record.map_err(|err| load_error(format!("cannot read row: {err}")))?;
            if record.iter().all(|cell| cell.trim().is_empty()) {
                continue;
            }

            let entry: GlossaryEntry = record
                .deserialize(Some(&headers))
                .map_err(|err| load_error(format!("invalid row: {err}")))?;
            entries.push(GlossaryEntry::new(&entry.canonical_name, &entry.abbreviation, &entry.data_type));
        }

        Ok(Self::from_entries(entries))
    }

    /// Loads the glossary file. A missing file is `Ok(None)`; an unreadable or
    /// malformed one is `GlossaryLoad`.
    pub async fn load(path: &Path, delimiter: char) -> Result<Option<Self>, UnifyError> {
        let delimiter = u8::try_from(delimiter).map_err(|_| UnifyError::GlossaryLoad {
            path: PathBuf::from(path),
            message: format!("delimiter `{delimiter}` is not a single-byte character"),
        })?;

        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(UnifyError::GlossaryLoad { path: path.to_path_buf(), message: err.to_string() });
            },
        };

        Self::from_csv_str(&content, delimiter, path).map(Some)
    }

    pub fn lookup(&self, name: &str) -> Option<&GlossaryEntry> {
        self.entries.get(&sql_ident::name_key(name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use pretty_assertions::assert_eq;

    use crate::glossary::{Glossary, GlossaryEntry};

    fn parse(content: &str) -> Glossary {
        Glossary::from_csv_str(content, b',', Path::new("glossary.csv")).expect("Failed to parse glossary")
    }

    #[test]
    pub fn test_lookup_is_case_insensitive() {
        let glossary = parse("canonical_name,abbreviation,type\ncustomer_name,cst_nm,varchar\n");

        let entry = glossary.lookup("Customer_Name").expect("Missing entry");
        assert_eq!(entry, &GlossaryEntry::new("customer_name", "cst_nm", "varchar"));
        assert!(glossary.lookup("\"CUSTOMER_NAME\"").is_some());
        assert!(glossary.lookup("other").is_none());
    }

    #[test]
    pub fn test_portuguese_headers() {
        let glossary = parse("Nome,Abreviação,Tipo\nvalor_total, vl_tot ,\"numeric(18,2)\"\n");

        let entry = glossary.lookup("valor_total").expect("Missing entry");
        assert_eq!(entry.abbreviation, "vl_tot");
        assert_eq!(entry.data_type, "numeric(18,2)");
    }

    #[test]
    pub fn test_type_column_is_optional() {
        let glossary = parse("name,abbr\norder_id,ord_id\n");

        let entry = glossary.lookup("order_id").expect("Missing entry");
        assert!(!entry.has_type());
    }

    #[test]
    pub fn test_duplicates_keep_first() {
        let glossary = parse("name,abbr\nx,first\nX,second\n\n,orphan\n");

        assert_eq!(glossary.len(), 1);
        assert_eq!(glossary.lookup("x").map(|e| e.abbreviation.as_str()), Some("first"));
    }

    #[test]
    pub fn test_semicolon_delimiter() {
        let glossary =
            Glossary::from_csv_str("name;abbr\nx;x_ab\n", b';', Path::new("g.csv")).expect("Failed to parse glossary");

        assert_eq!(glossary.lookup("x").map(|e| e.abbreviation.as_str()), Some("x_ab"));
    }

    #[test]
    pub fn test_missing_required_column() {
        let result = Glossary::from_csv_str("name,type\nx,int\n", b',', Path::new("g.csv"));

        match result {
            Err(err) => assert_eq!(err.kind(), "GlossaryLoadError"),
            Ok(_) => panic!(),
        }
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");

        let glossary = Glossary::load(&dir.path().join("missing.csv"), ',').await.expect("Missing file is not an error");

        assert!(glossary.is_none());
    }

    #[tokio::test]
    async fn test_load_file() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("glossary.csv");
        std::fs::write(&path, "name,abbr,type\ny,y_ab,int\n").expect("Failed to write glossary");

        let glossary = Glossary::load(&path, ',').await.expect("Failed to load").expect("Glossary should exist");

        assert_eq!(glossary.len(), 1);
    }
}
