use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{UnifyError, UnifyResult};

/// Settings for one unification run.
///
/// - `query_label` / `table_label` name the ticket fields to read.
/// - `default_table_name` is used when the ticket names no final table.
/// - `glossary_path` points at the CSV glossary; a missing file disables renaming.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct UnifierConfig {
    /// Prefix of the numbered query fields (`Query 1:`, `Query 2:`, ...)
    pub query_label: String,
    /// Label of the final table field
    pub table_label: String,
    pub default_table_name: String,
    /// CTE names are `<cte_prefix><n>`, numbered from 1
    pub cte_prefix: String,
    pub glossary_path: Option<PathBuf>,
    pub glossary_delimiter: char,
    /// Wrap the result in `CREATE TABLE <table> AS ...;`
    pub create_table: bool,
    /// Cast renamed columns to the glossary type
    pub cast_glossary_types: bool,
    /// Directory receiving `<table>.sql` and `<table>.log.md`
    pub output_dir: PathBuf,
}

impl Default for UnifierConfig {
    fn default() -> Self {
        Self {
            query_label: "Query".to_string(),
            table_label: "Nome da tabela final".to_string(),
            default_table_name: "tabela_final".to_string(),
            cte_prefix: "cte".to_string(),
            glossary_path: None,
            glossary_delimiter: ',',
            create_table: false,
            cast_glossary_types: false,
            output_dir: PathBuf::from("."),
        }
    }
}

impl UnifierConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a JSON config file. Absent keys keep their default value.
    pub async fn from_json_file(path: &Path) -> UnifyResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|err| UnifyError::io(format!("reading config {}", path.display()), err))?;

        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> UnifyResult<Self> {
        serde_json::from_str(content).map_err(|err| UnifyError::validation(format!("invalid config: {err}")))
    }

    pub fn with_glossary(mut self, path: impl Into<PathBuf>) -> Self { self.glossary_path = Some(path.into()); self }
    pub fn with_output_dir(mut self, path: impl Into<PathBuf>) -> Self { self.output_dir = path.into(); self }
    pub fn with_create_table(mut self) -> Self { self.create_table = true; self }
    pub fn with_glossary_casts(mut self) -> Self { self.cast_glossary_types = true; self }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::UnifierConfig;

    #[test]
    pub fn test_defaults() {
        let config = UnifierConfig::new();

        assert_eq!(config.query_label, "Query");
        assert_eq!(config.table_label, "Nome da tabela final");
        assert_eq!(config.default_table_name, "tabela_final");
        assert_eq!(config.cte_prefix, "cte");
        assert!(!config.create_table);
    }

    #[test]
    pub fn test_partial_json() {
        let config = UnifierConfig::from_json_str(r#"{ "default_table_name": "merged", "create_table": true }"#)
            .expect("Failed to read config");

        assert_eq!(config.default_table_name, "merged");
        assert!(config.create_table);
        assert_eq!(config.query_label, "Query");
    }

    #[test]
    pub fn test_invalid_json() {
        let result = UnifierConfig::from_json_str("{ not json");

        assert!(result.is_err());
    }

    #[test]
    pub fn test_builders() {
        let config = UnifierConfig::new().with_glossary("glossary.csv").with_create_table().with_glossary_casts();

        assert_eq!(config.glossary_path, Some(PathBuf::from("glossary.csv")));
        assert!(config.create_table);
        assert!(config.cast_glossary_types);
    }

    #[tokio::test]
    async fn test_from_json_file() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("unifier.json");
        std::fs::write(&path, r#"{ "cte_prefix": "src_" }"#).expect("Failed to write config");

        let config = UnifierConfig::from_json_file(&path).await.expect("Failed to read config");

        assert_eq!(config.cte_prefix, "src_");
    }
}
