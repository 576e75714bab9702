use serde::Deserialize;

/// One row of the glossary file. Header names are matched after lowercasing
/// and replacing spaces with underscores.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GlossaryEntry {
    #[serde(alias = "nome", alias = "name", alias = "nome_canonico", alias = "coluna", alias = "column")]
    pub canonical_name: String,
    #[serde(alias = "abreviacao", alias = "abreviação", alias = "abbr", alias = "sigla")]
    pub abbreviation: String,
    #[serde(rename = "type", alias = "data_type", alias = "tipo", default)]
    pub data_type: String,
}

impl GlossaryEntry {
    pub fn new(canonical_name: &str, abbreviation: &str, data_type: &str) -> Self {
        Self {
            canonical_name: canonical_name.trim().to_string(),
            abbreviation: abbreviation.trim().to_string(),
            data_type: data_type.trim().to_string(),
        }
    }

    pub fn has_type(&self) -> bool {
        !self.data_type.is_empty()
    }
}
