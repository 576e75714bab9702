use std::collections::HashMap;

use crate::{UnifyError, UnifyResult, parser::{ColumnRef, NameSource, QueryRepairer, Repair, StructureSplitter}, ticket::RawQuery};

const MAX_QUOTED_STATEMENT: usize = 60;

/// A submitted query reduced to its projected columns and verbatim source clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuery {
    pub source_label: String,
    pub columns: Vec<ColumnRef>,
    pub from_clause: String,
    pub raw_text: String,
    pub prelude: Option<String>,
    pub modifier: Option<String>,
    pub repairs: Vec<Repair>,
    pub has_set_operation: bool,
    pub unbalanced: bool,
}

impl ParsedQuery {
    pub fn resolve(raw: &RawQuery) -> UnifyResult<ParsedQuery> {
        let source_label = raw.source_label.clone();
        let repaired = QueryRepairer::repair(&raw.text);

        if let Some(extra) = &repaired.extra_statement {
            return Err(UnifyError::UnsupportedConstruct {
                source_label,
                construct: format!("multiple statements (found `{}` after `;`)", Self::shorten(extra)),
            });
        }

        let structure = StructureSplitter::split(&repaired.text)
            .map_err(|error| UnifyError::Parse { source_label: source_label.clone(), error })?;

        let items = StructureSplitter::split_top_level_projection(&structure.projection)
            .map_err(|error| UnifyError::Parse { source_label: source_label.clone(), error })?;

        let mut columns: Vec<ColumnRef> = Vec::with_capacity(items.len());
        let mut seen: HashMap<String, usize> = HashMap::new();

        for item in items {
            if ColumnRef::is_wildcard(&item) {
                return Err(UnifyError::UnsupportedConstruct {
                    source_label,
                    construct: format!("wildcard projection `{item}`; list the columns explicitly"),
                });
            }

            let column = ColumnRef::resolve(&item)
                .map_err(|error| UnifyError::Parse { source_label: source_label.clone(), error })?;

            if let Some(index) = seen.get(&column.key()) {
                return Err(UnifyError::UnsupportedConstruct {
                    source_label,
                    construct: format!(
                        "duplicate output column `{}` (`{}` and `{}`)",
                        column.output_name, columns[*index].expression, column.expression
                    ),
                });
            }

            seen.insert(column.key(), columns.len());
            columns.push(column);
        }

        Ok(ParsedQuery {
            source_label,
            columns,
            from_clause: structure.from_clause,
            raw_text: raw.text.clone(),
            prelude: structure.prelude,
            modifier: structure.modifier,
            repairs: repaired.repairs,
            has_set_operation: structure.has_set_operation,
            unbalanced: repaired.unbalanced,
        })
    }

    fn shorten(text: &str) -> String {
        match text.char_indices().nth(MAX_QUOTED_STATEMENT) {
            Some((index, _)) => format!("{}...", &text[..index]),
            None => text.to_string(),
        }
    }

    /// Column whose output name matches `key` (see [`crate::parser::sql_ident::name_key`]).
    pub fn column(&self, key: &str) -> Option<&ColumnRef> {
        self.columns.iter().find(|column| column.key() == key)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|column| column.output_name.as_str()).collect()
    }

    /// Columns named after their whole expression text.
    pub fn unaliased_expressions(&self) -> impl Iterator<Item = &ColumnRef> {
        self.columns.iter().filter(|column| column.name_source == NameSource::Expression)
    }

    /// The query as a CTE body: original projection and source clause, with
    /// the repairs applied.
    pub fn render_body(&self) -> String {
        let mut body = String::new();

        if let Some(prelude) = &self.prelude {
            body.push_str(prelude);
            body.push(' ');
        }

        body.push_str("SELECT ");
        if let Some(modifier) = &self.modifier {
            body.push_str(modifier);
            body.push(' ');
        }

        let projection = self.columns.iter().map(ColumnRef::render).collect::<Vec<_>>().join(", ");
        body.push_str(&projection);
        body.push_str(" FROM ");
        body.push_str(&self.from_clause);

        body
    }
}

impl TryFrom<&RawQuery> for ParsedQuery {
    type Error = UnifyError;

    fn try_from(value: &RawQuery) -> Result<Self, Self::Error> {
        ParsedQuery::resolve(value)
    }
}
