use std::collections::HashSet;

use crate::{
    RunLog, UnifierConfig, UnifyError, UnifyResult,
    composer::UnifiedQuery,
    glossary::Glossary,
    parser::{ParsedQuery, sql_ident},
    unifier::Unification,
};

const INDENT: &str = "    ";

/// Outer projection item after glossary renaming.
#[derive(Debug, Clone, PartialEq, Eq)]
struct OuterColumn {
    name: String,
    rename: Option<String>,
    cast: Option<String>,
}

impl OuterColumn {
    fn output_name(&self) -> &str {
        self.rename.as_deref().unwrap_or(&self.name)
    }

    fn render(&self) -> String {
        let column = sql_ident::render_identifier(&self.name);
        let column = match &self.cast {
            Some(data_type) => format!("CAST({column} AS {data_type})"),
            None => column,
        };

        match &self.rename {
            Some(rename) => format!("{column} AS {}", sql_ident::render_identifier(rename)),
            None if self.cast.is_some() => format!("{column} AS {}", sql_ident::render_identifier(&self.name)),
            None => column,
        }
    }
}

/// Renders the CTE + `UNION ALL` statement. Pure string production: the same
/// queries, unification and glossary always give the same text.
#[derive(Debug, Clone)]
pub struct QueryComposer {
    cte_prefix: String,
    table_name: String,
    create_table: bool,
    cast_glossary_types: bool,
}

impl QueryComposer {
    pub fn new(table_name: &str) -> Self {
        Self {
            cte_prefix: "cte".to_string(),
            table_name: table_name.to_string(),
            create_table: false,
            cast_glossary_types: false,
        }
    }

    pub fn from_config(config: &UnifierConfig, table_name: &str) -> Self {
        Self {
            cte_prefix: config.cte_prefix.clone(),
            table_name: table_name.to_string(),
            create_table: config.create_table,
            cast_glossary_types: config.cast_glossary_types,
        }
    }

    pub fn with_cte_prefix(mut self, prefix: &str) -> Self {
        self.cte_prefix = prefix.to_string();
        self
    }

    pub fn with_create_table(mut self, create_table: bool) -> Self {
        self.create_table = create_table;
        self
    }

    pub fn with_glossary_casts(mut self, cast: bool) -> Self {
        self.cast_glossary_types = cast;
        self
    }

    pub fn cte_name(&self, index: usize) -> String {
        format!("{}{}", self.cte_prefix, index + 1)
    }

    /// Alias of the derived table: the last segment of a qualified table name.
    fn table_alias(&self) -> &str {
        self.table_name.rsplit('.').next().unwrap_or(&self.table_name)
    }

    pub fn compose(
        &self,
        queries: &[ParsedQuery],
        unification: &Unification,
        glossary: Option<&Glossary>,
        log: &mut RunLog,
    ) -> UnifyResult<UnifiedQuery> {
        if queries.is_empty() || queries.len() != unification.projections.len() {
            return Err(UnifyError::validation("every query needs exactly one padded projection"));
        }
        if !sql_ident::is_plain_identifier(&self.cte_prefix) {
            return Err(UnifyError::validation(format!("invalid CTE prefix `{}`", self.cte_prefix)));
        }

        let mut sql = String::new();

        if self.create_table {
            sql.push_str(&format!("CREATE TABLE {} AS\n", self.table_name));
        }

        sql.push_str("WITH\n");
        let ctes = queries
            .iter()
            .enumerate()
            .map(|(index, query)| format!("{} AS (\n{INDENT}{}\n)", self.cte_name(index), query.render_body()))
            .collect::<Vec<_>>();
        sql.push_str(&ctes.join(",\n"));
        sql.push('\n');

        let outer = self.outer_columns(unification, glossary, log);
        if outer.iter().any(|column| column.rename.is_some() || column.cast.is_some()) {
            let projection = outer.iter().map(OuterColumn::render).collect::<Vec<_>>().join(", ");
            sql.push_str(&format!("SELECT {projection}\n"));
        } else {
            sql.push_str("SELECT *\n");
        }

        sql.push_str("FROM (\n");
        let branches = unification
            .projections
            .iter()
            .enumerate()
            .map(|(index, projection)| format!("{INDENT}SELECT {} FROM {}", projection.render(), self.cte_name(index)))
            .collect::<Vec<_>>();
        sql.push_str(&branches.join(&format!("\n{INDENT}UNION ALL\n")));
        sql.push_str(&format!("\n) AS {}", self.table_alias()));

        if self.create_table {
            sql.push(';');
        }

        log.info(format!(
            "Composed {} CTE(s) with UNION ALL into `{}`",
            queries.len(),
            self.table_name
        ));

        Ok(UnifiedQuery {
            sql,
            output_columns: outer.iter().map(|column| column.output_name().to_string()).collect(),
        })
    }

    /// Applies glossary renames. A rename whose abbreviation would clash with
    /// another output column is skipped.
    fn outer_columns(&self, unification: &Unification, glossary: Option<&Glossary>, log: &mut RunLog) -> Vec<OuterColumn> {
        let names = unification.schema.names();
        let mut outer: Vec<OuterColumn> = names
            .iter()
            .map(|name| OuterColumn { name: name.to_string(), rename: None, cast: None })
            .collect();

        let Some(glossary) = glossary else {
            return outer;
        };

        let schema_keys: HashSet<String> = unification.schema.keys().map(str::to_string).collect();
        let mut taken: HashSet<String> = HashSet::new();
        let mut renamed = 0;

        for column in outer.iter_mut() {
            let Some(entry) = glossary.lookup(&column.name) else {
                continue;
            };

            let own_key = sql_ident::name_key(&column.name);
            let abbreviation_key = sql_ident::name_key(&entry.abbreviation);
            let clashes_with_column = abbreviation_key != own_key && schema_keys.contains(&abbreviation_key);

            if clashes_with_column || taken.contains(&abbreviation_key) {
                log.warn(format!(
                    "Glossary: `{}` not renamed to `{}`, the name is already used by another column",
                    column.name, entry.abbreviation
                ));
                continue;
            }

            taken.insert(abbreviation_key);
            if entry.abbreviation != column.name {
                column.rename = Some(entry.abbreviation.clone());
                renamed += 1;
                log.info(format!("Glossary: `{}` renamed to `{}`", column.name, entry.abbreviation));
            }
            if self.cast_glossary_types && entry.has_type() {
                column.cast = Some(entry.data_type.clone());
                log.info(format!("Glossary: `{}` cast to {}", column.output_name(), entry.data_type));
            }
        }

        log.info(format!("Glossary renamed {renamed} of {} column(s)", outer.len()));
        outer
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::{
        RunLog,
        composer::QueryComposer,
        glossary::{Glossary, GlossaryEntry},
        parser::ParsedQuery,
        ticket::RawQuery,
        unifier::{SchemaUnifier, Unification},
    };

    fn prepare(texts: &[&str]) -> (Vec<ParsedQuery>, Unification) {
        let queries: Vec<ParsedQuery> = texts
            .iter()
            .enumerate()
            .map(|(index, text)| {
                let slot = index as u32 + 1;
                ParsedQuery::resolve(&RawQuery::new(&format!("Query {slot}"), slot, text)).expect("Failed to resolve")
            })
            .collect();
        let unification = SchemaUnifier::unify(&queries, &mut RunLog::new()).expect("Failed to unify");
        (queries, unification)
    }

    #[test]
    pub fn test_compose_two_queries() {
        let (queries, unification) = prepare(&["SELECT x, y FROM t1", "SELECT x, z FROM t2"]);

        let unified = QueryComposer::new("out")
            .compose(&queries, &unification, None, &mut RunLog::new())
            .expect("Failed to compose");

        let expected = "WITH
cte1 AS (
    SELECT x, y FROM t1
),
cte2 AS (
    SELECT x, z FROM t2
)
SELECT *
FROM (
    SELECT x, y, NULL AS z FROM cte1
    UNION ALL
    SELECT x, NULL AS y, z FROM cte2
) AS out";
        assert_eq!(unified.sql, expected);
        assert_eq!(unified.output_columns, vec!["x", "y", "z"]);
    }

    #[test]
    pub fn test_compose_is_idempotent() {
        let (queries, unification) = prepare(&["SELECT a, b FROM t1", "SELECT b, c FROM t2 WHERE c > 1"]);
        let composer = QueryComposer::new("out");

        let first = composer.compose(&queries, &unification, None, &mut RunLog::new()).expect("Failed to compose");
        let second = composer.compose(&queries, &unification, None, &mut RunLog::new()).expect("Failed to compose");

        assert_eq!(first, second);
    }

    #[test]
    pub fn test_compose_with_glossary() {
        let (queries, unification) = prepare(&["SELECT x, y FROM t1", "SELECT x, z FROM t2"]);
        let glossary = Glossary::from_entries(vec![
            GlossaryEntry::new("x", "x_ab", "integer"),
            GlossaryEntry::new("z", "z_ab", ""),
        ]);

        let unified = QueryComposer::new("out")
            .compose(&queries, &unification, Some(&glossary), &mut RunLog::new())
            .expect("Failed to compose");

        assert!(unified.sql.contains("SELECT x AS x_ab, y, z AS z_ab\nFROM ("));
        assert_eq!(unified.output_columns, vec!["x_ab", "y", "z_ab"]);
    }

    #[test]
    pub fn test_compose_with_casts() {
        let (queries, unification) = prepare(&["SELECT x, y FROM t1"]);
        let glossary = Glossary::from_entries(vec![GlossaryEntry::new("x", "x_ab", "integer")]);

        let unified = QueryComposer::new("out")
            .with_glossary_casts(true)
            .compose(&queries, &unification, Some(&glossary), &mut RunLog::new())
            .expect("Failed to compose");

        assert!(unified.sql.contains("SELECT CAST(x AS integer) AS x_ab, y\nFROM ("));
    }

    #[test]
    pub fn test_rename_collision_is_skipped() {
        let (queries, unification) = prepare(&["SELECT x, y FROM t1"]);
        let glossary = Glossary::from_entries(vec![GlossaryEntry::new("x", "y", "")]);
        let mut log = RunLog::new();

        let unified = QueryComposer::new("out")
            .compose(&queries, &unification, Some(&glossary), &mut log)
            .expect("Failed to compose");

        assert!(unified.sql.contains("SELECT *\nFROM ("));
        assert!(log.has_warnings());
    }

    #[test]
    pub fn test_two_renames_to_same_abbreviation() {
        let (queries, unification) = prepare(&["SELECT x, y FROM t1"]);
        let glossary = Glossary::from_entries(vec![
            GlossaryEntry::new("x", "v", ""),
            GlossaryEntry::new("y", "V", ""),
        ]);

        let unified = QueryComposer::new("out")
            .compose(&queries, &unification, Some(&glossary), &mut RunLog::new())
            .expect("Failed to compose");

        assert_eq!(unified.output_columns, vec!["v", "y"]);
    }

    #[test]
    pub fn test_create_table_wrapping() {
        let (queries, unification) = prepare(&["SELECT a FROM t"]);

        let unified = QueryComposer::new("analytics.merged")
            .with_create_table(true)
            .compose(&queries, &unification, None, &mut RunLog::new())
            .expect("Failed to compose");

        assert!(unified.sql.starts_with("CREATE TABLE analytics.merged AS\nWITH\n"));
        assert!(unified.sql.ends_with(") AS merged;"));
    }

    #[test]
    pub fn test_expression_columns_are_quoted() {
        let (queries, unification) = prepare(&["SELECT count(*) FROM t", "SELECT id FROM u"]);

        let unified = QueryComposer::new("out")
            .compose(&queries, &unification, None, &mut RunLog::new())
            .expect("Failed to compose");

        assert!(unified.sql.contains("SELECT count(*) AS \"count(*)\" FROM t"));
        assert!(unified.sql.contains("SELECT \"count(*)\", NULL AS id FROM cte1"));
        assert!(unified.sql.contains("SELECT NULL AS \"count(*)\", id FROM cte2"));
    }

    #[test]
    pub fn test_custom_cte_prefix() {
        let (queries, unification) = prepare(&["SELECT a FROM t"]);

        let unified = QueryComposer::new("out")
            .with_cte_prefix("src_")
            .compose(&queries, &unification, None, &mut RunLog::new())
            .expect("Failed to compose");

        assert!(unified.sql.contains("src_1 AS (\n"));
        assert!(unified.sql.contains("FROM src_1\n) AS out"));
    }
}
