use crate::parser::{ParseError, QueryParser, StructureSplitter, WordComparer, sql_ident};

/// Words that can end an expression without being an alias for it.
const NON_ALIAS_WORDS: &[&str] = &[
    "END", "NULL", "TRUE", "FALSE", "DAY", "DAYS", "MONTH", "MONTHS", "YEAR", "YEARS",
    "HOUR", "HOURS", "MINUTE", "MINUTES", "SECOND", "SECONDS", "ZONE",
];

/// Keywords that take the following word as an operand, so that word is
/// never a bare alias (`a COLLATE "C"`, `x AT TIME ZONE tz`).
const OPERATOR_WORDS: &[&str] = &[
    "AND", "OR", "NOT", "IS", "IN", "LIKE", "ILIKE", "SIMILAR", "TO", "ESCAPE", "BETWEEN",
    "CASE", "WHEN", "THEN", "ELSE", "DISTINCT", "ALL", "ANY", "SOME", "EXISTS", "INTERVAL",
    "BY", "SELECT", "AT", "TIME", "ZONE", "COLLATE", "OVER", "AS", "FROM", "USING",
];

/// How the output name of a projection item was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameSource {
    /// `expr AS name` or `expr name`.
    Alias,
    /// Plain or table-qualified column reference.
    Reference,
    /// No usable identifier: the whole expression text is the name.
    Expression,
}

/// One projected column of a submitted query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    pub expression: String,
    pub output_name: String,
    pub name_source: NameSource,
}

impl ColumnRef {
    pub fn is_wildcard(item: &str) -> bool {
        let item = item.trim();
        item == "*" || (item.ends_with(".*") && sql_ident::last_reference_segment(&item[..item.len() - 2]).is_some())
    }

    pub fn resolve(item: &str) -> Result<ColumnRef, ParseError> {
        let item = item.trim();
        let mut parser = QueryParser::new(item);

        let mut alias_at = None;
        while !parser.eof() {
            if parser.is_top_level() && parser.comparers.alias.compare(&parser) {
                alias_at = Some(parser.position);
            }
            parser.next();
        }

        if let Some(alias_at) = alias_at {
            let expression = parser.text_from_range(0, alias_at).trim().to_string();
            let alias = parser
                .text_from_range(alias_at + parser.comparers.alias.length, parser.length)
                .trim()
                .to_string();

            if expression.is_empty() || !sql_ident::is_identifier(&alias) {
                return ParseError::span("invalid column alias", &parser, alias_at, parser.length)
                    .with_item(item)
                    .err();
            }

            return Ok(ColumnRef { expression, output_name: alias, name_source: NameSource::Alias });
        }

        if let Some((expression, alias)) = Self::split_trailing_alias(item) {
            return Ok(ColumnRef { expression, output_name: alias, name_source: NameSource::Alias });
        }

        if let Some(segment) = sql_ident::last_reference_segment(item) {
            return Ok(ColumnRef {
                expression: item.to_string(),
                output_name: segment,
                name_source: NameSource::Reference,
            });
        }

        // `(t.a)` is still named `a`; the alias is made explicit in the CTE body.
        let inner = StructureSplitter::strip_enclosing_parentheses(item);
        if inner != item {
            if let Some(segment) = sql_ident::last_reference_segment(inner) {
                return Ok(ColumnRef {
                    expression: item.to_string(),
                    output_name: segment,
                    name_source: NameSource::Alias,
                });
            }
        }

        Ok(ColumnRef {
            expression: item.to_string(),
            output_name: item.to_string(),
            name_source: NameSource::Expression,
        })
    }

    /// `coalesce(a, b) total` -> (`coalesce(a, b)`, `total`).
    fn split_trailing_alias(item: &str) -> Option<(String, String)> {
        let mut parser = QueryParser::new(item);
        let mut last_space = None;
        while !parser.eof() {
            if parser.is_top_level() && parser.current().is_whitespace() {
                last_space = Some(parser.position);
            }
            parser.next();
        }

        let last_space = last_space?;
        let expression = parser.text_from_range(0, last_space).trim().to_string();
        let alias = parser.text_from_range(last_space + 1, parser.length);

        if expression.is_empty() || !sql_ident::is_identifier(&alias) {
            return None;
        }

        if NON_ALIAS_WORDS.iter().any(|word| word.eq_ignore_ascii_case(&alias)) {
            return None;
        }

        let ends_operand = expression
            .chars()
            .last()
            .is_some_and(|ch| WordComparer::is_identifier_char(ch) || matches!(ch, ')' | '\'' | '"' | '`' | ']'));
        if !ends_operand {
            return None;
        }

        let last_word = expression
            .rsplit(|ch: char| !WordComparer::is_identifier_char(ch))
            .next()
            .unwrap_or_default();
        if OPERATOR_WORDS.iter().any(|word| word.eq_ignore_ascii_case(last_word)) {
            return None;
        }

        Some((expression, alias))
    }

    pub fn key(&self) -> String {
        sql_ident::name_key(&self.output_name)
    }

    /// The item as it appears in a CTE body: the expression, aliased when the
    /// name is not what the expression already produces.
    pub fn render(&self) -> String {
        match self.name_source {
            NameSource::Reference => self.expression.clone(),
            NameSource::Alias => format!("{} AS {}", self.expression, self.output_name),
            NameSource::Expression => {
                format!("{} AS {}", self.expression, sql_ident::render_identifier(&self.output_name))
            },
        }
    }
}
