//! Minimal structural split of a `SELECT` statement.
//!
//! Only the outermost `SELECT ... FROM ...` is located; expressions, nested
//! subqueries and the source clause are kept as opaque text. Everything the
//! rest of the crate needs from SQL syntax goes through
//! [`StructureSplitter::locate_top_level_select`],
//! [`StructureSplitter::locate_top_level_from`] and
//! [`StructureSplitter::split_top_level_projection`].

use crate::parser::{ParseError, QueryParser};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectStructure {
    /// Leading `WITH ...` clause, verbatim.
    pub prelude: Option<String>,
    /// `DISTINCT` or `ALL`, as written.
    pub modifier: Option<String>,
    pub projection: String,
    pub from_clause: String,
    /// The source clause contains a top-level UNION/INTERSECT/EXCEPT.
    pub has_set_operation: bool,
}

pub struct StructureSplitter;

impl StructureSplitter {
    pub fn split(text: &str) -> Result<SelectStructure, ParseError> {
        let text = Self::strip_enclosing_parentheses(text);
        let mut parser = QueryParser::new(text);

        let select_at = Self::locate_top_level_select(&mut parser)?;
        let prelude = match parser.text_from_range(0, select_at).trim() {
            "" => None,
            prelude => Some(prelude.to_string()),
        };

        parser.jump(parser.comparers.select.length);
        parser.next_non_whitespace();

        let modifier_length = [&parser.comparers.distinct, &parser.comparers.all]
            .into_iter()
            .find(|comparer| comparer.compare(&parser))
            .map(|comparer| comparer.length);

        let mut modifier = None;
        if let Some(length) = modifier_length {
            modifier = Some(parser.text_from_range(parser.position, parser.position + length));
            parser.jump(length);
            parser.next_non_whitespace();
        }

        let projection_start = parser.position;
        let from_at = Self::locate_top_level_from(&mut parser)?;
        let projection = parser.text_from_range(projection_start, from_at).trim().to_string();
        if projection.is_empty() {
            return ParseError::new("empty projection list", projection_start, &parser).err();
        }

        parser.jump(parser.comparers.from.length);
        let from_start = parser.position;
        let from_clause = parser.rest().trim().to_string();
        if from_clause.is_empty() {
            return ParseError::new("empty FROM clause", from_start, &parser).err();
        }

        let has_set_operation = parser.seek_top_level(|p| p.comparers.is_set_operation(p));

        Ok(SelectStructure { prelude, modifier, projection, from_clause, has_set_operation })
    }

    /// Positions the parser on the outermost `SELECT` keyword, skipping a
    /// leading `WITH` clause.
    pub fn locate_top_level_select(parser: &mut QueryParser) -> Result<usize, ParseError> {
        parser.next_non_whitespace();
        let pivot = parser.position;

        if parser.comparers.select.compare(parser) {
            return Ok(parser.position);
        }

        if parser.comparers.with.compare(parser)
            && parser.seek_top_level(|p| p.comparers.select.compare(p)) {
            return Ok(parser.position);
        }

        ParseError::new("cannot locate a top-level SELECT", pivot, parser).err()
    }

    /// Positions the parser on the first top-level `FROM` keyword.
    pub fn locate_top_level_from(parser: &mut QueryParser) -> Result<usize, ParseError> {
        let pivot = parser.position;

        if parser.seek_top_level(|p| p.comparers.from.compare(p)) {
            return Ok(parser.position);
        }

        ParseError::new("cannot locate a top-level FROM", pivot, parser).err()
    }

    /// Splits a projection list on commas that sit outside parentheses and
    /// quoted text.
    pub fn split_top_level_projection(projection: &str) -> Result<Vec<String>, ParseError> {
        let mut parser = QueryParser::new(projection);
        let mut items = vec![];
        let mut pivot = 0;

        loop {
            let found = parser.seek_top_level(|p| p.current() == ',');

            let item = parser.text_from_pivot(pivot).trim().to_string();
            if item.is_empty() {
                return ParseError::new("empty projection item", pivot, &parser).err();
            }
            items.push(item);

            if !found {
                break;
            }

            parser.next();
            pivot = parser.position;
        }

        Ok(items)
    }

    /// `(SELECT ...)` -> `SELECT ...` when the outer pair wraps the whole text.
    pub fn strip_enclosing_parentheses(text: &str) -> &str {
        let mut text = text.trim();

        while text.starts_with('(') && text.ends_with(')') {
            let mut parser = QueryParser::new(text);
            let mut matching = None;
            while !parser.eof() {
                if parser.current() == ')' && parser.parentheses_depth == 1 && !parser.in_quote() {
                    matching = Some(parser.position);
                    break;
                }
                parser.next();
            }

            if matching != Some(parser.length - 1) {
                break;
            }
            text = text[1..text.len() - 1].trim();
        }

        text
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::{QueryParser, StructureSplitter};

    #[test]
    pub fn test_split_simple() {
        let result = StructureSplitter::split("SELECT a, b FROM t WHERE a > 1").expect("Failed to split query");

        assert_eq!(result.projection, "a, b");
        assert_eq!(result.from_clause, "t WHERE a > 1");
        assert_eq!(result.prelude, None);
        assert_eq!(result.modifier, None);
        assert!(!result.has_set_operation);
    }

    #[test]
    pub fn test_split_lowercase_keywords() {
        let result = StructureSplitter::split("select a from t").expect("Failed to split query");

        assert_eq!(result.projection, "a");
        assert_eq!(result.from_clause, "t");
    }

    #[test]
    pub fn test_split_distinct() {
        let result = StructureSplitter::split("SELECT DISTINCT a FROM t").expect("Failed to split query");

        assert_eq!(result.modifier.as_deref(), Some("DISTINCT"));
        assert_eq!(result.projection, "a");
    }

    #[test]
    pub fn test_split_nested_from_is_skipped() {
        let text = "SELECT (SELECT max(x) FROM u) AS m, b FROM t";

        let result = StructureSplitter::split(text).expect("Failed to split query");

        assert_eq!(result.projection, "(SELECT max(x) FROM u) AS m, b");
        assert_eq!(result.from_clause, "t");
    }

    #[test]
    pub fn test_split_from_in_literal_is_skipped() {
        let result = StructureSplitter::split("SELECT 'from' AS f FROM t").expect("Failed to split query");

        assert_eq!(result.projection, "'from' AS f");
    }

    #[test]
    pub fn test_split_with_prelude() {
        let text = "WITH base AS (SELECT a FROM t) SELECT a FROM base";

        let result = StructureSplitter::split(text).expect("Failed to split query");

        assert_eq!(result.prelude.as_deref(), Some("WITH base AS (SELECT a FROM t)"));
        assert_eq!(result.projection, "a");
        assert_eq!(result.from_clause, "base");
    }

    #[test]
    pub fn test_split_enclosing_parentheses() {
        let result = StructureSplitter::split("(SELECT a FROM t)").expect("Failed to split query");

        assert_eq!(result.projection, "a");
        assert_eq!(result.from_clause, "t");
    }

    #[test]
    pub fn test_split_set_operation_flagged() {
        let result = StructureSplitter::split("SELECT a FROM t UNION ALL SELECT a FROM u").expect("Failed to split query");

        assert_eq!(result.from_clause, "t UNION ALL SELECT a FROM u");
        assert!(result.has_set_operation);
    }

    #[test]
    pub fn test_split_without_select() {
        let result = StructureSplitter::split("UPDATE t SET a = 1");

        match result {
            Ok(_) => panic!(),
            Err(err) => {
                assert_eq!(err.message, "cannot locate a top-level SELECT");
                assert_eq!(err.start, 0);
            },
        }
    }

    #[test]
    pub fn test_split_without_from() {
        let result = StructureSplitter::split("SELECT 1, 2");

        match result {
            Ok(_) => panic!(),
            Err(err) => assert_eq!(err.message, "cannot locate a top-level FROM"),
        }
    }

    #[test]
    pub fn test_split_empty_projection() {
        let result = StructureSplitter::split("SELECT FROM t");

        match result {
            Ok(_) => panic!(),
            Err(err) => assert_eq!(err.message, "empty projection list"),
        }
    }

    #[test]
    pub fn test_locate_top_level_from_position() {
        let mut parser = QueryParser::new("SELECT f(a, b) FROM t");

        let position = StructureSplitter::locate_top_level_from(&mut parser).expect("Failed to locate FROM");

        assert_eq!(position, 15);
    }

    #[test]
    pub fn test_split_projection_top_level_commas() {
        let items = StructureSplitter::split_top_level_projection("a, coalesce(b, c) AS d, 'x,y' AS e")
            .expect("Failed to split projection");

        assert_eq!(items, vec!["a", "coalesce(b, c) AS d", "'x,y' AS e"]);
    }

    #[test]
    pub fn test_split_projection_case_expression() {
        let items = StructureSplitter::split_top_level_projection("CASE WHEN a > 1 THEN 'x' ELSE 'y' END AS k, b")
            .expect("Failed to split projection");

        assert_eq!(items.len(), 2);
    }

    #[test]
    pub fn test_split_projection_empty_item() {
        let result = StructureSplitter::split_top_level_projection("a, , b");

        match result {
            Ok(_) => panic!(),
            Err(err) => {
                assert_eq!(err.message, "empty projection item");
                assert_eq!(err.start, 2);
            },
        }
    }

    #[test]
    pub fn test_split_projection_trailing_comma() {
        let result = StructureSplitter::split_top_level_projection("a, b,");

        assert!(result.is_err());
    }
}
