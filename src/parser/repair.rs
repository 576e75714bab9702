use std::fmt;

use crate::parser::QueryParser;

/// A best-effort syntactic fix applied to a submitted query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repair {
    StrippedComments,
    NormalizedWhitespace,
    StrippedSemicolons,
    ClosedParenthesis,
}

impl fmt::Display for Repair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Repair::StrippedComments => write!(f, "removed SQL comments"),
            Repair::NormalizedWhitespace => write!(f, "normalized whitespace"),
            Repair::StrippedSemicolons => write!(f, "removed trailing semicolon"),
            Repair::ClosedParenthesis => write!(f, "closed an unmatched parenthesis"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RepairedQuery {
    pub text: String,
    pub repairs: Vec<Repair>,
    /// Text of a second statement found after a top-level `;`.
    pub extra_statement: Option<String>,
    /// Parentheses are still unbalanced after repair.
    pub unbalanced: bool,
}

pub struct QueryRepairer;

impl QueryRepairer {
    pub fn repair(text: &str) -> RepairedQuery {
        let mut repairs = vec![];

        // comments go first: once newlines are collapsed a `--` comment
        // would swallow the rest of the query
        let uncommented = Self::strip_comments(text);
        if uncommented != text {
            repairs.push(Repair::StrippedComments);
        }

        let normalized = Self::normalize_whitespace(&uncommented);
        if normalized != uncommented.trim() {
            repairs.push(Repair::NormalizedWhitespace);
        }

        let (statement, extra_statement) = Self::split_statements(&normalized);
        if statement != normalized {
            repairs.push(Repair::StrippedSemicolons);
        }

        let (text, unbalanced) = match Self::parentheses_balance(&statement) {
            (1, false) => {
                repairs.push(Repair::ClosedParenthesis);
                (format!("{statement})"), false)
            },
            (0, false) => (statement, false),
            _ => (statement, true),
        };

        RepairedQuery { text, repairs, extra_statement, unbalanced }
    }

    pub fn strip_comments(text: &str) -> String {
        let mut parser = QueryParser::new(text);
        let mut result = String::with_capacity(text.len());

        while !parser.eof() {
            let current = parser.current();

            if !parser.in_quote() && current == '-' && parser.peek(1) == '-' {
                while !parser.eof() && parser.current() != '\n' {
                    parser.jump(1);
                }
                continue;
            }

            if !parser.in_quote() && current == '/' && parser.peek(1) == '*' {
                parser.jump(2);
                while !parser.eof() && !(parser.current() == '*' && parser.peek(1) == '/') {
                    parser.jump(1);
                }
                parser.jump(2);
                result.push(' ');
                continue;
            }

            result.push(current);
            parser.next();
        }

        result
    }

    /// Collapses whitespace runs outside quoted text into a single space and
    /// trims both ends.
    pub fn normalize_whitespace(text: &str) -> String {
        let mut parser = QueryParser::new(text);
        let mut result = String::with_capacity(text.len());
        let mut pending_space = false;

        while !parser.eof() {
            let current = parser.current();

            if !parser.in_quote() && current.is_whitespace() {
                pending_space = !result.is_empty();
                parser.next();
                continue;
            }

            if pending_space {
                result.push(' ');
                pending_space = false;
            }

            result.push(current);
            parser.next();
        }

        result
    }

    /// Splits off everything after the first top-level `;`. The remainder is
    /// returned only when it holds something other than semicolons.
    pub fn split_statements(text: &str) -> (String, Option<String>) {
        let mut parser = QueryParser::new(text);

        if !parser.seek_top_level(|p| p.current() == ';') {
            return (text.to_string(), None);
        }

        let statement = parser.text_from_pivot(0).trim_end().to_string();
        let rest = parser.rest();
        let remainder = rest.trim_matches(|ch: char| ch == ';' || ch.is_whitespace());

        match remainder.is_empty() {
            true => (statement, None),
            false => (statement, Some(remainder.to_string())),
        }
    }

    /// Returns the open-parenthesis surplus at the end of the text and whether
    /// a closing parenthesis ever appeared without a matching opener.
    pub fn parentheses_balance(text: &str) -> (i64, bool) {
        let mut parser = QueryParser::new(text);
        let mut depth: i64 = 0;
        let mut went_negative = false;

        while !parser.eof() {
            if !parser.in_quote() {
                match parser.current() {
                    '(' => depth += 1,
                    ')' => {
                        depth -= 1;
                        went_negative |= depth < 0;
                    },
                    _ => {},
                }
            }
            parser.next();
        }

        (depth, went_negative)
    }
}
