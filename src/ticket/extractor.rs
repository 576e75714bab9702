use once_cell::sync::Lazy;
use regex::Regex;

use crate::{UnifierConfig, UnifyError, UnifyResult, ticket::RawQuery};

/// Placeholder GitHub issue forms write into optional fields left empty.
const NO_RESPONSE: &str = "_No response_";

static TABLE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\p{Alphabetic}_][\p{Alphabetic}\p{N}_]*(?:\.[\p{Alphabetic}_][\p{Alphabetic}\p{N}_]*)*$")
        .expect("valid table name pattern")
});

/// Query blocks and target table pulled out of a ticket body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedTicket {
    pub queries: Vec<RawQuery>,
    pub table_name: String,
    /// The ticket did not name a table and the configured default was used.
    pub table_name_defaulted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    Slot(u32),
    Table,
}

/// Splits a ticket body on labelled fields (`Query 1:`, `Query 2:`, ...,
/// `Nome da tabela final:`). A field runs until the next label.
#[derive(Debug, Clone)]
pub struct QueryExtractor {
    query_label: String,
    slot_pattern: Regex,
    table_pattern: Regex,
    default_table_name: String,
}

impl QueryExtractor {
    pub fn new(query_label: &str, table_label: &str, default_table_name: &str) -> UnifyResult<Self> {
        let query_label = query_label.trim();
        let table_label = table_label.trim().trim_end_matches(':');

        if query_label.is_empty() || table_label.is_empty() {
            return Err(UnifyError::validation("ticket field labels must not be empty"));
        }

        let slot_pattern = Self::label_pattern(&format!(r"{}[ \t]*(\d+)", regex::escape(query_label)))?;
        let table_pattern = Self::label_pattern(&regex::escape(table_label))?;

        Ok(Self {
            query_label: query_label.to_string(),
            slot_pattern,
            table_pattern,
            default_table_name: default_table_name.to_string(),
        })
    }

    pub fn from_config(config: &UnifierConfig) -> UnifyResult<Self> {
        Self::new(&config.query_label, &config.table_label, &config.default_table_name)
    }

    /// A label at the start of a line, optionally behind markdown heading
    /// markers or bold markers, followed by a colon.
    fn label_pattern(label: &str) -> UnifyResult<Regex> {
        let pattern = format!(r"(?mi)^[ \t]*(?:#+[ \t]*)?(?:\*\*)?{label}[ \t]*:(?:\*\*)?");
        Regex::new(&pattern).map_err(|err| UnifyError::validation(format!("invalid ticket label: {err}")))
    }

    pub fn extract(&self, body: &str) -> UnifyResult<ExtractedTicket> {
        let mut markers: Vec<(usize, usize, Marker)> = vec![];

        for captures in self.slot_pattern.captures_iter(body) {
            let (Some(whole), Some(number)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            let slot = number
                .as_str()
                .parse::<u32>()
                .map_err(|_| UnifyError::validation(format!("invalid query slot number `{}`", number.as_str())))?;
            markers.push((whole.start(), whole.end(), Marker::Slot(slot)));
        }

        for found in self.table_pattern.find_iter(body) {
            markers.push((found.start(), found.end(), Marker::Table));
        }

        markers.sort_by_key(|(start, _, _)| *start);

        let mut queries: Vec<RawQuery> = vec![];
        let mut seen_slots: Vec<u32> = vec![];
        let mut table_name: Option<String> = None;

        for (index, (_, end, marker)) in markers.iter().enumerate() {
            let field_end = markers.get(index + 1).map_or(body.len(), |(start, _, _)| *start);
            let field = Self::clean_field(&body[*end..field_end]);

            match marker {
                Marker::Slot(slot) => {
                    if seen_slots.contains(slot) {
                        return Err(UnifyError::validation(format!(
                            "{} {} appears more than once in the ticket",
                            self.query_label, slot
                        )));
                    }
                    seen_slots.push(*slot);
                    if field.is_empty() {
                        continue;
                    }
                    let label = format!("{} {}", self.query_label, slot);
                    queries.push(RawQuery::new(&label, *slot, &field));
                },
                Marker::Table => {
                    if table_name.is_none() {
                        table_name = field.split_whitespace().next().map(|name| name.trim_matches('`').to_string());
                    }
                },
            }
        }

        if queries.is_empty() {
            return Err(UnifyError::validation(format!(
                "no query found in the ticket; expected fields like `{} 1:`",
                self.query_label
            )));
        }

        queries.sort_by_key(|query| query.slot);

        let table_name_defaulted = table_name.is_none();
        let table_name = table_name.unwrap_or_else(|| self.default_table_name.clone());
        if !TABLE_NAME.is_match(&table_name) {
            return Err(UnifyError::validation(format!("invalid final table name `{table_name}`")));
        }

        Ok(ExtractedTicket { queries, table_name, table_name_defaulted })
    }

    /// Drops code fence lines and the issue-form placeholder, then trims.
    fn clean_field(field: &str) -> String {
        let text = field
            .lines()
            .filter(|line| !line.trim_start().starts_with("```"))
            .collect::<Vec<_>>()
            .join("\n");
        let text = text.trim();

        if text == NO_RESPONSE {
            return String::new();
        }

        text.to_string()
    }
}
