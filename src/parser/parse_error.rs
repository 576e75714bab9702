use std::fmt::Display;

use crate::parser::QueryParser;

/// Positional failure raised while splitting a query into its structural parts.
///
/// `start`/`end` are char offsets into the text being parsed; when the failure
/// is inside one projection item, `item` holds that item.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub item: Option<String>,
}

impl ParseError {
    pub fn new(message: &str, pivot: usize, parser: &QueryParser) -> Self {
        Self::span(message, parser, pivot, parser.position + 1)
    }

    /// Error covering `start..end` of the parser text.
    pub fn span(message: &str, parser: &QueryParser, start: usize, end: usize) -> Self {
        let end = end.min(parser.length);
        Self {
            message: message.to_string(),
            text: parser.text_from_range(start, end),
            start,
            end,
            item: None,
        }
    }

    pub fn with_item(mut self, item: &str) -> Self {
        self.item = Some(item.to_string());
        self
    }

    pub fn err<T>(self) -> Result<T, ParseError> {
        Err(self)
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at [{}:{}] -> '{}'", self.message, self.start, self.end, self.text)?;
        if let Some(item) = &self.item {
            write!(f, " in projection item `{item}`")?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}
