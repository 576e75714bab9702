use crate::parser::QueryParser;

/// Case-insensitive keyword matcher anchored at the parser position.
///
/// A keyword only matches as a whole word: the preceding character must not
/// belong to an identifier and the following one must be whitespace, one of
/// the configured delimiters, or the end of the text when `eof` is allowed.
#[derive(Debug, Default)]
pub struct WordComparer {
    pub length: usize,
    pub word: Vec<char>,
    eof: bool,
    delimiters: Vec<char>,
}

impl WordComparer {
    pub fn new(word: &str) -> Self {
        let word: Vec<char> = word.to_uppercase().chars().collect();
        Self {
            length: word.len(),
            word,
            eof: false,
            delimiters: vec![],
        }
    }

    pub fn is_identifier_char(ch: char) -> bool {
        ch.is_alphanumeric() || ch == '_' || ch == '$'
    }

    pub fn is_block_delimiter(ch: char) -> bool {
        ch.is_whitespace()
    }

    pub fn is_any_delimiter(ch: char) -> bool {
        ch == ',' || ch == '(' || ch == ')' || ch == ';' || Self::is_block_delimiter(ch)
    }

    pub fn reach_eof(&self, parser: &QueryParser) -> bool {
        parser.position + self.length >= parser.length
    }

    pub fn compare(&self, parser: &QueryParser) -> bool {
        let previous = parser.previous();
        if Self::is_identifier_char(previous) || matches!(previous, '.' | '"' | '`') {
            return false;
        }

        for (offset, expected) in self.word.iter().enumerate() {
            if parser.peek(offset).to_ascii_uppercase() != *expected {
                return false;
            }
        }

        if self.reach_eof(parser) {
            return self.eof;
        }

        let next = parser.peek(self.length);
        Self::is_block_delimiter(next) || self.delimiters.contains(&next)
    }

    pub fn with_eof(mut self) -> Self { self.eof = true; self }
    pub fn with_delimiter(mut self, delimiter: char) -> Self { self.delimiters.push(delimiter); self }
    pub fn with_any_delimiter_postfix(mut self) -> Self {
        self.delimiters.extend([',', '(', ')', ';']);
        self
    }
}
