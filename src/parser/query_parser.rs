use crate::parser::QueryComparers;

/// Character cursor over a single query text.
///
/// Stepping with [`QueryParser::next`] keeps track of the parenthesis depth
/// and of string/quoted-identifier state, so callers can restrict keyword and
/// comma lookups to the top level of the query.
#[derive(Debug, Default)]
pub struct QueryParser {
    pub position: usize,
    pub length: usize,
    pub text_v: Vec<char>,
    pub text: String,
    pub parentheses_depth: usize,
    pub quote: Option<char>,
    escaped: bool,

    pub comparers: QueryComparers,
}

impl QueryParser {
    pub fn new(query: &str) -> Self {
        let text_v: Vec<char> = query.chars().collect();
        Self {
            length: text_v.len(),
            text_v,
            text: query.to_string(),
            comparers: QueryComparers::new(),
            ..Default::default()
        }
    }

    pub fn eof(&self) -> bool {
        self.position >= self.length
    }

    fn char_at(&self, index: usize) -> char {
        if index < self.length {
            return self.text_v[index];
        }

        '\0'
    }

    pub fn current(&self) -> char {
        self.char_at(self.position)
    }

    pub fn peek(&self, ahead: usize) -> char {
        self.char_at(self.position + ahead)
    }

    pub fn previous(&self) -> char {
        if self.position == 0 {
            return '\0';
        }
        self.char_at(self.position - 1)
    }

    pub fn in_quote(&self) -> bool {
        self.quote.is_some()
    }

    /// True when the current character sits outside any parenthesis and
    /// outside any quoted text.
    pub fn is_top_level(&self) -> bool {
        self.parentheses_depth == 0 && self.quote.is_none()
    }

    /// Moves one character forward, applying the current character to the
    /// quote and parenthesis state.
    pub fn next(&mut self) {
        if self.eof() {
            return;
        }

        let current = self.current();
        match self.quote {
            Some(_) if self.escaped => self.escaped = false,
            Some(quote) if current == quote => {
                // '' inside a literal is an escaped quote, not the terminator
                if self.peek(1) == quote {
                    self.escaped = true;
                } else {
                    self.quote = None;
                }
            },
            Some(_) => {},
            None => match current {
                '\'' | '"' | '`' => self.quote = Some(current),
                '(' => self.parentheses_depth += 1,
                ')' => self.parentheses_depth = self.parentheses_depth.saturating_sub(1),
                _ => {},
            },
        }

        self.position += 1;
    }

    pub fn next_non_whitespace(&mut self) {
        while !self.eof() && self.current().is_whitespace() {
            self.next();
        }
    }

    /// Moves forward without touching quote or parenthesis state. Only used to
    /// skip over text already known to be neutral (keywords, comments).
    pub fn jump(&mut self, ahead: usize) {
        self.position = (self.position + ahead).min(self.length);
    }

    /// Steps forward until `stop` holds at a top-level position.
    /// Returns false when the end of the text is reached first.
    pub fn seek_top_level(&mut self, stop: impl Fn(&QueryParser) -> bool) -> bool {
        while !self.eof() {
            if self.is_top_level() && stop(self) {
                return true;
            }
            self.next();
        }

        false
    }

    pub fn text_from_range(&self, start: usize, end: usize) -> String {
        let end = end.min(self.length);
        let start = start.min(end);
        self.text_v[start..end].iter().collect()
    }

    pub fn text_from_pivot(&self, pivot: usize) -> String {
        self.text_from_range(pivot, self.position)
    }

    pub fn rest(&self) -> String {
        self.text_from_range(self.position, self.length)
    }
}
