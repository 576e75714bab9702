use crate::parser::{QueryParser, WordComparer};

#[derive(Debug)]
pub struct QueryComparers {
    pub select: WordComparer,
    pub with: WordComparer,
    pub distinct: WordComparer,
    pub all: WordComparer,
    pub alias: WordComparer,
    pub from: WordComparer,
    pub union: WordComparer,
    pub intersect: WordComparer,
    pub except: WordComparer,
}

impl Default for QueryComparers {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryComparers {
    pub fn new() -> Self {
        Self {
            select: WordComparer::new("SELECT").with_any_delimiter_postfix(),
            with: WordComparer::new("WITH"),
            distinct: WordComparer::new("DISTINCT").with_delimiter('('),
            all: WordComparer::new("ALL"),
            alias: WordComparer::new("AS").with_eof().with_delimiter('"').with_delimiter('`'),
            from: WordComparer::new("FROM").with_delimiter('('),
            union: WordComparer::new("UNION").with_delimiter('('),
            intersect: WordComparer::new("INTERSECT").with_delimiter('('),
            except: WordComparer::new("EXCEPT").with_delimiter('('),
        }
    }

    pub fn is_set_operation(&self, parser: &QueryParser) -> bool {
        self.union.compare(parser) || self.intersect.compare(parser) || self.except.compare(parser)
    }
}
