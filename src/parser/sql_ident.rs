use once_cell::sync::Lazy;
use regex::Regex;

/// Same character classes as `WordComparer::is_identifier_char`.
const PLAIN: &str = r"[\p{Alphabetic}_][\p{Alphabetic}\p{N}_$]*";
const IDENT: &str = r#"(?:[\p{Alphabetic}_][\p{Alphabetic}\p{N}_$]*|"(?:[^"]|"")+"|`[^`]+`)"#;

static PLAIN_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("^{PLAIN}$")).expect("valid identifier pattern"));

static QUOTED_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^(?:"(?:[^"]|"")+"|`[^`]+`)$"#).expect("valid quoted identifier pattern"));

static COLUMN_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^(?:{IDENT}\.)*({IDENT})$")).expect("valid column reference pattern")
});

pub fn is_plain_identifier(name: &str) -> bool {
    PLAIN_IDENTIFIER.is_match(name)
}

pub fn is_quoted_identifier(name: &str) -> bool {
    QUOTED_IDENTIFIER.is_match(name)
}

pub fn is_identifier(name: &str) -> bool {
    is_plain_identifier(name) || is_quoted_identifier(name)
}

/// Trailing name of a plain or table-qualified column reference
/// (`t.col` -> `col`, `s.t."Col"` -> `"Col"`). `None` for anything else.
pub fn last_reference_segment(expression: &str) -> Option<String> {
    COLUMN_REFERENCE
        .captures(expression)
        .and_then(|captures| captures.get(1))
        .map(|segment| segment.as_str().to_string())
}

/// Lookup key used for case-insensitive name comparison. The original text is
/// kept alongside wherever the name is stored.
pub fn name_key(name: &str) -> String {
    let trimmed = name.trim();
    let unquoted = if is_quoted_identifier(trimmed) {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    };

    unquoted.to_lowercase()
}

/// Renders a column name so it can be referenced from an enclosing query.
/// Expression-derived names such as `count(*)` are double-quoted.
pub fn render_identifier(name: &str) -> String {
    if is_identifier(name) {
        return name.to_string();
    }

    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    pub fn test_plain_identifier() {
        assert!(is_identifier("customer_id"));
        assert!(is_identifier("_tmp$1"));
        assert!(!is_identifier("1st"));
        assert!(!is_identifier("a+b"));
    }

    #[test]
    pub fn test_unicode_identifier() {
        assert!(is_identifier("descrição"));
        assert!(is_identifier("preço_médio"));
        assert!(is_identifier("Ação2"));
        assert!(!is_identifier("2ação"));
        assert_eq!(last_reference_segment("t.descrição"), Some("descrição".to_string()));
        assert_eq!(name_key("PREÇO"), "preço");
    }

    #[test]
    pub fn test_quoted_identifier() {
        assert!(is_identifier("\"Customer Name\""));
        assert!(is_identifier("`order`"));
        assert!(!is_identifier("\"open"));
    }

    #[test]
    pub fn test_last_reference_segment() {
        assert_eq!(last_reference_segment("col"), Some("col".to_string()));
        assert_eq!(last_reference_segment("t.col"), Some("col".to_string()));
        assert_eq!(last_reference_segment("db.t.\"My Col\""), Some("\"My Col\"".to_string()));
        assert_eq!(last_reference_segment("t.col + 1"), None);
        assert_eq!(last_reference_segment("upper(t.col)"), None);
    }

    #[test]
    pub fn test_name_key() {
        assert_eq!(name_key("Total"), "total");
        assert_eq!(name_key("\"Total\""), "total");
        assert_eq!(name_key("COUNT(*)"), "count(*)");
    }

    #[test]
    pub fn test_render_identifier() {
        assert_eq!(render_identifier("total"), "total");
        assert_eq!(render_identifier("\"Total\""), "\"Total\"");
        assert_eq!(render_identifier("count(*)"), "\"count(*)\"");
        assert_eq!(render_identifier("a\"b"), "\"a\"\"b\"");
    }
}
