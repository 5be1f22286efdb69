//! SQL escaping helpers
//!
//! Identifiers are quoted with backticks and literals with single quotes,
//! the MySQL flavor every rendered statement targets.

/// Quote an identifier with backticks.
///
/// Embedded backticks are doubled and dotted names are quoted per part, so
/// `issue.id` becomes `` `issue`.`id` ``.
pub fn escape_id(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    for (i, part) in name.split('.').enumerate() {
        if i > 0 {
            out.push('.');
        }
        out.push('`');
        out.push_str(&part.replace('`', "``"));
        out.push('`');
    }
    out
}

/// Quote a string literal with single quotes, backslash-escaping control
/// characters and quotes.
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\0' => out.push_str("\\0"),
            '\u{8}' => out.push_str("\\b"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{1a}' => out.push_str("\\Z"),
            '"' => out.push_str("\\\""),
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            other => out.push(other),
        }
    }
    out.push('\'');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_id_simple() {
        assert_eq!(escape_id("abc"), "`abc`");
    }

    #[test]
    fn test_escape_id_qualified() {
        assert_eq!(escape_id("issue.id"), "`issue`.`id`");
    }

    #[test]
    fn test_escape_id_embedded_backtick() {
        assert_eq!(escape_id("we`ird"), "`we``ird`");
    }

    #[test]
    fn test_escape_literal() {
        assert_eq!(escape("abc"), "'abc'");
        assert_eq!(escape("it's"), "'it\\'s'");
        assert_eq!(escape("a\nb"), "'a\\nb'");
        assert_eq!(escape("back\\slash"), "'back\\\\slash'");
    }
}
