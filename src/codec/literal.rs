//! Lexing of SQL literals as produced by the encoders of every dialect.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::{Result, TypeError};
use crate::quoting::EscapeMode;

static NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\A[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?\z")
        .unwrap_or_else(|e| panic!("invalid number pattern: {e}"))
});

/// Token a literal reduces to before the target type gives it meaning.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Boolean(bool),
    /// Bare numeric token, `9e999` included
    Number(String),
    /// Unescaped body of a quoted string
    Text(String),
    /// Hex digits of `X'..'`, `0x..` or `hextoraw('..')`
    Hex(String),
    /// Digits of `B'..'`
    Bits(String),
    /// Named float constant such as `BINARY_DOUBLE_NAN`
    Special(f64),
}

/// `'a''b'::text` -> `'a''b'`; only a cast after the last quote counts.
fn strip_cast(text: &str) -> &str {
    let tail = text.rfind('\'').map_or(0, |i| i + 1);
    match text[tail..].find("::") {
        Some(pos) => text[..tail + pos].trim_end(),
        None => text,
    }
}

fn unescape_backslash(ch: char) -> char {
    match ch {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        'b' => '\u{8}',
        'f' => '\u{c}',
        other => other,
    }
}

/// Body of `'...'`, with `''` and (when enabled) backslash escapes undone.
fn unquote(quoted: &str, backslashes: bool) -> Option<String> {
    let inner = quoted.strip_prefix('\'')?.strip_suffix('\'')?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\'' => {
                if chars.next()? != '\'' {
                    return None;
                }
                out.push('\'');
            }
            '\\' if backslashes => out.push(unescape_backslash(chars.next()?)),
            other => out.push(other),
        }
    }
    Some(out)
}

fn split_prefixed(text: &str) -> Option<(char, &str)> {
    let mut chars = text.chars();
    let prefix = chars.next()?;
    let rest = chars.as_str();
    (prefix.is_ascii_alphabetic() && rest.starts_with('\'')).then_some((prefix.to_ascii_uppercase(), rest))
}

pub fn parse_literal(text: &str, mode: EscapeMode) -> Result<Literal> {
    let malformed = || TypeError::malformed("SQL literal", text);
    let literal = strip_cast(text.trim());
    let backslashes = mode == EscapeMode::BackslashEscaping;

    if literal.starts_with('\'') {
        return unquote(literal, backslashes).map(Literal::Text).ok_or_else(malformed);
    }
    if let Some((prefix, quoted)) = split_prefixed(literal) {
        return match prefix {
            'E' => unquote(quoted, true).map(Literal::Text),
            'N' => unquote(quoted, backslashes).map(Literal::Text),
            'B' => unquote(quoted, false).map(Literal::Bits),
            'X' => unquote(quoted, false).map(Literal::Hex),
            _ => None,
        }
        .ok_or_else(malformed);
    }

    let upper = literal.to_ascii_uppercase();
    if let Some(inner) = upper.strip_prefix("HEXTORAW(").and_then(|rest| rest.strip_suffix(')')) {
        let start = literal.len() - inner.len() - 1;
        return unquote(literal[start..literal.len() - 1].trim(), false)
            .map(Literal::Hex)
            .ok_or_else(malformed);
    }
    if upper.starts_with("0X") {
        return Ok(Literal::Hex(literal[2..].to_string()));
    }

    match upper.as_str() {
        "NULL" => Ok(Literal::Null),
        "TRUE" => Ok(Literal::Boolean(true)),
        "FALSE" => Ok(Literal::Boolean(false)),
        "BINARY_DOUBLE_INFINITY" => Ok(Literal::Special(f64::INFINITY)),
        "-BINARY_DOUBLE_INFINITY" => Ok(Literal::Special(f64::NEG_INFINITY)),
        "BINARY_DOUBLE_NAN" => Ok(Literal::Special(f64::NAN)),
        _ if NUMBER.is_match(literal) => Ok(Literal::Number(literal.to_string())),
        _ => Err(malformed()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Literal {
        parse_literal(text, EscapeMode::Standard).unwrap()
    }

    #[test]
    fn test_quoted_strings() {
        assert_eq!(parse("'it''s'"), Literal::Text("it's".into()));
        assert_eq!(parse("'a\\b'"), Literal::Text("a\\b".into()));
        assert_eq!(parse("N'ünï'"), Literal::Text("ünï".into()));
        assert_eq!(parse("''"), Literal::Text(String::new()));
        assert!(parse_literal("'unterminated", EscapeMode::Standard).is_err());
        assert!(parse_literal("'a'b'", EscapeMode::Standard).is_err());
    }

    #[test]
    fn test_backslash_mode() {
        let parsed = parse_literal("'a\\\\b''c\\n'", EscapeMode::BackslashEscaping).unwrap();
        assert_eq!(parsed, Literal::Text("a\\b'c\n".into()));
        assert_eq!(parse("E'\\\\x01ab'::bytea"), Literal::Text("\\x01ab".into()));
    }

    #[test]
    fn test_binary_forms() {
        assert_eq!(parse("x'01ab'"), Literal::Hex("01ab".into()));
        assert_eq!(parse("X'1F'"), Literal::Hex("1F".into()));
        assert_eq!(parse("0x01ab"), Literal::Hex("01ab".into()));
        assert_eq!(parse("hextoraw('01ab')"), Literal::Hex("01ab".into()));
        assert_eq!(parse("B'0101'"), Literal::Bits("0101".into()));
    }

    #[test]
    fn test_bare_tokens() {
        assert_eq!(parse("NULL"), Literal::Null);
        assert_eq!(parse("true"), Literal::Boolean(true));
        assert_eq!(parse("-12.5e3"), Literal::Number("-12.5e3".into()));
        assert_eq!(parse("9e999"), Literal::Number("9e999".into()));
        assert_eq!(parse("42::bigint"), Literal::Number("42".into()));
        assert_eq!(parse("-BINARY_DOUBLE_INFINITY"), Literal::Special(f64::NEG_INFINITY));
        assert!(matches!(parse("BINARY_DOUBLE_NAN"), Literal::Special(f) if f.is_nan()));
        assert!(parse_literal("now()", EscapeMode::Standard).is_err());
    }

    #[test]
    fn test_cast_inside_quotes_is_kept() {
        assert_eq!(parse("'a::b'"), Literal::Text("a::b".into()));
        assert_eq!(parse("'2020-01-01'::date"), Literal::Text("2020-01-01".into()));
    }
}
