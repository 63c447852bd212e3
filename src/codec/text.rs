// Shared lexing for PostgreSQL's composite text formats (arrays, ranges, hstore)
use nom::{
    branch::alt,
    bytes::complete::{is_not, tag},
    character::complete::{anychar, char},
    combinator::{map, value},
    multi::fold_many0,
    sequence::{delimited, preceded},
    IResult,
};

/// `"..."` where `\x` stands for `x`
pub fn backslash_quoted(input: &str) -> IResult<&str, String> {
    delimited(
        char('"'),
        fold_many0(
            alt((
                map(is_not("\\\""), str::to_string),
                map(preceded(char('\\'), anychar), String::from),
            )),
            String::new,
            |mut acc, piece| {
                acc.push_str(&piece);
                acc
            },
        ),
        char('"'),
    )(input)
}

/// Like [`backslash_quoted`], but a doubled `""` also stands for one quote
/// (range output doubles quotes instead of escaping them).
pub fn range_quoted(input: &str) -> IResult<&str, String> {
    delimited(
        char('"'),
        fold_many0(
            alt((
                map(is_not("\\\""), str::to_string),
                map(preceded(char('\\'), anychar), String::from),
                value("\"".to_string(), tag("\"\"")),
            )),
            String::new,
            |mut acc, piece| {
                acc.push_str(&piece);
                acc
            },
        ),
        char('"'),
    )(input)
}

/// Whether `text` must be double-quoted inside an array/range/hstore literal.
pub fn needs_quoting(text: &str, delimiter: char) -> bool {
    text.is_empty()
        || text.eq_ignore_ascii_case("NULL")
        || text.chars().any(|c| {
            c == delimiter || c.is_whitespace() || matches!(c, '"' | '\\' | '{' | '}' | '(' | ')' | '[' | ']' | ',')
        })
}

/// `"text"` with `"` and `\` backslash-escaped
pub fn quote_element(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for ch in text.chars() {
        if matches!(ch, '"' | '\\') {
            quoted.push('\\');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backslash_quoted() {
        assert_eq!(backslash_quoted(r#""a\"b\\c" rest"#), Ok((" rest", "a\"b\\c".to_string())));
        assert_eq!(backslash_quoted(r#""""#), Ok(("", String::new())));
        assert!(backslash_quoted("unquoted").is_err());
    }

    #[test]
    fn test_range_quoted_doubles() {
        assert_eq!(range_quoted(r#""a""b","#), Ok((",", "a\"b".to_string())));
    }

    #[test]
    fn test_quote_element() {
        assert_eq!(quote_element(r#"say "hi" \o/"#), r#""say \"hi\" \\o/""#);
        assert!(needs_quoting("", ','));
        assert!(needs_quoting("null", ','));
        assert!(needs_quoting("a b", ','));
        assert!(!needs_quoting("plain", ','));
    }
}
