//! PostgreSQL array text format: `{1,2,NULL}`, `{{a,b},{"c d",e}}`,
//! `[0:1]={7,8}`.

use nom::{
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, multispace0},
    combinator::map,
    multi::separated_list0,
    sequence::delimited,
    IResult,
};

use super::text::{backslash_quoted, needs_quoting, quote_element};
use crate::core::{Result, TypeError, Value};

#[derive(Debug, Clone, PartialEq)]
enum ArrayItem {
    Null,
    Text(String),
    Nested(Vec<ArrayItem>),
}

fn array_literal(input: &str, delimiter: char) -> IResult<&str, Vec<ArrayItem>> {
    delimited(
        char('{'),
        separated_list0(char(delimiter), |i| element(i, delimiter)),
        char('}'),
    )(input)
}

fn unquoted(input: &str, delimiter: char) -> IResult<&str, &str> {
    take_while1(move |c: char| c != delimiter && !matches!(c, '{' | '}' | '"'))(input)
}

/// A backslash takes the next character literally.
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            out.extend(chars.next());
        } else {
            out.push(c);
        }
    }
    out
}

fn element(input: &str, delimiter: char) -> IResult<&str, ArrayItem> {
    let (input, _) = multispace0(input)?;
    let (input, item) = alt((
        map(|i| array_literal(i, delimiter), ArrayItem::Nested),
        map(backslash_quoted, ArrayItem::Text),
        map(
            |i| unquoted(i, delimiter),
            |raw: &str| {
                let raw = raw.trim_end();
                if raw.eq_ignore_ascii_case("NULL") {
                    ArrayItem::Null
                } else {
                    ArrayItem::Text(unescape(raw))
                }
            },
        ),
    ))(input)?;
    let (input, _) = multispace0(input)?;
    Ok((input, item))
}

/// Drop an explicit `[lower:upper]=` dimension decoration.
fn strip_dimensions(text: &str) -> &str {
    if text.starts_with('[') {
        if let Some(index) = text.find('=') {
            return text[index + 1..].trim_start();
        }
    }
    text
}

fn materialize<F>(items: Vec<ArrayItem>, decode: &F) -> Result<Value>
where
    F: Fn(&str) -> Result<Value>,
{
    let mut values = Vec::with_capacity(items.len());
    for item in items {
        values.push(match item {
            ArrayItem::Null => Value::Null,
            ArrayItem::Text(text) => decode(&text)?,
            ArrayItem::Nested(inner) => materialize(inner, decode)?,
        });
    }
    Ok(Value::Array(values))
}

/// Decode an array literal, running `decode` on every non-NULL element.
/// Multi-dimensional arrays come back as nested `Value::Array`s.
pub fn decode_array<F>(text: &str, delimiter: char, decode: &F) -> Result<Value>
where
    F: Fn(&str) -> Result<Value>,
{
    let body = strip_dimensions(text.trim());
    match array_literal(body, delimiter) {
        Ok((rest, items)) if rest.trim().is_empty() => materialize(items, decode),
        _ => Err(TypeError::malformed("array", text)),
    }
}

/// Array text form, using `format` for every non-NULL, non-array element.
pub fn format_array<F>(items: &[Value], delimiter: char, format: &F) -> Result<String>
where
    F: Fn(&Value) -> Result<String>,
{
    let mut out = String::from("{");
    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            out.push(delimiter);
        }
        match item {
            Value::Null => out.push_str("NULL"),
            Value::Array(nested) => out.push_str(&format_array(nested, delimiter, format)?),
            other => {
                let text = format(other)?;
                if needs_quoting(&text, delimiter) {
                    out.push_str(&quote_element(&text));
                } else {
                    out.push_str(&text);
                }
            }
        }
    }
    out.push('}');
    Ok(out)
}
