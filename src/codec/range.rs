//! Range text format: `[1,10)`, `(,5]`, `["2020-01-01 00:00:00",infinity)`, `empty`.

use nom::{
    branch::alt,
    bytes::complete::take_till,
    character::complete::{char, one_of},
    combinator::map,
    sequence::{preceded, tuple},
    IResult,
};

use super::text::{needs_quoting, quote_element, range_quoted};
use crate::core::{PgRange, RangeBound, Result, TypeError, Value};

type RawRange = (char, Option<String>, Option<String>, char);

fn bound(input: &str) -> IResult<&str, Option<String>> {
    alt((
        map(range_quoted, Some),
        map(take_till(|c| matches!(c, ',' | ')' | ']')), |raw: &str| {
            let raw = raw.trim();
            (!raw.is_empty()).then(|| raw.to_string())
        }),
    ))(input)
}

fn range_literal(input: &str) -> IResult<&str, RawRange> {
    tuple((one_of("[("), bound, preceded(char(','), bound), one_of("])")))(input)
}

fn side<F>(raw: Option<String>, inclusive: bool, decode: &F) -> Result<RangeBound>
where
    F: Fn(&str) -> Result<Value>,
{
    Ok(match raw {
        None => RangeBound::Unbounded,
        Some(text) if inclusive => RangeBound::Inclusive(decode(&text)?),
        Some(text) => RangeBound::Exclusive(decode(&text)?),
    })
}

/// Decode a range literal, running `decode` on each present bound.
///
/// Empty ranges (`empty`, or equal bounds that are not both inclusive) decode
/// to `Value::Null`.
pub fn decode_range<F>(text: &str, decode: &F) -> Result<Value>
where
    F: Fn(&str) -> Result<Value>,
{
    let trimmed = text.trim();
    if trimmed.eq_ignore_ascii_case("empty") {
        return Ok(Value::Null);
    }

    let (open, lower, upper, close) = match range_literal(trimmed) {
        Ok((rest, parsed)) if rest.trim().is_empty() => parsed,
        _ => return Err(TypeError::malformed("range", text)),
    };
    let lower = side(lower, open == '[', decode)?;
    let upper = side(upper, close == ']', decode)?;

    if let (Some(low), Some(high)) = (lower.value(), upper.value()) {
        if low == high && !(lower.is_inclusive() && upper.is_inclusive()) {
            return Ok(Value::Null);
        }
    }
    Ok(Value::Range(Box::new(PgRange::new(lower, upper))))
}

/// Range text form, using `format` for each bound value.
pub fn format_range<F>(range: &PgRange, format: &F) -> Result<String>
where
    F: Fn(&Value) -> Result<String>,
{
    let render = |bound: &RangeBound| -> Result<String> {
        let Some(value) = bound.value() else {
            return Ok(String::new());
        };
        let text = format(value)?;
        Ok(if needs_quoting(&text, ',') { quote_element(&text) } else { text })
    };
    Ok(format!(
        "{}{},{}{}",
        if range.lower.is_inclusive() { '[' } else { '(' },
        render(&range.lower)?,
        render(&range.upper)?,
        if range.upper.is_inclusive() { ']' } else { ')' },
    ))
}
