use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case},
    character::complete::{char, multispace0},
    combinator::{map, value},
    multi::separated_list0,
    sequence::{delimited, preceded},
    IResult,
};
use std::collections::BTreeMap;

use super::text::{backslash_quoted, quote_element};
use crate::core::{Result, TypeError, Value};

type Pair = (String, Option<String>);

fn pair(input: &str) -> IResult<&str, Pair> {
    let (input, _) = multispace0(input)?;
    let (input, key) = backslash_quoted(input)?;
    let (input, _) = delimited(multispace0, tag("=>"), multispace0)(input)?;
    let (input, val) = alt((map(backslash_quoted, Some), value(None, tag_no_case("NULL"))))(input)?;
    Ok((input, (key, val)))
}

fn pairs(input: &str) -> IResult<&str, Vec<Pair>> {
    separated_list0(preceded(multispace0, char(',')), pair)(input)
}

/// `"a"=>"1", "b"=>NULL`
pub fn decode_hstore(text: &str) -> Result<Value> {
    match pairs(text) {
        Ok((rest, parsed)) if rest.trim().is_empty() => Ok(Value::Hstore(parsed.into_iter().collect())),
        _ => Err(TypeError::malformed("hstore", text)),
    }
}

#[must_use]
pub fn format_hstore(map: &BTreeMap<String, Option<String>>) -> String {
    map.iter()
        .map(|(key, val)| {
            let rendered = val.as_deref().map_or_else(|| "NULL".to_string(), quote_element);
            format!("{}=>{rendered}", quote_element(key))
        })
        .collect::<Vec<_>>()
        .join(", ")
}
