use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::fmt::Write as _;

use crate::core::{PgInterval, Result, Temporal, TypeError, Value};

const MICROS_PER_SECOND: i64 = 1_000_000;
const MICROS_PER_MINUTE: i64 = 60 * MICROS_PER_SECOND;
const MICROS_PER_HOUR: i64 = 60 * MICROS_PER_MINUTE;

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid temporal pattern {pattern:?}: {e}"))
}

static DATE: Lazy<Regex> = Lazy::new(|| compile(r"\A(\d{1,7})(?:-(\d{1,2})-(\d{1,2}))?\z"));
static DATE_TIME: Lazy<Regex> = Lazy::new(|| {
    compile(
        r"\A(\d{1,7})-(\d{1,2})-(\d{1,2})(?:[ T](\d{1,2}):(\d{2})(?::(\d{2})(?:\.(\d{1,9}))?)?)?\s*(Z|[+-]\d{1,2}(?::?\d{2}){0,2})?\z",
    )
});
static TIME: Lazy<Regex> = Lazy::new(|| {
    compile(r"\A(\d{1,2}):(\d{2})(?::(\d{2})(?:\.(\d{1,9}))?)?\s*(?:Z|[+-]\d{1,2}(?::?\d{2}){0,2})?\z")
});
static ISO_INTERVAL: Lazy<Regex> = Lazy::new(|| {
    compile(
        r"\AP(?:(-?\d+)Y)?(?:(-?\d+)M)?(?:(-?\d+)W)?(?:(-?\d+)D)?(?:T(?:(-?\d+)H)?(?:(-?\d+)M)?(?:(-?\d+(?:[.,]\d+)?)S)?)?\z",
    )
});

/// Strip a trailing ` BC` era marker.
fn split_era(text: &str) -> (&str, bool) {
    let trimmed = text.trim();
    let split = trimmed.len().saturating_sub(3);
    match (trimmed.get(..split), trimmed.get(split..)) {
        (Some(body), Some(tail)) if tail.eq_ignore_ascii_case(" BC") => (body.trim_end(), true),
        _ => (trimmed, false),
    }
}

/// Year as printed (1 BC, 2 BC, ...) to astronomical numbering (0, -1, ...)
const fn astronomical_year(year: i32, bc: bool) -> i32 {
    if bc { 1 - year } else { year }
}

fn infinity<T>(text: &str) -> Option<Temporal<T>> {
    match text.to_ascii_lowercase().as_str() {
        "infinity" | "+infinity" => Some(Temporal::Infinity),
        "-infinity" => Some(Temporal::NegInfinity),
        _ => None,
    }
}

fn number<T: std::str::FromStr>(caps: &Captures<'_>, index: usize) -> Option<T> {
    caps.get(index).and_then(|m| m.as_str().parse().ok())
}

fn nanos(caps: &Captures<'_>, index: usize) -> u32 {
    caps.get(index).map_or(0, |m| {
        let digits = format!("{:0<9}", m.as_str());
        digits.parse().unwrap_or(0)
    })
}

fn is_zero_date(text: &str) -> bool {
    text.starts_with("0000-00-00")
}

pub fn decode_date(text: &str) -> Result<Value> {
    let malformed = || TypeError::malformed("date", text);
    if let Some(marker) = infinity(text.trim()) {
        return Ok(Value::Date(marker));
    }
    if is_zero_date(text.trim()) {
        return Ok(Value::Null);
    }

    let (body, bc) = split_era(text);
    let caps = DATE.captures(body).ok_or_else(malformed)?;
    let year = astronomical_year(number(&caps, 1).ok_or_else(malformed)?, bc);
    let month = number(&caps, 2).unwrap_or(1);
    let day = number(&caps, 3).unwrap_or(1);

    NaiveDate::from_ymd_opt(year, month, day)
        .map(|date| Value::Date(Temporal::Finite(date)))
        .ok_or_else(malformed)
}

fn offset_seconds(offset: &str) -> Option<i64> {
    if offset == "Z" {
        return Some(0);
    }
    let (sign, rest) = offset.split_at(1);
    let parts: Vec<&str> = if rest.contains(':') {
        rest.split(':').collect()
    } else {
        rest.as_bytes()
            .chunks(2)
            .map(|chunk| std::str::from_utf8(chunk).unwrap_or("0"))
            .collect()
    };
    let mut seconds = 0_i64;
    for (part, scale) in parts.iter().zip([3600, 60, 1]) {
        seconds += part.parse::<i64>().ok()? * scale;
    }
    Some(if sign == "-" { -seconds } else { seconds })
}

/// Timestamps with an offset are normalised to UTC.
pub fn decode_datetime(text: &str) -> Result<Value> {
    let malformed = || TypeError::malformed("datetime", text);
    if let Some(marker) = infinity(text.trim()) {
        return Ok(Value::DateTime(marker));
    }
    if is_zero_date(text.trim()) {
        return Ok(Value::Null);
    }

    let (body, bc) = split_era(text);
    let caps = DATE_TIME.captures(body).ok_or_else(malformed)?;
    let year = astronomical_year(number(&caps, 1).ok_or_else(malformed)?, bc);
    let date = NaiveDate::from_ymd_opt(year, number(&caps, 2).ok_or_else(malformed)?, number(&caps, 3).ok_or_else(malformed)?)
        .ok_or_else(malformed)?;
    let time = NaiveTime::from_hms_nano_opt(
        number(&caps, 4).unwrap_or(0),
        number(&caps, 5).unwrap_or(0),
        number(&caps, 6).unwrap_or(0),
        nanos(&caps, 7),
    )
    .ok_or_else(malformed)?;

    let local = NaiveDateTime::new(date, time);
    let utc = match caps.get(8) {
        Some(offset) => {
            let seconds = offset_seconds(offset.as_str()).ok_or_else(malformed)?;
            local.checked_sub_signed(Duration::seconds(seconds)).ok_or_else(malformed)?
        }
        None => local,
    };
    Ok(Value::DateTime(Temporal::Finite(utc)))
}

pub fn decode_time(text: &str) -> Result<Value> {
    let malformed = || TypeError::malformed("time", text);
    let caps = TIME.captures(text.trim()).ok_or_else(malformed)?;
    NaiveTime::from_hms_nano_opt(
        number(&caps, 1).ok_or_else(malformed)?,
        number(&caps, 2).ok_or_else(malformed)?,
        number(&caps, 3).unwrap_or(0),
        nanos(&caps, 4),
    )
    .map(Value::Time)
    .ok_or_else(malformed)
}

/// `-3.5` seconds -> `-3_500_000` microseconds; digits past the sixth are dropped.
fn parse_micros(text: &str) -> Option<i64> {
    let (negative, unsigned) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let (whole, fraction) = unsigned.split_once(['.', ',']).unwrap_or((unsigned, ""));
    let whole: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let fraction: i64 = if fraction.is_empty() {
        0
    } else {
        let mut digits: String = fraction.chars().take(6).collect();
        while digits.len() < 6 {
            digits.push('0');
        }
        digits.parse().ok()?
    };
    let micros = whole.checked_mul(MICROS_PER_SECOND)?.checked_add(fraction)?;
    Some(if negative { -micros } else { micros })
}

/// `[-]HH:MM[:SS[.ffffff]]` of the postgres interval style
fn parse_clock(token: &str) -> Option<i64> {
    let (negative, unsigned) = match token.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, token.strip_prefix('+').unwrap_or(token)),
    };
    let mut parts = unsigned.split(':');
    let hours: i64 = parts.next()?.parse().ok()?;
    let minutes: i64 = parts.next()?.parse().ok()?;
    let seconds = parts.next().map_or(Some(0), parse_micros)?;
    if parts.next().is_some() {
        return None;
    }
    let micros = hours
        .checked_mul(MICROS_PER_HOUR)?
        .checked_add(minutes.checked_mul(MICROS_PER_MINUTE)?)?
        .checked_add(seconds)?;
    Some(if negative { -micros } else { micros })
}

/// `amount * factor` added to `total`, `None` on overflow
fn accumulate(total: i64, amount: i64, factor: i64) -> Option<i64> {
    total.checked_add(amount.checked_mul(factor)?)
}

fn decode_iso_interval(text: &str) -> Option<PgInterval> {
    if text == "P" || text.ends_with('T') {
        return None;
    }
    let caps = ISO_INTERVAL.captures(text)?;
    let part = |index: usize| -> Option<i64> { caps.get(index).map_or(Some(0), |m| m.as_str().parse().ok()) };

    let months = accumulate(part(2)?, part(1)?, 12)?;
    let days = accumulate(part(4)?, part(3)?, 7)?;
    let seconds = caps.get(7).map_or(Some(0), |m| parse_micros(m.as_str()))?;
    let micros = accumulate(accumulate(seconds, part(5)?, MICROS_PER_HOUR)?, part(6)?, MICROS_PER_MINUTE)?;

    Some(PgInterval::new(i32::try_from(months).ok()?, i32::try_from(days).ok()?, micros))
}

/// `1 year 2 mons 3 days 04:05:06`, `@ 1 day 2 hours ago`
fn decode_verbose_interval(text: &str) -> Option<PgInterval> {
    let mut months = 0_i64;
    let mut days = 0_i64;
    let mut micros = 0_i64;
    let mut negate = false;

    let mut tokens = text.split_whitespace().peekable();
    while let Some(token) = tokens.next() {
        match token {
            "@" => continue,
            "ago" => {
                negate = true;
                continue;
            }
            _ if token.contains(':') => {
                micros = micros.checked_add(parse_clock(token)?)?;
                continue;
            }
            _ => {}
        }

        let unit = tokens.next()?.to_ascii_lowercase();
        if unit.starts_with("sec") || unit == "s" {
            micros = micros.checked_add(parse_micros(token)?)?;
            continue;
        }
        let amount: i64 = token.parse().ok()?;
        match unit.as_str() {
            u if u.starts_with("millenni") => months = accumulate(months, amount, 12_000)?,
            u if u.starts_with("centur") => months = accumulate(months, amount, 1_200)?,
            u if u.starts_with("decade") => months = accumulate(months, amount, 120)?,
            u if u.starts_with("year") || u.starts_with("yr") => months = accumulate(months, amount, 12)?,
            u if u.starts_with("mon") => months = accumulate(months, amount, 1)?,
            u if u.starts_with("week") => days = accumulate(days, amount, 7)?,
            u if u.starts_with("day") => days = accumulate(days, amount, 1)?,
            u if u.starts_with("hour") || u.starts_with("hr") => micros = accumulate(micros, amount, MICROS_PER_HOUR)?,
            u if u.starts_with("min") => micros = accumulate(micros, amount, MICROS_PER_MINUTE)?,
            _ => return None,
        }
    }

    if negate {
        months = months.checked_neg()?;
        days = days.checked_neg()?;
        micros = micros.checked_neg()?;
    }
    Some(PgInterval::new(i32::try_from(months).ok()?, i32::try_from(days).ok()?, micros))
}

pub fn decode_interval(text: &str) -> Result<Value> {
    let trimmed = text.trim();
    let parsed = if trimmed.starts_with('P') {
        decode_iso_interval(trimmed)
    } else {
        decode_verbose_interval(trimmed)
    };
    parsed
        .map(Value::Interval)
        .ok_or_else(|| TypeError::malformed("interval", text))
}

fn push_fraction(out: &mut String, nanos: u32) {
    if nanos == 0 {
        return;
    }
    let digits = format!("{nanos:09}");
    out.push('.');
    out.push_str(digits.trim_end_matches('0'));
}

const fn era(year: i32) -> (i32, bool) {
    if year <= 0 { (1 - year, true) } else { (year, false) }
}

#[must_use]
pub fn format_date(value: &Temporal<NaiveDate>) -> String {
    match value {
        Temporal::Infinity => "infinity".to_string(),
        Temporal::NegInfinity => "-infinity".to_string(),
        Temporal::Finite(date) => {
            let (year, bc) = era(date.year());
            let mut out = format!("{year:04}-{:02}-{:02}", date.month(), date.day());
            if bc {
                out.push_str(" BC");
            }
            out
        }
    }
}

#[must_use]
pub fn format_time(value: &NaiveTime) -> String {
    let mut out = format!("{:02}:{:02}:{:02}", value.hour(), value.minute(), value.second());
    push_fraction(&mut out, value.nanosecond());
    out
}

#[must_use]
pub fn format_datetime(value: &Temporal<NaiveDateTime>) -> String {
    match value {
        Temporal::Infinity => "infinity".to_string(),
        Temporal::NegInfinity => "-infinity".to_string(),
        Temporal::Finite(stamp) => {
            let (year, bc) = era(stamp.year());
            let mut out = format!("{year:04}-{:02}-{:02} {}", stamp.month(), stamp.day(), format_time(&stamp.time()));
            if bc {
                out.push_str(" BC");
            }
            out
        }
    }
}

/// ISO 8601 duration, `PT0S` for the zero interval.
#[must_use]
pub fn format_interval(value: &PgInterval) -> String {
    let mut out = String::from("P");
    let years = value.months / 12;
    let months = value.months % 12;
    if years != 0 {
        let _ = write!(out, "{years}Y");
    }
    if months != 0 {
        let _ = write!(out, "{months}M");
    }
    if value.days != 0 {
        let _ = write!(out, "{}D", value.days);
    }

    if value.microseconds != 0 {
        out.push('T');
        let sign = if value.microseconds < 0 { "-" } else { "" };
        let total = value.microseconds.unsigned_abs();
        let hours = total / MICROS_PER_HOUR.unsigned_abs();
        let minutes = (total / MICROS_PER_MINUTE.unsigned_abs()) % 60;
        let rest = total % MICROS_PER_MINUTE.unsigned_abs();
        if hours != 0 {
            let _ = write!(out, "{sign}{hours}H");
        }
        if minutes != 0 {
            let _ = write!(out, "{sign}{minutes}M");
        }
        if rest != 0 {
            let seconds = rest / MICROS_PER_SECOND.unsigned_abs();
            let fraction = rest % MICROS_PER_SECOND.unsigned_abs();
            let _ = write!(out, "{sign}{seconds}");
            if fraction != 0 {
                let digits = format!("{fraction:06}");
                let _ = write!(out, ".{}", digits.trim_end_matches('0'));
            }
            out.push('S');
        }
    }

    if out == "P" {
        out.push_str("T0S");
    }
    out
}
