//! Press-release date parsing
//!
//! A date cell is an ISO-8601 calendar date, optionally followed by a time
//! and a UTC offset:
//! - date: `YYYY-MM-DD`, `YYYYMMDD`, or the week forms `YYYY-Www-D` / `YYYYWwwD`
//! - separator: `T` or a space
//! - time: `HH`, `HH:MM`, `HH:MM:SS[.f]`, `HHMM`, `HHMMSS[.f]`
//! - offset: `Z`, `±HH`, `±HH:MM`, `±HHMM`, `±HH:MM:SS`
//!
//! A date without a time is midnight; a time without an offset is UTC.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};

const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M", "%H%M%S%.f", "%H%M"];

/// Parses a press-release date cell, `None` when it is not a valid ISO-8601 date
pub fn parse_press_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    let (date, rest) = split_date(value)?;
    if rest.is_empty() {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }

    let time_part = rest.strip_prefix(['T', 't', ' '])?;
    let (time, offset) = split_offset(time_part)?;
    let naive = date.and_time(parse_time(time)?);

    offset
        .from_local_datetime(&naive)
        .single()
        .map(|ts| ts.with_timezone(&Utc))
}

/// Splits the leading calendar date from whatever follows it
fn split_date(value: &str) -> Option<(NaiveDate, &str)> {
    const EXTENDED: &[&str] = &["%Y-%m-%d", "%G-W%V-%u"];
    const BASIC: &[&str] = &["%Y%m%d", "%GW%V%u"];

    for (width, formats) in [(10, EXTENDED), (8, BASIC)] {
        let (Some(head), Some(rest)) = (value.get(..width), value.get(width..)) else {
            continue;
        };
        if let Some(date) = formats
            .iter()
            .find_map(|f| NaiveDate::parse_from_str(head, f).ok())
        {
            return Some((date, rest));
        }
    }
    None
}

/// Splits a time from its trailing offset, UTC when there is none
fn split_offset(value: &str) -> Option<(&str, FixedOffset)> {
    if let Some(time) = value.strip_suffix(['Z', 'z']) {
        return Some((time, FixedOffset::east_opt(0)?));
    }

    match value.rfind(['+', '-']) {
        Some(index) => {
            let (time, offset) = value.split_at(index);
            Some((time, parse_offset(offset)?))
        }
        None => Some((value, FixedOffset::east_opt(0)?)),
    }
}

fn parse_offset(value: &str) -> Option<FixedOffset> {
    let (sign, digits) = match value.split_at(1) {
        ("+", rest) => (1, rest),
        ("-", rest) => (-1, rest),
        _ => return None,
    };
    let digits: String = digits.chars().filter(|c| *c != ':').collect();
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let field = |range: std::ops::Range<usize>| digits.get(range)?.parse::<i32>().ok();
    let (hours, minutes, seconds) = match digits.len() {
        2 => (field(0..2)?, 0, 0),
        4 => (field(0..2)?, field(2..4)?, 0),
        6 => (field(0..2)?, field(2..4)?, field(4..6)?),
        _ => return None,
    };
    if hours > 23 || minutes > 59 || seconds > 59 {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60 + seconds))
}

fn parse_time(value: &str) -> Option<NaiveTime> {
    if value.len() == 2 && value.chars().all(|c| c.is_ascii_digit()) {
        return NaiveTime::from_hms_opt(value.parse().ok()?, 0, 0);
    }
    TIME_FORMATS
        .iter()
        .find_map(|f| NaiveTime::parse_from_str(value, f).ok())
}
