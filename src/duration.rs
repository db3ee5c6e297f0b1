//! ISO-8601 duration literals as used by the management endpoint.
//!
//! The endpoint speaks XML Schema `xs:duration`, e.g. `PT45S`, `P14D`, or
//! `P10675199DT2H48M5.4775807S` for the infinite sentinel. Year and month
//! components have no fixed length and are rejected, as are negative values.

use crate::error::CodecError;
use std::time::Duration;

const SECS_PER_MINUTE: u64 = 60;
const SECS_PER_HOUR: u64 = 60 * SECS_PER_MINUTE;
const SECS_PER_DAY: u64 = 24 * SECS_PER_HOUR;
const SECS_PER_WEEK: u64 = 7 * SECS_PER_DAY;

const DATE_UNITS: &str = "WD";
const TIME_UNITS: &str = "HMS";

/// Parse an ISO-8601 duration literal.
pub fn parse_duration(literal: &str) -> Result<Duration, CodecError> {
    let invalid = || CodecError::InvalidDuration(literal.to_string());

    let rest = literal.trim().strip_prefix('P').ok_or_else(invalid)?;
    if rest.is_empty() {
        return Err(invalid());
    }

    let (date_part, time_part) = match rest.split_once('T') {
        Some((date, time)) if !time.is_empty() => (date, Some(time)),
        Some(_) => return Err(invalid()),
        None => (rest, None),
    };

    let mut secs: u64 = 0;
    let mut nanos: u32 = 0;

    for (number, unit) in components(date_part, DATE_UNITS).ok_or_else(invalid)? {
        let scale = match unit {
            'W' => SECS_PER_WEEK,
            'D' => SECS_PER_DAY,
            _ => return Err(invalid()),
        };
        secs = add_scaled(secs, number, scale).ok_or_else(invalid)?;
    }

    if let Some(time) = time_part {
        for (number, unit) in components(time, TIME_UNITS).ok_or_else(invalid)? {
            let scale = match unit {
                'H' => SECS_PER_HOUR,
                'M' => SECS_PER_MINUTE,
                'S' => {
                    let (whole, frac) = match number.split_once('.') {
                        Some((whole, frac)) => (whole, Some(frac)),
                        None => (number, None),
                    };
                    secs = add_scaled(secs, whole, 1).ok_or_else(invalid)?;
                    if let Some(frac) = frac {
                        nanos = parse_fraction(frac).ok_or_else(invalid)?;
                    }
                    continue;
                }
                _ => return Err(invalid()),
            };
            if number.contains('.') {
                return Err(invalid());
            }
            secs = add_scaled(secs, number, scale).ok_or_else(invalid)?;
        }
    }

    Ok(Duration::new(secs, nanos))
}

/// Format a duration as an ISO-8601 literal, omitting zero components.
pub fn format_duration(value: Duration) -> String {
    let mut secs = value.as_secs();
    let nanos = value.subsec_nanos();

    let days = secs / SECS_PER_DAY;
    secs %= SECS_PER_DAY;
    let hours = secs / SECS_PER_HOUR;
    secs %= SECS_PER_HOUR;
    let minutes = secs / SECS_PER_MINUTE;
    secs %= SECS_PER_MINUTE;

    let mut out = String::from("P");
    if days > 0 {
        out.push_str(&format!("{days}D"));
    }
    if hours == 0 && minutes == 0 && secs == 0 && nanos == 0 {
        if days == 0 {
            out.push_str("T0S");
        }
        return out;
    }

    out.push('T');
    if hours > 0 {
        out.push_str(&format!("{hours}H"));
    }
    if minutes > 0 {
        out.push_str(&format!("{minutes}M"));
    }
    if secs > 0 || nanos > 0 {
        if nanos > 0 {
            let frac = format!("{nanos:09}");
            out.push_str(&format!("{secs}.{}S", frac.trim_end_matches('0')));
        } else {
            out.push_str(&format!("{secs}S"));
        }
    }
    out
}

/// Split `12H30M5.5S` into `[("12", 'H'), ("30", 'M'), ("5.5", 'S')]`.
///
/// Each unit must come from `units` and appear at most once, in the order
/// `units` lists them.
fn components<'a>(part: &'a str, units: &str) -> Option<Vec<(&'a str, char)>> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut next_unit = 0;
    for (idx, ch) in part.char_indices() {
        if ch.is_ascii_digit() || ch == '.' {
            continue;
        }
        let number = &part[start..idx];
        if number.is_empty() || number.starts_with('.') || number.ends_with('.') {
            return None;
        }
        let position = units.find(ch)?;
        if position < next_unit {
            return None;
        }
        next_unit = position + 1;
        out.push((number, ch));
        start = idx + ch.len_utf8();
    }
    if start != part.len() {
        return None;
    }
    Some(out)
}

fn add_scaled(acc: u64, number: &str, scale: u64) -> Option<u64> {
    let value: u64 = number.parse().ok()?;
    acc.checked_add(value.checked_mul(scale)?)
}

fn parse_fraction(frac: &str) -> Option<u32> {
    if frac.is_empty() || frac.len() > 9 || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let padded = format!("{frac:0<9}");
    padded.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::MAX_DURATION;

    #[test]
    fn test_parse_simple() {
        assert_eq!(parse_duration("PT45S").unwrap(), Duration::from_secs(45));
        assert_eq!(parse_duration("PT1M").unwrap(), Duration::from_secs(60));
        assert_eq!(parse_duration("P14D").unwrap(), Duration::from_secs(14 * 86_400));
        assert_eq!(parse_duration("P1W").unwrap(), Duration::from_secs(7 * 86_400));
        assert_eq!(parse_duration("PT0.5S").unwrap(), Duration::from_millis(500));
    }

    #[test]
    fn test_parse_max_sentinel() {
        let max = parse_duration("P10675199DT2H48M5.4775807S").unwrap();
        assert_eq!(max, MAX_DURATION);
        assert_eq!(format_duration(max), "P10675199DT2H48M5.4775807S");
    }

    #[test]
    fn test_rejects_unsupported() {
        for literal in ["", "P", "PT", "P1Y", "P1M", "-PT1S", "PT1.5M", "PTS", "PT1", "1S", "PT1.S"] {
            assert!(parse_duration(literal).is_err(), "accepted {literal:?}");
        }
    }

    #[test]
    fn test_rejects_repeated_or_misordered_units() {
        for literal in [
            "PT1.5S2.5S",
            "PT1H1H",
            "PT1M1H",
            "PT1S1M",
            "P1D1D",
            "P1D1W",
            "P1DT1H2H",
        ] {
            assert!(parse_duration(literal).is_err(), "accepted {literal:?}");
        }
        assert_eq!(
            parse_duration("P1W1DT1H1M1S").unwrap(),
            Duration::from_secs(8 * 86_400 + 3_661)
        );
    }

    #[test]
    fn test_format() {
        assert_eq!(format_duration(Duration::ZERO), "PT0S");
        assert_eq!(format_duration(Duration::from_secs(60)), "PT1M");
        assert_eq!(format_duration(Duration::from_secs(86_400)), "P1D");
        assert_eq!(format_duration(Duration::from_secs(90_061)), "P1DT1H1M1S");
        assert_eq!(format_duration(Duration::from_millis(1_250)), "PT1.25S");
    }

    #[test]
    fn test_roundtrip_hours() {
        let value = Duration::from_secs(5 * 3_600 + 7);
        assert_eq!(parse_duration(&format_duration(value)).unwrap(), value);
    }
}
