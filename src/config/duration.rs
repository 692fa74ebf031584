//! Parsing of Go-style duration strings (`300ms`, `1.5s`, `1m30s`).
//!
//! A duration is a sequence of decimal numbers, each with an optional
//! fraction and a mandatory unit suffix. Valid units are `ns`, `us` (or
//! `µs`), `ms`, `s`, `m` and `h`. The bare string `0` is accepted without a
//! unit. Negative durations are rejected.

use std::time::Duration;

/// Error returned for malformed duration strings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DurationError {
    #[error("empty duration")]
    Empty,
    #[error("negative duration {0:?}")]
    Negative(String),
    #[error("invalid duration {0:?}")]
    Invalid(String),
    #[error("missing unit in duration {0:?}")]
    MissingUnit(String),
    #[error("unknown unit {unit:?} in duration {input:?}")]
    UnknownUnit { unit: String, input: String },
    #[error("duration {0:?} out of range")]
    Overflow(String),
}

fn unit_nanos(unit: &str) -> Option<f64> {
    let nanos = match unit {
        "ns" => 1.0,
        "us" | "µs" | "μs" => 1e3,
        "ms" => 1e6,
        "s" => 1e9,
        "m" => 60e9,
        "h" => 3600e9,
        _ => return None,
    };
    Some(nanos)
}

/// Parse a Go duration string into a [`Duration`].
pub fn parse_go_duration(input: &str) -> Result<Duration, DurationError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(DurationError::Empty);
    }

    let s = match s.as_bytes()[0] {
        b'-' => return Err(DurationError::Negative(input.to_string())),
        b'+' => &s[1..],
        _ => s,
    };

    if s == "0" {
        return Ok(Duration::ZERO);
    }
    if s.is_empty() {
        return Err(DurationError::Invalid(input.to_string()));
    }

    let mut total_nanos = 0f64;
    let mut rest = s;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number, tail) = rest.split_at(number_len);
        if number.is_empty() || number == "." || number.matches('.').count() > 1 {
            return Err(DurationError::Invalid(input.to_string()));
        }
        let value: f64 = number
            .parse()
            .map_err(|_| DurationError::Invalid(input.to_string()))?;

        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_len);
        if unit.is_empty() {
            return Err(DurationError::MissingUnit(input.to_string()));
        }
        let scale = unit_nanos(unit).ok_or_else(|| DurationError::UnknownUnit {
            unit: unit.to_string(),
            input: input.to_string(),
        })?;

        total_nanos += value * scale;
        rest = tail;
    }

    if !total_nanos.is_finite() || total_nanos > u64::MAX as f64 {
        return Err(DurationError::Overflow(input.to_string()));
    }
    Ok(Duration::from_nanos(total_nanos.round() as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_units() {
        assert_eq!(parse_go_duration("1s").unwrap(), Duration::from_secs(1));
        assert_eq!(parse_go_duration("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_go_duration("2m").unwrap(), Duration::from_secs(120));
        assert_eq!(parse_go_duration("1h").unwrap(), Duration::from_secs(3600));
        assert_eq!(parse_go_duration("15us").unwrap(), Duration::from_micros(15));
        assert_eq!(parse_go_duration("15µs").unwrap(), Duration::from_micros(15));
        assert_eq!(parse_go_duration("7ns").unwrap(), Duration::from_nanos(7));
    }

    #[test]
    fn parses_compound_and_fractional_values() {
        assert_eq!(parse_go_duration("1m30s").unwrap(), Duration::from_secs(90));
        assert_eq!(parse_go_duration("1.5s").unwrap(), Duration::from_millis(1500));
        assert_eq!(parse_go_duration(".5s").unwrap(), Duration::from_millis(500));
        assert_eq!(
            parse_go_duration("1h2m3s4ms").unwrap(),
            Duration::from_millis(3_723_004)
        );
        assert_eq!(parse_go_duration("+2s").unwrap(), Duration::from_secs(2));
    }

    #[test]
    fn zero_needs_no_unit() {
        assert_eq!(parse_go_duration("0").unwrap(), Duration::ZERO);
        assert_eq!(parse_go_duration("0s").unwrap(), Duration::ZERO);
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(parse_go_duration(""), Err(DurationError::Empty));
        assert!(matches!(parse_go_duration("-1s"), Err(DurationError::Negative(_))));
        assert!(matches!(parse_go_duration("10"), Err(DurationError::MissingUnit(_))));
        assert!(matches!(
            parse_go_duration("3d"),
            Err(DurationError::UnknownUnit { .. })
        ));
        assert!(matches!(parse_go_duration("s"), Err(DurationError::Invalid(_))));
        assert!(matches!(parse_go_duration("1..2s"), Err(DurationError::Invalid(_))));
    }
}
