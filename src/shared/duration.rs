//! Duration strings such as `"15m"`, `"1h30m"` or `"250ms"`.
//!
//! A duration is an optional sign followed by one or more decimal numbers,
//! each with an optional fraction and a mandatory unit. Valid units are
//! `ns`, `us` (or `µs`), `ms`, `s`, `m` and `h`. The bare string `"0"` is
//! accepted without a unit.

use chrono::TimeDelta;

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SECOND: u128 = 1_000_000_000;

/// Fraction digits beyond this are ignored.
const MAX_FRACTION_DIGITS: usize = 18;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseDurationError {
    #[error("invalid duration {0:?}")]
    Invalid(String),

    #[error("missing unit in duration {0:?}")]
    MissingUnit(String),

    #[error("unknown unit {unit:?} in duration {spec:?}")]
    UnknownUnit { unit: String, spec: String },

    #[error("duration {0:?} is out of range")]
    Overflow(String),
}

fn unit_nanos(unit: &str) -> Option<u128> {
    match unit {
        "ns" => Some(1),
        "us" | "µs" | "μs" => Some(NANOS_PER_MICRO),
        "ms" => Some(NANOS_PER_MILLI),
        "s" => Some(NANOS_PER_SECOND),
        "m" => Some(60 * NANOS_PER_SECOND),
        "h" => Some(3_600 * NANOS_PER_SECOND),
        _ => None,
    }
}

fn digit_prefix_len(s: &str) -> usize {
    s.bytes().take_while(u8::is_ascii_digit).count()
}

/// Parse a duration string into a [`TimeDelta`].
pub fn parse_duration(spec: &str) -> Result<TimeDelta, ParseDurationError> {
    let invalid = || ParseDurationError::Invalid(spec.to_owned());
    let overflow = || ParseDurationError::Overflow(spec.to_owned());

    let (negative, mut rest) = match spec.as_bytes().first() {
        Some(b'-') => (true, &spec[1..]),
        Some(b'+') => (false, &spec[1..]),
        _ => (false, spec),
    };

    if rest == "0" {
        return Ok(TimeDelta::zero());
    }
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let (whole, after) = rest.split_at(digit_prefix_len(rest));
        let (fraction, after) = match after.strip_prefix('.') {
            Some(after) => after.split_at(digit_prefix_len(after)),
            None => ("", after),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }

        let unit_len = after
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(after.len());
        let (unit, after) = after.split_at(unit_len);
        if unit.is_empty() {
            return Err(ParseDurationError::MissingUnit(spec.to_owned()));
        }
        let scale = unit_nanos(unit).ok_or_else(|| ParseDurationError::UnknownUnit {
            unit: unit.to_owned(),
            spec: spec.to_owned(),
        })?;

        let whole_nanos = if whole.is_empty() {
            0
        } else {
            whole
                .parse::<u128>()
                .ok()
                .and_then(|n| n.checked_mul(scale))
                .ok_or_else(overflow)?
        };

        let fraction = &fraction[..fraction.len().min(MAX_FRACTION_DIGITS)];
        let fraction_nanos = if fraction.is_empty() {
            0
        } else {
            let digits: u128 = fraction.parse().map_err(|_| invalid())?;
            digits * scale / 10u128.pow(fraction.len() as u32)
        };

        total = total
            .checked_add(whole_nanos + fraction_nanos)
            .ok_or_else(overflow)?;
        rest = after;
    }

    let nanos = i64::try_from(total).map_err(|_| overflow())?;
    Ok(TimeDelta::nanoseconds(if negative { -nanos } else { nanos }))
}
