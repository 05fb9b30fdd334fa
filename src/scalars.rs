//! Duration scalars: `Milliseconds` and `Seconds`.
//!
//! Both represent a signed period of time as a total number of units. Input
//! may be a duration, a number of units, or a time span string of the form
//! `[-]d` (whole days) or `[-][d.]hh:mm[:ss[.fffffff]]`. Values are kept at
//! 100 ns tick precision.

use chrono::TimeDelta;
use thiserror::Error;

use crate::ast::{Node, NodeKind};

const NANOS_PER_TICK: i64 = 100;
const TICKS_PER_SECOND: i64 = 10_000_000;
const MAX_FRACTION_DIGITS: usize = 7;

/// A runtime value offered to a scalar for coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarInput<'a> {
    Duration(TimeDelta),
    Int(i64),
    Float(f64),
    String(&'a str),
}

impl From<TimeDelta> for ScalarInput<'_> {
    fn from(value: TimeDelta) -> Self {
        Self::Duration(value)
    }
}

impl From<i64> for ScalarInput<'_> {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for ScalarInput<'_> {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl<'a> From<&'a str> for ScalarInput<'a> {
    fn from(value: &'a str) -> Self {
        Self::String(value)
    }
}

/// Why a value could not be coerced into a duration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoercionError {
    #[error("{scalar} cannot parse \"{value}\" as a time span")]
    InvalidTimeSpan { scalar: &'static str, value: String },

    #[error("{scalar} cannot parse \"{value}\" as a number")]
    InvalidNumber { scalar: &'static str, value: String },

    #[error("{scalar} value {value} is out of range")]
    OutOfRange { scalar: &'static str, value: f64 },

    #[error("{scalar} cannot be parsed from a {kind} literal")]
    UnsupportedLiteral { scalar: &'static str, kind: NodeKind },

    #[error("{scalar} cannot represent a JSON {kind}")]
    UnsupportedValue {
        scalar: &'static str,
        kind: &'static str,
    },
}

/// A scalar that represents a duration as a total number of units.
pub trait DurationScalar {
    const NAME: &'static str;
    const DESCRIPTION: &'static str;
    /// Ticks (100 ns) in one unit.
    const TICKS_PER_UNIT: f64;

    /// Converts a number of units, rounding to the nearest tick.
    fn from_units(units: f64) -> Result<TimeDelta, CoercionError> {
        let out_of_range = || CoercionError::OutOfRange {
            scalar: Self::NAME,
            value: units,
        };
        let ticks = (units * Self::TICKS_PER_UNIT).round();
        if !ticks.is_finite() || ticks.abs() >= (i64::MAX / NANOS_PER_TICK) as f64 {
            return Err(out_of_range());
        }
        Ok(TimeDelta::nanoseconds(ticks as i64 * NANOS_PER_TICK))
    }

    /// Coerces a runtime value.
    fn parse_value(input: &ScalarInput<'_>) -> Result<TimeDelta, CoercionError> {
        match input {
            ScalarInput::Duration(value) => Ok(*value),
            ScalarInput::Int(value) => Self::from_units(*value as f64),
            ScalarInput::Float(value) => Self::from_units(*value),
            ScalarInput::String(text) => {
                parse_time_span(text).ok_or_else(|| CoercionError::InvalidTimeSpan {
                    scalar: Self::NAME,
                    value: (*text).to_string(),
                })
            }
        }
    }

    /// Coerces a variable value received as JSON.
    fn parse_json(value: &serde_json::Value) -> Result<TimeDelta, CoercionError> {
        use serde_json::Value;

        let unsupported = |kind| CoercionError::UnsupportedValue {
            scalar: Self::NAME,
            kind,
        };
        match value {
            Value::Number(number) => match number.as_i64() {
                Some(int) => Self::parse_value(&ScalarInput::Int(int)),
                None => number
                    .as_f64()
                    .ok_or_else(|| unsupported("number"))
                    .and_then(|float| Self::parse_value(&ScalarInput::Float(float))),
            },
            Value::String(text) => Self::parse_value(&ScalarInput::String(text.as_str())),
            Value::Null => Err(unsupported("null")),
            Value::Bool(_) => Err(unsupported("boolean")),
            Value::Array(_) => Err(unsupported("array")),
            Value::Object(_) => Err(unsupported("object")),
        }
    }

    /// Coerces an int, float or string literal from a document.
    fn parse_literal(node: &Node) -> Result<TimeDelta, CoercionError> {
        let text = node.value().unwrap_or_default();
        match node.kind() {
            NodeKind::IntValue | NodeKind::FloatValue => {
                let units = text.parse::<f64>().map_err(|_| CoercionError::InvalidNumber {
                    scalar: Self::NAME,
                    value: text.to_string(),
                })?;
                Self::from_units(units)
            }
            NodeKind::StringValue => Self::parse_value(&ScalarInput::String(text)),
            kind => Err(CoercionError::UnsupportedLiteral {
                scalar: Self::NAME,
                kind,
            }),
        }
    }

    /// Total number of units in `value`, fractions included.
    fn serialize(value: &TimeDelta) -> f64 {
        let ticks = value.num_seconds() as f64 * TICKS_PER_SECOND as f64
            + f64::from(value.subsec_nanos()) / NANOS_PER_TICK as f64;
        ticks / Self::TICKS_PER_UNIT
    }
}

/// Total milliseconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct Milliseconds;

impl DurationScalar for Milliseconds {
    const NAME: &'static str = "Milliseconds";
    const DESCRIPTION: &'static str = "The `Milliseconds` scalar type represents a period of time represented as the total number of milliseconds.";
    const TICKS_PER_UNIT: f64 = 10_000.0;
}

/// Total seconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct Seconds;

impl DurationScalar for Seconds {
    const NAME: &'static str = "Seconds";
    const DESCRIPTION: &'static str = "The `Seconds` scalar type represents a period of time represented as the total number of seconds.";
    const TICKS_PER_UNIT: f64 = TICKS_PER_SECOND as f64;
}

/// Parses `[-]d` or `[-][d.]hh:mm[:ss[.fffffff]]`, surrounding whitespace
/// allowed.
pub fn parse_time_span(text: &str) -> Option<TimeDelta> {
    let text = text.trim();
    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };

    let ticks = if body.contains(':') {
        parse_clock(body)?
    } else {
        parse_number(body, i64::MAX)?.checked_mul(TICKS_PER_SECOND * 86_400)?
    };

    let nanos = ticks.checked_mul(NANOS_PER_TICK)?;
    let delta = TimeDelta::nanoseconds(nanos);
    Some(if negative { -delta } else { delta })
}

/// Parses `[d.]hh:mm[:ss[.fffffff]]` into ticks.
fn parse_clock(body: &str) -> Option<i64> {
    let mut parts = body.split(':');
    let head = parts.next()?;
    let minutes = parse_number(parts.next()?, 59)?;
    let seconds_part = parts.next();
    if parts.next().is_some() {
        return None;
    }

    let (days, hours) = match head.split_once('.') {
        Some((days, hours)) => (parse_number(days, i64::MAX)?, parse_number(hours, 23)?),
        None => (0, parse_number(head, 23)?),
    };

    let (seconds, fraction) = match seconds_part {
        None => (0, 0),
        Some(part) => match part.split_once('.') {
            Some((seconds, fraction)) => (parse_number(seconds, 59)?, parse_fraction(fraction)?),
            None => (parse_number(part, 59)?, 0),
        },
    };

    let whole_seconds = days
        .checked_mul(86_400)?
        .checked_add(hours * 3_600 + minutes * 60 + seconds)?;
    whole_seconds
        .checked_mul(TICKS_PER_SECOND)?
        .checked_add(fraction)
}

fn parse_number(digits: &str, max: i64) -> Option<i64> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<i64>().ok().filter(|value| *value <= max)
}

/// Parses up to seven fractional digits into ticks.
fn parse_fraction(digits: &str) -> Option<i64> {
    if digits.len() > MAX_FRACTION_DIGITS {
        return None;
    }
    let value = parse_number(digits, i64::MAX)?;
    let scale = 10_i64.pow((MAX_FRACTION_DIGITS - digits.len()) as u32);
    Some(value * scale)
}
