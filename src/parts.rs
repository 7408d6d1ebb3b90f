//! Typed text fragments. A formatted date/time string is the in-order
//! concatenation of part values.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartKind {
    Literal,
    Era,
    Year,
    Month,
    Day,
    Weekday,
    DayPeriod,
    Hour,
    Minute,
    Second,
    TimeZoneName,
}

impl fmt::Display for PartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PartKind::Literal => "literal",
            PartKind::Era => "era",
            PartKind::Year => "year",
            PartKind::Month => "month",
            PartKind::Day => "day",
            PartKind::Weekday => "weekday",
            PartKind::DayPeriod => "dayPeriod",
            PartKind::Hour => "hour",
            PartKind::Minute => "minute",
            PartKind::Second => "second",
            PartKind::TimeZoneName => "timeZoneName",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    pub kind: PartKind,
    pub value: String,
}

impl Part {
    pub fn new(kind: PartKind, value: impl Into<String>) -> Self {
        Part {
            kind,
            value: value.into(),
        }
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Part::new(PartKind::Literal, value)
    }
}

/// Concatenate part values in order.
pub(crate) fn join(parts: &[Part]) -> String {
    parts.iter().map(|p| p.value.as_str()).collect()
}
