//! The pluggable calendar contract.
//!
//! A [`Chronology`] converts between the linear tick counter (milliseconds
//! since the Unix epoch, UTC) and calendar-specific field sets, and declares
//! how its fields should be rendered by the formatting pipeline. Instances
//! are shared behind `Arc`; every method is a pure function of its inputs.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::Error;
use crate::fields::{DateFields, FieldBag, WeekFields};
use crate::locale_data::LocaleData;
use crate::parts::PartKind;

/// How the formatter computes the date string for a custom calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StringFormat {
    /// First-pass parts from the standard locale database, then per-field
    /// display rules applied on top.
    BuiltIn,
    /// Keep the database's literal structure but pin the rendered counter to
    /// this calendar's own year and month and put its day and the instant's
    /// true weekday back in. Only valid on Gregorian-like canvases.
    Fields,
    /// Same as `BuiltIn`.
    #[default]
    Auto,
}

impl FromStr for StringFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "built-in" => Ok(StringFormat::BuiltIn),
            "fields" => Ok(StringFormat::Fields),
            "auto" => Ok(StringFormat::Auto),
            _ => Err(Error::InvalidOption(format!(
                "unknown string format (expected auto, built-in or fields): {s}"
            ))),
        }
    }
}

/// How one displayable field resolves to localized text.
#[derive(Debug, Clone)]
pub enum DisplayRule {
    /// Leave the part exactly as the standard locale database produced it.
    Standard,
    /// Substitute the raw field value, blank when absent. Year and day honor
    /// the numeric-vs-2-digit width.
    Verbatim,
    /// Index into a declared list: 1-based by field value for month and
    /// weekday, by era code position for era.
    Enumerated {
        values: Vec<String>,
        codes: Vec<String>,
    },
    /// Query the calendar's private locale data repository. `key` maps the
    /// field value to the lookup key; each field has a default derivation
    /// (CLDR Sunday-first three-letter codes for weekday, the plain numeral
    /// for month, the era-code index for era).
    Repository { key: Option<fn(i64) -> String> },
}

/// Per-field display rules declared by a chronology. Fields without a rule
/// follow the standard locale database.
#[derive(Debug, Clone, Default)]
pub struct PartsFormat {
    pub era: Option<DisplayRule>,
    pub year: Option<DisplayRule>,
    pub month: Option<DisplayRule>,
    pub day: Option<DisplayRule>,
    pub weekday: Option<DisplayRule>,
    pub hour: Option<DisplayRule>,
    pub minute: Option<DisplayRule>,
    pub second: Option<DisplayRule>,
}

pub(crate) const EMPTY_PARTS_FORMAT: PartsFormat = PartsFormat {
    era: None,
    year: None,
    month: None,
    day: None,
    weekday: None,
    hour: None,
    minute: None,
    second: None,
};

impl PartsFormat {
    pub fn rule(&self, kind: PartKind) -> Option<&DisplayRule> {
        match kind {
            PartKind::Era => self.era.as_ref(),
            PartKind::Year => self.year.as_ref(),
            PartKind::Month => self.month.as_ref(),
            PartKind::Day => self.day.as_ref(),
            PartKind::Weekday => self.weekday.as_ref(),
            PartKind::Hour => self.hour.as_ref(),
            PartKind::Minute => self.minute.as_ref(),
            PartKind::Second => self.second.as_ref(),
            _ => None,
        }
    }
}

/// A calendar implementation.
///
/// `fields_from_ticks` and `ticks_from_fields` must be exact two-sided
/// inverses over the representable range: for every counter `t`,
/// `ticks_from_fields(&fields_from_ticks(t)) == t`. `fields_from_ticks`
/// always yields every numeric field, with month and day 1-based and
/// without gaps.
pub trait Chronology: fmt::Debug + Send + Sync {
    /// Identity of this calendar, used in calendar strings and repository
    /// queries.
    fn id(&self) -> &str;

    /// Name of the built-in calendar whose rendering conventions (part
    /// order, name tables in the standard database) this calendar borrows.
    fn canvas(&self) -> &str;

    /// Ordered era codes, oldest first. Empty when the calendar has no eras.
    fn eras(&self) -> &[&str] {
        &[]
    }

    fn string_format(&self) -> StringFormat {
        StringFormat::Auto
    }

    fn parts_format(&self) -> &PartsFormat {
        &EMPTY_PARTS_FORMAT
    }

    /// The calendar's private locale data repository, when it carries one
    /// for `Repository` display rules.
    fn repository(&self) -> Option<Arc<dyn LocaleData>> {
        None
    }

    /// Full field snapshot for a counter deemed UTC.
    fn fields_from_ticks(&self, ticks: i64) -> DateFields;

    /// Counter for a complete field snapshot. The time-of-day fields
    /// participate; descriptive fields are ignored in favor of `full_year`.
    fn ticks_from_fields(&self, fields: &DateFields) -> Result<i64, Error>;

    /// Week coordinates for a counter deemed UTC.
    fn week_fields_from_ticks(&self, _ticks: i64) -> Result<WeekFields, Error> {
        Err(Error::unsupported_capability(format!(
            "calendar {} has no week structure",
            self.id()
        )))
    }

    /// Counter for week coordinates (week year, week number, weekday),
    /// at midnight UTC of that day.
    fn ticks_from_week_fields(&self, _fields: &WeekFields) -> Result<i64, Error> {
        Err(Error::unsupported_capability(format!(
            "calendar {} has no week structure",
            self.id()
        )))
    }

    /// Resolve a partial field bag into an unambiguous one. Implementations
    /// must be deterministic, prefer the most specific consistent group
    /// (`full_year` over `year` + `era`, `month` over `month_code`), and
    /// fail with [`Error::AmbiguousFields`] when supplied groups contradict
    /// each other rather than silently picking one.
    fn resolve_fields(&self, bag: &FieldBag) -> Result<FieldBag, Error>;

    /// Whether the year of the given snapshot is a leap year.
    fn in_leap_year(&self, _fields: &DateFields) -> Result<bool, Error> {
        Err(Error::unsupported_capability(format!(
            "calendar {} has no leap year rule",
            self.id()
        )))
    }
}

/// Default repository key for a weekday value in the standard 7-day week,
/// 0 = Sunday .. 6 = Saturday: the three-letter CLDR day codes.
pub fn weekday_key(weekday: i64) -> String {
    const KEYS: [&str; 7] = ["sun", "mon", "tue", "wed", "thu", "fri", "sat"];
    KEYS[weekday.rem_euclid(7) as usize].to_string()
}
