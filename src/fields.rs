//! Calendar field sets: the structured representation of an instant in a
//! particular calendar, and the partial "bags" accepted by setters.

use crate::error::Error;
use crate::gregorian;

/// A complete field snapshot of an instant in some calendar. `month` and
/// `day` are 1-based and contiguous. When `era` is `None`, `year` equals
/// `full_year`; otherwise `year` is era-relative and `full_year` is the
/// unambiguous signed form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFields {
    pub full_year: i64,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub millisecond: u16,
    pub era: Option<String>,
    pub year: i64,
    pub month_code: Option<String>,
    pub leap_month: bool,
}

impl DateFields {
    /// A snapshot with every numeric field at its construction default
    /// (year 0, first day of the first month, midnight).
    pub fn new(full_year: i64, month: u8, day: u8) -> Self {
        DateFields {
            full_year,
            month,
            day,
            hour: 0,
            minute: 0,
            second: 0,
            millisecond: 0,
            era: None,
            year: full_year,
            month_code: None,
            leap_month: false,
        }
    }

    pub fn at_time(mut self, hour: u8, minute: u8, second: u8, millisecond: u16) -> Self {
        self.hour = hour;
        self.minute = minute;
        self.second = second;
        self.millisecond = millisecond;
        self
    }

    /// Milliseconds into the day described by the time-of-day fields.
    pub fn time_of_day_ms(&self) -> i64 {
        self.hour as i64 * 3_600_000
            + self.minute as i64 * 60_000
            + self.second as i64 * 1_000
            + self.millisecond as i64
    }

    /// The same snapshot with the time of day zeroed; setters recompute the
    /// date-only counter from this before re-applying the time.
    pub fn date_only(&self) -> DateFields {
        DateFields {
            hour: 0,
            minute: 0,
            second: 0,
            millisecond: 0,
            ..self.clone()
        }
    }
}

/// A partial field set. Everything is optional; `Chronology::resolve_fields`
/// turns a bag into a consistent one, and setters merge the result over the
/// current snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldBag {
    pub era: Option<String>,
    pub year: Option<i64>,
    pub full_year: Option<i64>,
    pub month: Option<u8>,
    pub month_code: Option<String>,
    pub day: Option<u8>,
    pub hour: Option<u8>,
    pub minute: Option<u8>,
    pub second: Option<u8>,
    pub millisecond: Option<u16>,
}

impl FieldBag {
    /// Overlay the present entries of this bag onto a complete snapshot.
    /// Descriptive entries (era, display year, month code) replace their
    /// counterparts as-is; the caller is expected to have run
    /// `resolve_fields` first so the bag is internally consistent.
    pub fn merge_into(&self, fields: &mut DateFields) {
        if let Some(full_year) = self.full_year {
            fields.full_year = full_year;
            fields.year = full_year;
            fields.era = None;
        }
        if let Some(era) = &self.era {
            fields.era = Some(era.clone());
        }
        if let Some(year) = self.year {
            fields.year = year;
            if fields.era.is_none() {
                fields.full_year = year;
            }
        }
        if let Some(month) = self.month {
            fields.month = month;
        }
        if let Some(code) = &self.month_code {
            fields.month_code = Some(code.clone());
        }
        if let Some(day) = self.day {
            fields.day = day;
        }
        if let Some(hour) = self.hour {
            fields.hour = hour;
        }
        if let Some(minute) = self.minute {
            fields.minute = minute;
        }
        if let Some(second) = self.second {
            fields.second = second;
        }
        if let Some(millisecond) = self.millisecond {
            fields.millisecond = millisecond;
        }
    }
}

/// Week-structure coordinates of an instant. The weekday range is defined by
/// the chronology (for example 0-6 Sunday-first, or 1-7 Monday-first).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekFields {
    /// Added to the civil full year to obtain the year the week belongs to.
    pub week_year_offset: i8,
    /// Civil full year plus `week_year_offset`.
    pub week_year: i64,
    pub week_number: u8,
    pub weekday: u8,
    pub weeks_in_year: u8,
}

/// Partial week coordinates for `set_from_week_fields`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WeekFieldBag {
    pub week_year: Option<i64>,
    pub week_number: Option<u8>,
    pub weekday: Option<u8>,
}

impl WeekFieldBag {
    pub fn merge_into(&self, fields: &mut WeekFields) {
        if let Some(week_year) = self.week_year {
            fields.week_year = week_year;
        }
        if let Some(week_number) = self.week_number {
            fields.week_number = week_number;
        }
        if let Some(weekday) = self.weekday {
            fields.weekday = weekday;
        }
    }
}

/// The month is validated before the month length is looked up, so an
/// out-of-range month fails here instead of reaching the length table.
pub(crate) fn check_month_day(full_year: i64, month: u8, day: u8) -> Result<(), Error> {
    if !(1..=12).contains(&month) {
        return Err(Error::invalid_argument(format!(
            "month out of range 1-12: {month}"
        )));
    }
    let days_in_month = gregorian::days_in_month(full_year, month);
    if day < 1 || day > days_in_month {
        return Err(Error::invalid_argument(format!(
            "day out of range 1-{days_in_month}: {day}"
        )));
    }
    Ok(())
}
