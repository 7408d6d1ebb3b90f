//! The built-in reference calendars: `iso8601`, a plain day-count calendar
//! with no eras, and `gregory`, the same arithmetic with a two-era signed
//! year convention split at full year <= 0.

use std::sync::Arc;

use lazy_static::lazy_static;

use crate::chronology::Chronology;
use crate::error::Error;
use crate::fields::{check_month_day, DateFields, FieldBag};
use crate::gregorian;

pub const ISO8601: &str = "iso8601";
pub const GREGORY: &str = "gregory";

/// Era codes of the `gregory` calendar, oldest first. `ERA0` counts years
/// backwards from full year 0 (display year 1 = full year 0).
pub const GREGORY_ERAS: [&str; 2] = ["ERA0", "ERA1"];

lazy_static! {
    static ref SHARED_ISO8601: Arc<Iso8601> = Arc::new(Iso8601);
    static ref SHARED_GREGORY: Arc<Gregory> = Arc::new(Gregory);
}

/// Look up a built-in calendar by name and return its shared instance.
pub fn builtin(name: &str) -> Result<Arc<dyn Chronology>, Error> {
    match name {
        ISO8601 => Ok(SHARED_ISO8601.clone() as Arc<dyn Chronology>),
        GREGORY => Ok(SHARED_GREGORY.clone() as Arc<dyn Chronology>),
        _ => Err(Error::invalid_argument(format!(
            "invalid calendar identifier (only iso8601 and gregory are built in): {name}"
        ))),
    }
}

fn numeric_fields_from_ticks(ticks: i64) -> DateFields {
    let (day_number, into_day) = gregorian::split_day(ticks);
    let (year, month, day) = gregorian::civil_from_day(day_number);
    let hour = (into_day / 3_600_000) as u8;
    let minute = (into_day / 60_000 % 60) as u8;
    let second = (into_day / 1_000 % 60) as u8;
    let millisecond = (into_day % 1_000) as u16;
    DateFields::new(year, month, day).at_time(hour, minute, second, millisecond)
}

fn numeric_ticks_from_fields(fields: &DateFields) -> Result<i64, Error> {
    check_month_day(fields.full_year, fields.month, fields.day)?;
    if fields.hour > 23 || fields.minute > 59 || fields.second > 59 || fields.millisecond > 999 {
        return Err(Error::invalid_argument(format!(
            "time of day out of range: {}:{}:{}.{}",
            fields.hour, fields.minute, fields.second, fields.millisecond
        )));
    }
    Ok(gregorian::ticks_from_utc_fields(
        fields.full_year,
        fields.month,
        fields.day,
        fields.hour,
        fields.minute,
        fields.second,
        fields.millisecond,
    ))
}

/// Resolve {year, era, full_year} to a signed full year under the two-era
/// convention, and {month, month_code} to a month number. The most specific
/// consistent group wins; contradictions fail rather than being overridden.
fn resolve_numeric_bag(bag: &FieldBag, eras: &[&str]) -> Result<FieldBag, Error> {
    let era_full_year = match (&bag.era, bag.year) {
        (Some(era), Some(year)) => {
            if eras.is_empty() {
                return Err(Error::invalid_argument(format!(
                    "era supplied for a calendar without eras: {era}"
                )));
            }
            match era.as_str() {
                "ERA0" => Some(1 - year),
                "ERA1" => Some(year),
                _ => {
                    return Err(Error::invalid_argument(format!("unknown era code: {era}")));
                }
            }
        }
        (Some(era), None) => {
            return Err(Error::AmbiguousFields(format!(
                "era {era} supplied without a year"
            )));
        }
        (None, year) => year,
    };
    let full_year = match (bag.full_year, era_full_year) {
        (Some(full_year), Some(implied)) if full_year != implied => {
            return Err(Error::AmbiguousFields(format!(
                "full year {full_year} contradicts year/era ({implied})"
            )));
        }
        (Some(full_year), _) => Some(full_year),
        (None, implied) => implied,
    };

    let code_month = match &bag.month_code {
        Some(code) => Some(month_from_code(code)?),
        None => None,
    };
    let month = match (bag.month, code_month) {
        (Some(month), Some(coded)) if month != coded => {
            return Err(Error::AmbiguousFields(format!(
                "month {month} contradicts month code ({coded})"
            )));
        }
        (Some(month), _) => Some(month),
        (None, coded) => coded,
    };

    Ok(FieldBag {
        full_year,
        month,
        day: bag.day,
        hour: bag.hour,
        minute: bag.minute,
        second: bag.second,
        millisecond: bag.millisecond,
        ..Default::default()
    })
}

fn month_from_code(code: &str) -> Result<u8, Error> {
    let number = code
        .strip_prefix('M')
        .and_then(|n| n.parse::<u8>().ok())
        .filter(|n| (1..=12).contains(n));
    number.ok_or_else(|| Error::invalid_argument(format!("malformed month code: {code}")))
}

#[derive(Debug)]
pub struct Iso8601;

impl Chronology for Iso8601 {
    fn id(&self) -> &str {
        ISO8601
    }

    fn canvas(&self) -> &str {
        ISO8601
    }

    fn fields_from_ticks(&self, ticks: i64) -> DateFields {
        numeric_fields_from_ticks(ticks)
    }

    fn ticks_from_fields(&self, fields: &DateFields) -> Result<i64, Error> {
        numeric_ticks_from_fields(fields)
    }

    fn resolve_fields(&self, bag: &FieldBag) -> Result<FieldBag, Error> {
        resolve_numeric_bag(bag, &[])
    }

    fn in_leap_year(&self, fields: &DateFields) -> Result<bool, Error> {
        Ok(gregorian::is_leap_year(fields.full_year))
    }
}

#[derive(Debug)]
pub struct Gregory;

impl Chronology for Gregory {
    fn id(&self) -> &str {
        GREGORY
    }

    fn canvas(&self) -> &str {
        GREGORY
    }

    fn eras(&self) -> &[&str] {
        &GREGORY_ERAS
    }

    fn fields_from_ticks(&self, ticks: i64) -> DateFields {
        let mut fields = numeric_fields_from_ticks(ticks);
        if fields.full_year <= 0 {
            fields.era = Some(GREGORY_ERAS[0].to_string());
            fields.year = 1 - fields.full_year;
        } else {
            fields.era = Some(GREGORY_ERAS[1].to_string());
            fields.year = fields.full_year;
        }
        fields
    }

    fn ticks_from_fields(&self, fields: &DateFields) -> Result<i64, Error> {
        numeric_ticks_from_fields(fields)
    }

    fn resolve_fields(&self, bag: &FieldBag) -> Result<FieldBag, Error> {
        resolve_numeric_bag(bag, &GREGORY_ERAS)
    }

    fn in_leap_year(&self, fields: &DateFields) -> Result<bool, Error> {
        Ok(gregorian::is_leap_year(fields.full_year))
    }
}
