//! A millisecond counter bound to a calendar.
//!
//! `CalendarDate` owns nothing but the counter; the chronology is shared, so
//! any number of dates can reference the same calendar. All field math is
//! delegated to the bound chronology after shifting the counter by the
//! requested zone's offset.

use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;

use crate::builtin;
use crate::chronology::Chronology;
use crate::error::Error;
use crate::fields::{DateFields, FieldBag, WeekFieldBag, WeekFields};
use crate::gregorian;
use crate::zone::Zone;

#[derive(Debug, Clone)]
pub struct CalendarDate {
    ticks: i64,
    chronology: Arc<dyn Chronology>,
}

impl CalendarDate {
    /// The current instant under the given chronology.
    pub fn now(chronology: Arc<dyn Chronology>) -> Result<Self, Error> {
        Ok(CalendarDate {
            ticks: system_now_ms()?,
            chronology,
        })
    }

    /// An explicit counter value (milliseconds since the Unix epoch, UTC).
    pub fn from_ticks(chronology: Arc<dyn Chronology>, ticks: i64) -> Self {
        CalendarDate { ticks, chronology }
    }

    /// Same as [`CalendarDate::from_ticks`], with the chronology looked up
    /// by built-in name.
    pub fn from_ticks_builtin(calendar: &str, ticks: i64) -> Result<Self, Error> {
        Ok(CalendarDate::from_ticks(builtin::builtin(calendar)?, ticks))
    }

    /// Parse an ISO-8601-like instant: a date, an optional time and an
    /// optional `Z` or `±HH:MM` suffix. Offset-less values are taken as UTC.
    pub fn parse(chronology: Arc<dyn Chronology>, text: &str) -> Result<Self, Error> {
        Ok(CalendarDate {
            ticks: parse_iso_instant(text)?,
            chronology,
        })
    }

    /// Construct from a numeric field list in the bound calendar: signed
    /// full year, then 1-based month, then day, hour, minute, second and
    /// millisecond, with defaults 1/1/0/0/0/0 for omitted entries. The
    /// fields describe wall-clock time in `zone`. A year in [0, 99] is the
    /// plain year value; no legacy century offset applies.
    pub fn from_numeric(
        chronology: Arc<dyn Chronology>,
        zone: Zone,
        values: &[i64],
    ) -> Result<Self, Error> {
        if values.len() < 2 {
            return Err(Error::invalid_argument(
                "numeric construction needs at least a year and a month",
            ));
        }
        if values.len() > 7 {
            return Err(Error::invalid_argument(format!(
                "too many numeric fields: {}",
                values.len()
            )));
        }
        let narrow = |index: usize, name: &str, min: i64, max: i64| -> Result<i64, Error> {
            let value = *values.get(index).unwrap_or(&DEFAULTS[index]);
            if !(min..=max).contains(&value) {
                return Err(Error::invalid_argument(format!(
                    "invalid field value for {name}: {value}"
                )));
            }
            Ok(value)
        };
        const DEFAULTS: [i64; 7] = [0, 1, 1, 0, 0, 0, 0];
        let fields = DateFields::new(
            values[0],
            narrow(1, "month", 1, 12)? as u8,
            narrow(2, "day", 1, 31)? as u8,
        )
        .at_time(
            narrow(3, "hour", 0, 23)? as u8,
            narrow(4, "minute", 0, 59)? as u8,
            narrow(5, "second", 0, 59)? as u8,
            narrow(6, "millisecond", 0, 999)? as u16,
        );
        let wall = chronology.ticks_from_fields(&fields)?;
        let ticks = wall + zone.offset_ms(wall);
        Ok(CalendarDate { ticks, chronology })
    }

    pub fn ticks(&self) -> i64 {
        self.ticks
    }

    pub fn chronology(&self) -> &Arc<dyn Chronology> {
        &self.chronology
    }

    /// Replace the counter outright. Returns the new counter.
    pub fn set_ticks(&mut self, ticks: i64) -> i64 {
        self.ticks = ticks;
        ticks
    }

    /// Calendar fields of this instant at the given zone.
    pub fn get_fields(&self, zone: Zone) -> DateFields {
        self.chronology
            .fields_from_ticks(self.ticks - zone.offset_ms(self.ticks))
    }

    /// Week coordinates of this instant at the given zone. Fails when the
    /// bound chronology declares no week structure (the built-ins do not).
    pub fn get_week_fields(&self, zone: Zone) -> Result<WeekFields, Error> {
        self.chronology
            .week_fields_from_ticks(self.ticks - zone.offset_ms(self.ticks))
    }

    /// ISO 8601 fields of this instant regardless of the bound calendar.
    pub fn iso_fields(&self, zone: Zone) -> DateFields {
        let shifted = self.ticks - zone.offset_ms(self.ticks);
        let (day_number, into_day) = gregorian::split_day(shifted);
        let (year, month, day) = gregorian::civil_from_day(day_number);
        DateFields::new(year, month, day).at_time(
            (into_day / 3_600_000) as u8,
            (into_day / 60_000 % 60) as u8,
            (into_day / 1_000 % 60) as u8,
            (into_day % 1_000) as u16,
        )
    }

    pub fn full_year(&self, zone: Zone) -> i64 {
        self.get_fields(zone).full_year
    }

    pub fn era(&self, zone: Zone) -> Option<String> {
        self.get_fields(zone).era
    }

    /// The display year; era-relative when the calendar has eras.
    pub fn year(&self, zone: Zone) -> i64 {
        self.get_fields(zone).year
    }

    pub fn month(&self, zone: Zone) -> u8 {
        self.get_fields(zone).month
    }

    pub fn day(&self, zone: Zone) -> u8 {
        self.get_fields(zone).day
    }

    pub fn hours(&self, zone: Zone) -> u8 {
        self.get_fields(zone).hour
    }

    pub fn minutes(&self, zone: Zone) -> u8 {
        self.get_fields(zone).minute
    }

    pub fn seconds(&self, zone: Zone) -> u8 {
        self.get_fields(zone).second
    }

    pub fn milliseconds(&self, zone: Zone) -> u16 {
        self.get_fields(zone).millisecond
    }

    pub fn weekday(&self, zone: Zone) -> Result<u8, Error> {
        Ok(self.get_week_fields(zone)?.weekday)
    }

    pub fn week_number(&self, zone: Zone) -> Result<u8, Error> {
        Ok(self.get_week_fields(zone)?.week_number)
    }

    pub fn weeks_in_year(&self, zone: Zone) -> Result<u8, Error> {
        Ok(self.get_week_fields(zone)?.weeks_in_year)
    }

    pub fn week_year(&self, zone: Zone) -> Result<i64, Error> {
        Ok(self.get_week_fields(zone)?.week_year)
    }

    /// Whether this instant's year is a leap year of the bound calendar.
    pub fn in_leap_year(&self, zone: Zone) -> Result<bool, Error> {
        self.chronology.in_leap_year(&self.get_fields(zone))
    }

    /// Merge a partial field bag over the current snapshot and recompute the
    /// counter: the bag is disambiguated by the chronology, the date-only
    /// part goes through `ticks_from_fields`, and the time of day is then
    /// re-applied zone-aware. Returns the new counter.
    pub fn set_from_fields(&mut self, bag: &FieldBag, zone: Zone) -> Result<i64, Error> {
        let resolved = self.chronology.resolve_fields(bag)?;
        let mut fields = self.get_fields(zone);
        resolved.merge_into(&mut fields);
        let date_only = fields.date_only();
        self.ticks = self.chronology.ticks_from_fields(&date_only)?;
        self.set_time_of_day(zone, fields.hour, fields.minute, fields.second, fields.millisecond)
    }

    /// Analogous to [`CalendarDate::set_from_fields`] in week coordinates,
    /// keeping the current time of day.
    pub fn set_from_week_fields(&mut self, bag: &WeekFieldBag, zone: Zone) -> Result<i64, Error> {
        let time = self.get_fields(zone);
        let mut week = self.get_week_fields(zone)?;
        bag.merge_into(&mut week);
        self.ticks = self.chronology.ticks_from_week_fields(&week)?;
        self.set_time_of_day(zone, time.hour, time.minute, time.second, time.millisecond)
    }

    /// Set the wall-clock time of day within the same day at the given
    /// zone. The zone offset is evaluated at the current instant. Returns
    /// the new counter.
    pub fn set_time_of_day(
        &mut self,
        zone: Zone,
        hour: u8,
        minute: u8,
        second: u8,
        millisecond: u16,
    ) -> Result<i64, Error> {
        if hour > 23 || minute > 59 || second > 59 || millisecond > 999 {
            return Err(Error::invalid_argument(format!(
                "time of day out of range: {hour}:{minute}:{second}.{millisecond}"
            )));
        }
        let offset = zone.offset_ms(self.ticks);
        let (day_number, _) = gregorian::split_day(self.ticks - offset);
        let time_of_day = hour as i64 * 3_600_000
            + minute as i64 * 60_000
            + second as i64 * 1_000
            + millisecond as i64;
        self.ticks = day_number * gregorian::MS_PER_DAY + time_of_day + offset;
        Ok(self.ticks)
    }

    /// Compact calendar-tagged rendering: the calendar id, the era code when
    /// one applies, and the date and time figures, for example
    /// `[gregory](ERA1)1970-01-01T00:00:00.000Z`.
    pub fn to_calendar_string(&self, zone: Zone) -> String {
        let fields = self.get_fields(zone);
        let era = match &fields.era {
            Some(era) => format!("({era})"),
            None => String::new(),
        };
        let suffix = match zone {
            Zone::Utc => "Z".to_string(),
            Zone::Local => {
                let offset_min = -zone.offset_ms(self.ticks) / 60_000;
                let sign = if offset_min < 0 { '-' } else { '+' };
                format!("{sign}{:02}:{:02}", offset_min.abs() / 60, offset_min.abs() % 60)
            }
        };
        format!(
            "[{}]{era}{}-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}{suffix}",
            self.chronology.id(),
            format_signed_year(fields.year),
            fields.month,
            fields.day,
            fields.hour,
            fields.minute,
            fields.second,
            fields.millisecond,
        )
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_calendar_string(Zone::Utc))
    }
}

fn format_signed_year(year: i64) -> String {
    if (0..10_000).contains(&year) {
        format!("{year:04}")
    } else if year < 0 {
        format!("-{:06}", -year)
    } else {
        format!("{year:06}")
    }
}

pub(crate) fn system_now_ms() -> Result<i64, Error> {
    match SystemTime::now().duration_since(SystemTime::UNIX_EPOCH) {
        Ok(duration) => Ok(duration.as_millis() as i64),
        // A clock set before 1970 still yields a well-defined counter.
        Err(err) => Ok(-(err.duration().as_millis() as i64)),
    }
}

// --- ISO 8601 parsing ---------------------------------------------------

struct IsoCursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> IsoCursor<'a> {
    fn digits(&mut self, count: usize) -> Result<i64, Error> {
        let end = self.pos + count;
        if end > self.bytes.len() || !self.bytes[self.pos..end].iter().all(u8::is_ascii_digit) {
            return Err(Error::invalid_argument(format!(
                "expected {count} digits at offset {}",
                self.pos
            )));
        }
        let mut value = 0i64;
        for &b in &self.bytes[self.pos..end] {
            value = value * 10 + (b - b'0') as i64;
        }
        self.pos = end;
        Ok(value)
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.bytes.get(self.pos) == Some(&byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, byte: u8) -> Result<(), Error> {
        if self.eat(byte) {
            Ok(())
        } else {
            Err(Error::invalid_argument(format!(
                "expected '{}' at offset {}",
                byte as char, self.pos
            )))
        }
    }

    fn at_end(&self) -> bool {
        self.pos == self.bytes.len()
    }
}

/// Parse `±YYYYYY|YYYY-MM-DD[THH:MM[:SS[.f{1,3}]]][Z|±HH:MM]` to a counter.
fn parse_iso_instant(text: &str) -> Result<i64, Error> {
    let mut cursor = IsoCursor {
        bytes: text.as_bytes(),
        pos: 0,
    };
    let year = if cursor.eat(b'-') {
        -cursor.digits(6)?
    } else if cursor.eat(b'+') {
        cursor.digits(6)?
    } else {
        cursor.digits(4)?
    };
    cursor.expect(b'-')?;
    let month = cursor.digits(2)?;
    cursor.expect(b'-')?;
    let day = cursor.digits(2)?;
    if !(1..=12).contains(&month) || day < 1 || day > gregorian::days_in_month(year, month as u8) as i64
    {
        return Err(Error::invalid_argument(format!(
            "date out of range in ISO string: {text}"
        )));
    }

    let (mut hour, mut minute, mut second, mut millisecond) = (0, 0, 0, 0);
    let mut offset_ms = 0i64;
    if cursor.eat(b'T') {
        hour = cursor.digits(2)?;
        cursor.expect(b':')?;
        minute = cursor.digits(2)?;
        if cursor.eat(b':') {
            second = cursor.digits(2)?;
            if cursor.eat(b'.') {
                // One to three fraction digits, scaled to milliseconds.
                let start = cursor.pos;
                let mut value = 0i64;
                while cursor.pos - start < 3 {
                    match cursor.bytes.get(cursor.pos) {
                        Some(b) if b.is_ascii_digit() => {
                            value = value * 10 + (b - b'0') as i64;
                            cursor.pos += 1;
                        }
                        _ => break,
                    }
                }
                let taken = cursor.pos - start;
                if taken == 0 {
                    return Err(Error::invalid_argument(format!(
                        "empty fraction in ISO string: {text}"
                    )));
                }
                millisecond = value * 10i64.pow(3 - taken as u32);
            }
        }
        if hour > 23 || minute > 59 || second > 59 {
            return Err(Error::invalid_argument(format!(
                "time out of range in ISO string: {text}"
            )));
        }
        if !cursor.eat(b'Z') && !cursor.at_end() {
            let negative = if cursor.eat(b'+') {
                false
            } else if cursor.eat(b'-') {
                true
            } else {
                return Err(Error::invalid_argument(format!(
                    "expected zone suffix in ISO string: {text}"
                )));
            };
            let offset_hour = cursor.digits(2)?;
            cursor.expect(b':')?;
            let offset_minute = cursor.digits(2)?;
            offset_ms = (offset_hour * 3_600_000 + offset_minute * 60_000) * if negative { -1 } else { 1 };
        }
    }
    if !cursor.at_end() {
        return Err(Error::invalid_argument(format!(
            "trailing input in ISO string: {text}"
        )));
    }
    Ok(gregorian::ticks_from_utc_fields(
        year,
        month as u8,
        day as u8,
        hour as u8,
        minute as u8,
        second as u8,
        millisecond as u16,
    ) - offset_ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::builtin;

    fn gregory_date(ticks: i64) -> CalendarDate {
        CalendarDate::from_ticks(builtin("gregory").unwrap(), ticks)
    }

    #[test]
    fn epoch_fields_at_utc() {
        let date = gregory_date(0);
        let fields = date.get_fields(Zone::Utc);
        assert_eq!(fields.full_year, 1970);
        assert_eq!(fields.era.as_deref(), Some("ERA1"));
        assert_eq!(fields.year, 1970);
        assert_eq!((fields.month, fields.day), (1, 1));
        assert_eq!(fields.hour, 0);
    }

    #[test]
    fn get_fields_is_idempotent() {
        let date = gregory_date(1_658_144_096_789);
        assert_eq!(date.get_fields(Zone::Utc), date.get_fields(Zone::Utc));
    }

    #[test]
    fn parse_variants() {
        let iso = builtin("iso8601").unwrap();
        let date = CalendarDate::parse(iso.clone(), "1970-01-01").unwrap();
        assert_eq!(date.ticks(), 0);
        let date = CalendarDate::parse(iso.clone(), "1970-01-02T00:00:00Z").unwrap();
        assert_eq!(date.ticks(), gregorian::MS_PER_DAY);
        let date = CalendarDate::parse(iso.clone(), "1969-12-31T23:59:59.999").unwrap();
        assert_eq!(date.ticks(), -1);
        let date = CalendarDate::parse(iso.clone(), "1970-01-01T01:00:00+01:00").unwrap();
        assert_eq!(date.ticks(), 0);
        let date = CalendarDate::parse(iso.clone(), "-000005-03-15").unwrap();
        assert_eq!(date.full_year(Zone::Utc), -5);
        let date = CalendarDate::parse(iso.clone(), "2022-07-18T12:30").unwrap();
        assert_eq!(date.hours(Zone::Utc), 12);
        assert_eq!(date.minutes(Zone::Utc), 30);
    }

    #[test]
    fn parse_rejects_malformed_text() {
        let iso = builtin("iso8601").unwrap();
        for text in [
            "1970",
            "1970-13-01",
            "1970-02-30",
            "1970-01-01T25:00",
            "1970-01-01T00:00:00X",
            "1970-01-01junk",
            "70-01-01",
        ] {
            assert!(
                CalendarDate::parse(iso.clone(), text).is_err(),
                "accepted {text:?}"
            );
        }
    }

    #[test]
    fn numeric_construction_defaults() {
        let gregory = builtin("gregory").unwrap();
        let date = CalendarDate::from_numeric(gregory.clone(), Zone::Utc, &[1970, 1]).unwrap();
        assert_eq!(date.ticks(), 0);
        let date =
            CalendarDate::from_numeric(gregory.clone(), Zone::Utc, &[2022, 7, 18, 12, 30]).unwrap();
        assert_eq!(date.day(Zone::Utc), 18);
        assert_eq!(date.hours(Zone::Utc), 12);
        // A two-digit year is the plain year value.
        let date = CalendarDate::from_numeric(gregory.clone(), Zone::Utc, &[50, 1, 1]).unwrap();
        assert_eq!(date.full_year(Zone::Utc), 50);
    }

    #[test]
    fn numeric_construction_rejects_bad_values() {
        let gregory = builtin("gregory").unwrap();
        assert!(CalendarDate::from_numeric(gregory.clone(), Zone::Utc, &[1970]).is_err());
        assert!(CalendarDate::from_numeric(gregory.clone(), Zone::Utc, &[1970, 13]).is_err());
        assert!(
            CalendarDate::from_numeric(gregory.clone(), Zone::Utc, &[1970, 2, 30]).is_err()
        );
        assert!(CalendarDate::from_numeric(gregory.clone(), Zone::Utc, &[1970, 0, 1]).is_err());
        assert!(CalendarDate::from_numeric(gregory.clone(), Zone::Utc, &[1970, 1, 0]).is_err());
    }

    #[test]
    fn set_from_fields_recomputes_counter() {
        let mut date = gregory_date(0);
        let bag = FieldBag {
            full_year: Some(2000),
            month: Some(3),
            day: Some(1),
            ..Default::default()
        };
        let ticks = date.set_from_fields(&bag, Zone::Utc).unwrap();
        assert_eq!(ticks, gregorian::ticks_from_utc_fields(2000, 3, 1, 0, 0, 0, 0));

        // Partial bag keeps the unmentioned fields of the snapshot.
        let mut date = gregory_date(gregorian::ticks_from_utc_fields(2022, 7, 18, 6, 30, 0, 0));
        let bag = FieldBag {
            day: Some(19),
            ..Default::default()
        };
        date.set_from_fields(&bag, Zone::Utc).unwrap();
        let fields = date.get_fields(Zone::Utc);
        assert_eq!((fields.month, fields.day), (7, 19));
        assert_eq!(fields.hour, 6);
        assert_eq!(fields.minute, 30);
    }

    #[test]
    fn set_time_of_day_keeps_the_day() {
        let mut date = gregory_date(gregorian::ticks_from_utc_fields(2022, 7, 18, 6, 30, 0, 0));
        let ticks = date.set_time_of_day(Zone::Utc, 23, 59, 59, 999).unwrap();
        assert_eq!(ticks, gregorian::ticks_from_utc_fields(2022, 7, 18, 23, 59, 59, 999));
        assert!(date.set_time_of_day(Zone::Utc, 24, 0, 0, 0).is_err());
    }

    #[test]
    fn week_accessors_fail_on_builtins() {
        let date = gregory_date(0);
        assert!(matches!(
            date.weekday(Zone::Utc),
            Err(Error::UnsupportedCapability(_))
        ));
        let mut date = gregory_date(0);
        assert!(date
            .set_from_week_fields(&WeekFieldBag::default(), Zone::Utc)
            .is_err());
    }

    #[test]
    fn leap_year_check() {
        assert!(gregory_date(gregorian::ticks_from_utc_fields(2000, 6, 1, 0, 0, 0, 0))
            .in_leap_year(Zone::Utc)
            .unwrap());
        assert!(!gregory_date(gregorian::ticks_from_utc_fields(1900, 6, 1, 0, 0, 0, 0))
            .in_leap_year(Zone::Utc)
            .unwrap());
    }

    #[test]
    fn calendar_string_forms() {
        assert_eq!(
            gregory_date(0).to_calendar_string(Zone::Utc),
            "[gregory](ERA1)1970-01-01T00:00:00.000Z"
        );
        let iso = CalendarDate::from_ticks(builtin("iso8601").unwrap(), 0);
        assert_eq!(iso.to_string(), "[iso8601]1970-01-01T00:00:00.000Z");
        // 6 BC renders the era-relative year.
        let date = gregory_date(gregorian::ticks_from_utc_fields(-5, 3, 15, 0, 0, 0, 0));
        assert_eq!(
            date.to_calendar_string(Zone::Utc),
            "[gregory](ERA0)0006-03-15T00:00:00.000Z"
        );
    }

    #[test]
    fn iso_fields_ignore_bound_calendar() {
        let date = gregory_date(gregorian::ticks_from_utc_fields(2000, 3, 1, 0, 0, 0, 0));
        let fields = date.iso_fields(Zone::Utc);
        assert_eq!(fields.full_year, 2000);
        assert_eq!((fields.month, fields.day), (3, 1));
        assert_eq!(fields.era, None);
    }
}
