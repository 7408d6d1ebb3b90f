//! Proleptic Gregorian civil arithmetic over day numbers.
//!
//! The Gregorian calendar repeats in 400-year cycles of 97*366 + 303*365 =
//! 146097 days. Conversions here use a normalized representation whose year
//! starts on March 1 and whose origin is 2000-03-01, so every leap day falls
//! at the *end* of its year, quadrennium and century. With the overflow day
//! at the end of each period, quotient clamping replaces all special-case
//! branching on leap days.

use num_integer::Integer;
use std::cmp::min;

pub(crate) const MS_PER_DAY: i64 = 86_400_000;

const CYCLE_DAYS: i64 = 97 * 366 + 303 * 365;
const CENTURY_DAYS: i64 = 24 * 366 + 76 * 365;
const QUADRENNIUM_DAYS: i64 = 3 * 365 + 366;
const YEAR_DAYS: i64 = 365;
const CYCLE_YEARS: i64 = 400;
const CENTURY_YEARS: i64 = 100;
const QUADRENNIUM_YEARS: i64 = 4;

// Days from 1970-01-01 (the epoch of the tick counter) to 2000-03-01.
const NORMALIZED_ORIGIN_DAYS: i64 = 11_017;

// Cumulative day offset of each normalized month; index 0 = March. The
// sentinel keeps `month_from_day_offset` branch-free at the February end.
const MONTH_STARTS: [i64; 13] = [0, 31, 61, 92, 122, 153, 184, 214, 245, 275, 306, 337, i64::MAX];

/// Integer division with the quotient clamped from above, remainder adjusted
/// to match. Lets the trailing leap day overflow into the last period's
/// remainder instead of starting a period of its own.
fn clamped_div_rem(value: i64, divisor: i64, max_quotient: i64) -> (i64, i64) {
    let quotient = min(value.div_floor(&divisor), max_quotient);
    (quotient, value - quotient * divisor)
}

fn month_from_day_offset(day: i64) -> usize {
    let mut month = (day / 30) as usize;
    if day < MONTH_STARTS[month] {
        month -= 1;
    }
    month
}

/// Civil date from a day number (days since 1970-01-01).
pub(crate) fn civil_from_day(day: i64) -> (i64, u8, u8) {
    let day = day - NORMALIZED_ORIGIN_DAYS;
    let (cycle, days_into_cycle) = day.div_mod_floor(&CYCLE_DAYS);
    // The fourth century of each cycle carries the cycle's trailing leap day,
    // so clamp the century index rather than letting that day start a fifth.
    let (century, days_into_century) = clamped_div_rem(days_into_cycle, CENTURY_DAYS, 3);
    // Quadrennia divide exactly: the short final quadrennium of the first
    // three centuries only ever loses its own trailing day.
    let (quadrennium, days_into_quadrennium) = days_into_century.div_mod_floor(&QUADRENNIUM_DAYS);
    let (year_in_quad, days_into_year) = clamped_div_rem(days_into_quadrennium, YEAR_DAYS, 3);

    let mut year = 2000
        + CYCLE_YEARS * cycle
        + CENTURY_YEARS * century
        + QUADRENNIUM_YEARS * quadrennium
        + year_in_quad;

    // Shift March-first months back to civil January-first numbering.
    let month0 = month_from_day_offset(days_into_year);
    let day_of_month = days_into_year - MONTH_STARTS[month0];
    let mut month = month0 + 2;
    if month >= 12 {
        month -= 12;
        year += 1;
    }
    (year, month as u8 + 1, day_of_month as u8 + 1)
}

/// Day number (days since 1970-01-01) from a civil date. The date is taken
/// as given; range checking belongs to the caller.
pub(crate) fn day_from_civil(year: i64, month: u8, day: u8) -> i64 {
    let mut year = year;
    let mut month = month as i64 - 1;
    let day = day as i64 - 1;
    if month < 2 {
        month += 12;
        year -= 1;
    }
    month -= 2;
    year -= 2000;

    let (cycle, years_into_cycle) = year.div_mod_floor(&CYCLE_YEARS);
    let (century, years_into_century) = clamped_div_rem(years_into_cycle, CENTURY_YEARS, 3);
    let (quadrennium, years_into_quadrennium) =
        clamped_div_rem(years_into_century, QUADRENNIUM_YEARS, 24);

    cycle * CYCLE_DAYS
        + century * CENTURY_DAYS
        + quadrennium * QUADRENNIUM_DAYS
        + years_into_quadrennium * YEAR_DAYS
        + MONTH_STARTS[month as usize]
        + day
        + NORMALIZED_ORIGIN_DAYS
}

pub(crate) fn is_leap_year(year: i64) -> bool {
    // Reduce into one cycle first so the checks run on a small value.
    let year = year.mod_floor(&400);
    year % 4 == 0 && (year % 100 != 0 || year == 0)
}

const MONTH_LENGTHS_COMMON: [u8; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

pub(crate) fn days_in_month(year: i64, month: u8) -> u8 {
    debug_assert!((1..=12).contains(&month));
    if month == 2 && is_leap_year(year) {
        29
    } else {
        MONTH_LENGTHS_COMMON[(month - 1) as usize]
    }
}

/// Tick counter for a UTC civil date and time. This is the one conversion
/// everything else funnels through, so `ticks_from_utc_fields` and
/// `civil_from_day` are exact inverses by construction.
pub(crate) fn ticks_from_utc_fields(
    year: i64,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
    millisecond: u16,
) -> i64 {
    day_from_civil(year, month, day) * MS_PER_DAY
        + hour as i64 * 3_600_000
        + minute as i64 * 60_000
        + second as i64 * 1_000
        + millisecond as i64
}

/// Split a tick counter into a day number and milliseconds into the day.
pub(crate) fn split_day(ticks: i64) -> (i64, i64) {
    ticks.div_mod_floor(&MS_PER_DAY)
}

/// Day-of-week for a day number, 0 = Sunday .. 6 = Saturday.
/// Day 0 (1970-01-01) was a Thursday.
pub(crate) fn weekday_from_day(day: i64) -> u8 {
    (day + 4).mod_floor(&7) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_and_origin() {
        assert_eq!(civil_from_day(0), (1970, 1, 1));
        assert_eq!(day_from_civil(1970, 1, 1), 0);
        assert_eq!(day_from_civil(2000, 3, 1), NORMALIZED_ORIGIN_DAYS);
        assert_eq!(civil_from_day(NORMALIZED_ORIGIN_DAYS), (2000, 3, 1));
    }

    #[test]
    fn round_trip_across_leap_boundaries() {
        for &(y, m, d) in &[
            (2000i64, 2u8, 29u8),
            (1999, 2, 28),
            (1999, 12, 31),
            (1900, 2, 28),
            (1900, 3, 1),
            (2400, 2, 29),
            (1, 1, 1),
            (0, 12, 31),
            (-5, 7, 4),
            (-100, 2, 28),
            (9999, 12, 31),
        ] {
            let day = day_from_civil(y, m, d);
            assert_eq!(civil_from_day(day), (y, m, d), "for {y}-{m}-{d}");
        }
    }

    #[test]
    fn round_trip_every_day_of_four_centuries() {
        let start = day_from_civil(1900, 1, 1);
        let end = day_from_civil(2300, 1, 1);
        let mut expected_weekday = weekday_from_day(start);
        for day in start..end {
            let (y, m, d) = civil_from_day(day);
            assert_eq!(day_from_civil(y, m, d), day);
            assert_eq!(weekday_from_day(day), expected_weekday);
            expected_weekday = (expected_weekday + 1) % 7;
        }
    }

    #[test]
    fn leap_year_rule() {
        assert!(is_leap_year(2000));
        assert!(is_leap_year(1600));
        assert!(!is_leap_year(1900));
        assert!(!is_leap_year(1700));
        assert!(is_leap_year(2004));
        assert!(!is_leap_year(2001));
        assert!(is_leap_year(0));
        assert!(is_leap_year(-4));
        assert!(!is_leap_year(-100));
        assert!(is_leap_year(-400));
    }

    #[test]
    fn month_lengths() {
        assert_eq!(days_in_month(2000, 2), 29);
        assert_eq!(days_in_month(1900, 2), 28);
        assert_eq!(days_in_month(2022, 1), 31);
        assert_eq!(days_in_month(2022, 4), 30);
    }

    #[test]
    fn weekday_known_dates() {
        // 1970-01-01 Thursday, 2000-03-01 Wednesday, 2022-07-18 Monday.
        assert_eq!(weekday_from_day(day_from_civil(1970, 1, 1)), 4);
        assert_eq!(weekday_from_day(day_from_civil(2000, 3, 1)), 3);
        assert_eq!(weekday_from_day(day_from_civil(2022, 7, 18)), 1);
    }

    #[test]
    fn ticks_from_utc_fields_epoch() {
        assert_eq!(ticks_from_utc_fields(1970, 1, 1, 0, 0, 0, 0), 0);
        assert_eq!(
            ticks_from_utc_fields(1970, 1, 2, 1, 1, 1, 1),
            MS_PER_DAY + 3_661_001
        );
        assert_eq!(ticks_from_utc_fields(1969, 12, 31, 23, 59, 59, 999), -1);
    }

    #[test]
    fn split_day_negative_ticks() {
        assert_eq!(split_day(-1), (-1, MS_PER_DAY - 1));
        assert_eq!(split_day(0), (0, 0));
        assert_eq!(split_day(MS_PER_DAY + 5), (1, 5));
    }
}
