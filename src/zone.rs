//! The two zone settings the core supports: the environment-local zone and
//! UTC. Zone-database-backed named zones are layered on by callers resolving
//! them to a fixed offset first.

use std::fmt;
use std::str::FromStr;

use num_integer::Integer;

use crate::error::Error;
use crate::gregorian;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Zone {
    /// The system's local wall-clock zone.
    #[default]
    Local,
    /// Fixed zero offset.
    Utc,
}

impl Zone {
    /// Offset in milliseconds at the given instant, signed UTC minus local:
    /// zero for UTC, whatever the system zone yields for `Local`.
    pub(crate) fn offset_ms(self, ticks: i64) -> i64 {
        match self {
            Zone::Utc => 0,
            Zone::Local => local_offset_ms(ticks),
        }
    }

    /// A short displayable name for the zone at the given instant.
    pub(crate) fn display_name(self, ticks: i64) -> String {
        match self {
            Zone::Utc => "UTC".to_string(),
            Zone::Local => local_zone_abbreviation(ticks),
        }
    }
}

impl FromStr for Zone {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "" => Ok(Zone::Local),
            "UTC" => Ok(Zone::Utc),
            _ => Err(Error::invalid_argument(format!(
                "unsupported time zone (only \"\" or \"UTC\"): {s}"
            ))),
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Zone::Local => f.write_str(""),
            Zone::Utc => f.write_str("UTC"),
        }
    }
}

fn local_broken_down(seconds: i64) -> libc::tm {
    let t: libc::time_t = seconds as libc::time_t;
    let mut tm: libc::tm = unsafe { std::mem::zeroed() };
    unsafe {
        libc::localtime_r(&t, &mut tm);
    }
    tm
}

/// Local zone offset at an instant, computed by whole-field reconstruction:
/// take the broken-down local wall clock, reinterpret those fields as UTC
/// through our own civil arithmetic, and subtract. System offset accessors
/// round to minutes on some platforms; the reconstruction is exact to the
/// second. The sub-second remainder of `ticks` never enters the
/// reconstruction, so it cannot be lost either.
fn local_offset_ms(ticks: i64) -> i64 {
    let (seconds, _) = ticks.div_mod_floor(&1_000);
    let tm = local_broken_down(seconds);
    let wall_as_utc = gregorian::ticks_from_utc_fields(
        1900 + tm.tm_year as i64,
        tm.tm_mon as u8 + 1,
        tm.tm_mday as u8,
        tm.tm_hour as u8,
        tm.tm_min as u8,
        tm.tm_sec as u8,
        0,
    );
    seconds * 1_000 - wall_as_utc
}

fn local_zone_abbreviation(ticks: i64) -> String {
    let (seconds, _) = ticks.div_mod_floor(&1_000);
    let tm = local_broken_down(seconds);
    if !tm.tm_zone.is_null() {
        let name = unsafe { std::ffi::CStr::from_ptr(tm.tm_zone) };
        if let Ok(name) = name.to_str() {
            if !name.is_empty() {
                return name.to_string();
            }
        }
    }
    // No abbreviation from the platform; fall back to a GMT offset label.
    let offset_min = -local_offset_ms(ticks) / 60_000;
    let (hours, minutes) = offset_min.abs().div_mod_floor(&60);
    let sign = if offset_min < 0 { '-' } else { '+' };
    if minutes == 0 {
        format!("GMT{sign}{hours}")
    } else {
        format!("GMT{sign}{hours}:{minutes:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zone_parsing() {
        assert_eq!("".parse::<Zone>().unwrap(), Zone::Local);
        assert_eq!("UTC".parse::<Zone>().unwrap(), Zone::Utc);
        assert!(matches!(
            "Europe/Paris".parse::<Zone>(),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn utc_offset_is_zero() {
        assert_eq!(Zone::Utc.offset_ms(0), 0);
        assert_eq!(Zone::Utc.offset_ms(1_658_102_400_000), 0);
        assert_eq!(Zone::Utc.display_name(0), "UTC");
    }

    #[test]
    fn local_offset_is_whole_seconds() {
        // Whatever the system zone is, the reconstruction only ever moves
        // whole seconds and stays within a day of UTC.
        let offset = Zone::Local.offset_ms(1_658_102_400_123);
        assert_eq!(offset % 1_000, 0);
        assert!(offset.abs() < gregorian::MS_PER_DAY);
    }

    #[test]
    fn local_offset_ignores_subsecond_remainder() {
        let base = 1_658_102_400_000;
        assert_eq!(Zone::Local.offset_ms(base), Zone::Local.offset_ms(base + 999));
    }
}
