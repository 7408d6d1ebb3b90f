//! Standard locale database seam. The formatter delegates the initial
//! rendering pass to a `LocaleDatabase`; `ReferenceDatabase` is the
//! deterministic English implementation shipped with the crate. Richer
//! backends (ICU bindings, CLDR data files) plug in behind the trait.

use std::fmt;

use num_integer::Integer;

use crate::error::Error;
use crate::gregorian;
use crate::options::{FieldWidth, FormatOptions};
use crate::parts::{Part, PartKind};

/// Preferences resolved for a requested locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLocale {
    pub locale: String,
    pub calendar: String,
    pub numbering_system: String,
    pub hour12: bool,
}

/// Locale-aware rendering service. `format_to_parts` receives ticks that
/// have already been shifted into the display zone, so all of its math is
/// zone-agnostic; the zone only contributes its display name.
pub trait LocaleDatabase: fmt::Debug + Send + Sync {
    fn resolve(&self, locale: &str, calendar: Option<&str>) -> ResolvedLocale;

    fn format_to_parts(
        &self,
        options: &FormatOptions,
        ticks: i64,
        zone_name: &str,
    ) -> Result<Vec<Part>, Error>;
}

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

const WEEKDAY_ABBREVIATIONS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

const ERA_NAMES_LONG: [&str; 2] = ["Before Christ", "Anno Domini"];
const ERA_NAMES_SHORT: [&str; 2] = ["BC", "AD"];
const ERA_NAMES_NARROW: [&str; 2] = ["B", "A"];

fn pad2(value: i64) -> String {
    format!("{value:02}")
}

/// English-only database covering the iso8601 and gregory canvases. It
/// reproduces the common platform quirk of rendering numeric date and
/// time fields as padded two-digit numerals with "/" and ":" separators;
/// the formatter's width-correction pass undoes that when the caller
/// asked for plain numerals.
#[derive(Debug, Default)]
pub struct ReferenceDatabase;

impl ReferenceDatabase {
    pub fn new() -> ReferenceDatabase {
        ReferenceDatabase
    }
}

struct CanvasFields {
    display_year: i64,
    era: usize,
    month: u8,
    day: u8,
    weekday: u8,
    hour: u8,
    minute: u8,
    second: u8,
}

fn canvas_fields(ticks: i64, has_eras: bool) -> CanvasFields {
    let (day_number, into_day) = gregorian::split_day(ticks);
    let (full_year, month, day) = gregorian::civil_from_day(day_number);
    let (display_year, era) = if has_eras && full_year <= 0 {
        (1 - full_year, 0)
    } else {
        (full_year, 1)
    };
    let seconds = into_day / 1000;
    CanvasFields {
        display_year,
        era,
        month,
        day,
        weekday: gregorian::weekday_from_day(day_number),
        hour: (seconds / 3600) as u8,
        minute: ((seconds / 60) % 60) as u8,
        second: (seconds % 60) as u8,
    }
}

fn month_name(month: u8, width: FieldWidth) -> String {
    let index = (month - 1) as usize;
    match width {
        FieldWidth::Long => MONTH_NAMES[index].to_string(),
        FieldWidth::Short => MONTH_ABBREVIATIONS[index].to_string(),
        FieldWidth::Narrow => MONTH_NAMES[index].chars().take(1).collect(),
        FieldWidth::Numeric | FieldWidth::TwoDigit => pad2(month as i64),
    }
}

fn weekday_name(weekday: u8, width: FieldWidth) -> String {
    let index = weekday as usize;
    match width {
        FieldWidth::Short | FieldWidth::Numeric | FieldWidth::TwoDigit => {
            WEEKDAY_ABBREVIATIONS[index].to_string()
        }
        FieldWidth::Narrow => WEEKDAY_NAMES[index].chars().take(1).collect(),
        FieldWidth::Long => WEEKDAY_NAMES[index].to_string(),
    }
}

fn era_name(era: usize, width: FieldWidth) -> String {
    match width {
        FieldWidth::Long => ERA_NAMES_LONG[era].to_string(),
        FieldWidth::Narrow => ERA_NAMES_NARROW[era].to_string(),
        _ => ERA_NAMES_SHORT[era].to_string(),
    }
}

fn year_value(fields: &CanvasFields, width: FieldWidth) -> String {
    if width == FieldWidth::TwoDigit {
        pad2(fields.display_year.mod_floor(&100))
    } else {
        fields.display_year.to_string()
    }
}

impl LocaleDatabase for ReferenceDatabase {
    fn resolve(&self, locale: &str, calendar: Option<&str>) -> ResolvedLocale {
        let locale = if locale.is_empty() { "en-GB" } else { locale };
        ResolvedLocale {
            locale: locale.to_string(),
            calendar: calendar.unwrap_or("gregory").to_string(),
            numbering_system: "latn".to_string(),
            hour12: locale.starts_with("en-US"),
        }
    }

    fn format_to_parts(
        &self,
        options: &FormatOptions,
        ticks: i64,
        zone_name: &str,
    ) -> Result<Vec<Part>, Error> {
        let canvas = options.calendar.as_deref().unwrap_or("gregory");
        let has_eras = match canvas {
            "gregory" => true,
            "iso8601" => false,
            other => {
                return Err(Error::UnsupportedCalendar(other.to_string()));
            }
        };
        let fields = canvas_fields(ticks, has_eras);
        let month_day_first = options.locale.starts_with("en-US");
        let textual_month = matches!(
            options.month,
            Some(FieldWidth::Long) | Some(FieldWidth::Short) | Some(FieldWidth::Narrow)
        );

        let mut parts: Vec<Part> = Vec::new();

        let mut date_tokens: Vec<Part> = Vec::new();
        let month_part = options
            .month
            .map(|width| Part::new(PartKind::Month, month_name(fields.month, width)));
        let day_part = options
            .day
            .map(|_| Part::new(PartKind::Day, pad2(fields.day as i64)));
        let year_part = options
            .year
            .map(|width| Part::new(PartKind::Year, year_value(&fields, width)));

        if textual_month {
            // Name-style dates read "1 January 1970" (day first) or
            // "January 1, 1970" (month first).
            let (first, second) = if month_day_first {
                (month_part, day_part)
            } else {
                (day_part, month_part)
            };
            if let Some(part) = first {
                date_tokens.push(part);
            }
            if let Some(part) = second {
                if !date_tokens.is_empty() {
                    date_tokens.push(Part::literal(" "));
                }
                date_tokens.push(part);
            }
            if let Some(part) = year_part {
                if !date_tokens.is_empty() {
                    let separator = if month_day_first { ", " } else { " " };
                    date_tokens.push(Part::literal(separator));
                }
                date_tokens.push(part);
            }
        } else {
            let ordered = if month_day_first {
                [month_part, day_part, year_part]
            } else {
                [day_part, month_part, year_part]
            };
            for part in ordered.into_iter().flatten() {
                if !date_tokens.is_empty() {
                    date_tokens.push(Part::literal("/"));
                }
                date_tokens.push(part);
            }
        }

        if let Some(width) = options.era {
            if has_eras {
                if !date_tokens.is_empty() {
                    date_tokens.push(Part::literal(" "));
                }
                date_tokens.push(Part::new(PartKind::Era, era_name(fields.era, width)));
            }
        }

        if let Some(width) = options.weekday {
            parts.push(Part::new(
                PartKind::Weekday,
                weekday_name(fields.weekday, width),
            ));
            if !date_tokens.is_empty() {
                parts.push(Part::literal(", "));
            }
        }
        parts.extend(date_tokens);

        if options.hour.is_some() {
            if !parts.is_empty() {
                parts.push(Part::literal(", "));
            }
            let hour12 = options.hour12.unwrap_or(false);
            let hour_value = if hour12 {
                ((fields.hour as i64 + 11) % 12) + 1
            } else {
                fields.hour as i64
            };
            parts.push(Part::new(PartKind::Hour, pad2(hour_value)));
            if options.minute.is_some() {
                parts.push(Part::literal(":"));
                parts.push(Part::new(PartKind::Minute, pad2(fields.minute as i64)));
                if options.second.is_some() {
                    parts.push(Part::literal(":"));
                    parts.push(Part::new(PartKind::Second, pad2(fields.second as i64)));
                }
            }
            if hour12 {
                parts.push(Part::literal(" "));
                parts.push(Part::new(
                    PartKind::DayPeriod,
                    if fields.hour < 12 { "am" } else { "pm" },
                ));
            }
        }

        if options.time_zone_name.is_some() {
            if !parts.is_empty() {
                parts.push(Part::literal(" "));
            }
            parts.push(Part::new(PartKind::TimeZoneName, zone_name));
        }

        Ok(parts)
    }
}
