//! Display options: what the caller asked to show and at what width, plus
//! the concrete choices resolved against the standard locale database at
//! formatter construction. Resolved options are read-only afterwards.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::parts::PartKind;
use crate::zone::Zone;

/// Width of a displayed field. `Numeric` and `TwoDigit` are numeral forms;
/// the other three select name tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldWidth {
    Numeric,
    TwoDigit,
    Narrow,
    Short,
    Long,
}

impl FromStr for FieldWidth {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "numeric" => Ok(FieldWidth::Numeric),
            "2-digit" => Ok(FieldWidth::TwoDigit),
            "narrow" => Ok(FieldWidth::Narrow),
            "short" => Ok(FieldWidth::Short),
            "long" => Ok(FieldWidth::Long),
            _ => Err(Error::InvalidOption(format!("unknown field width: {s}"))),
        }
    }
}

impl fmt::Display for FieldWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FieldWidth::Numeric => "numeric",
            FieldWidth::TwoDigit => "2-digit",
            FieldWidth::Narrow => "narrow",
            FieldWidth::Short => "short",
            FieldWidth::Long => "long",
        })
    }
}

/// When the era part is shown. `Auto` shows it only when the formatted
/// instant's era differs from the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EraDisplay {
    Never,
    Always,
    #[default]
    Auto,
}

impl FromStr for EraDisplay {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "never" => Ok(EraDisplay::Never),
            "always" => Ok(EraDisplay::Always),
            "auto" => Ok(EraDisplay::Auto),
            _ => Err(Error::InvalidOption(format!(
                "unknown era display policy: {s}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateStyle {
    Short,
    Medium,
    Long,
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeStyle {
    Short,
    Medium,
    Long,
    Full,
}

impl FromStr for DateStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "short" => Ok(DateStyle::Short),
            "medium" => Ok(DateStyle::Medium),
            "long" => Ok(DateStyle::Long),
            "full" => Ok(DateStyle::Full),
            _ => Err(Error::InvalidOption(format!("unknown date style: {s}"))),
        }
    }
}

impl FromStr for TimeStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "short" => Ok(TimeStyle::Short),
            "medium" => Ok(TimeStyle::Medium),
            "long" => Ok(TimeStyle::Long),
            "full" => Ok(TimeStyle::Full),
            _ => Err(Error::InvalidOption(format!("unknown time style: {s}"))),
        }
    }
}

/// Display preferences. The per-field widths and styles are caller input;
/// `locale`, `calendar`, `numbering_system` and `hour12` are filled in when
/// the formatter resolves the options against the locale database.
#[derive(Debug, Clone, Default)]
pub struct FormatOptions {
    pub weekday: Option<FieldWidth>,
    pub era: Option<FieldWidth>,
    pub year: Option<FieldWidth>,
    pub month: Option<FieldWidth>,
    pub day: Option<FieldWidth>,
    pub hour: Option<FieldWidth>,
    pub minute: Option<FieldWidth>,
    pub second: Option<FieldWidth>,
    pub time_zone_name: Option<FieldWidth>,
    pub date_style: Option<DateStyle>,
    pub time_style: Option<TimeStyle>,
    pub era_display: EraDisplay,
    pub time_zone: Zone,
    pub hour12: Option<bool>,
    /// Calendar identifier; a caller-forced built-in name before
    /// resolution, the effective canvas after.
    pub calendar: Option<String>,
    pub locale: String,
    pub numbering_system: String,
}

impl FormatOptions {
    /// Whether any field-selection option or style shorthand is present.
    /// When nothing is, the formatter falls back to numeric year, month
    /// and day.
    pub(crate) fn has_field_selection(&self) -> bool {
        self.weekday.is_some()
            || self.year.is_some()
            || self.month.is_some()
            || self.day.is_some()
            || self.hour.is_some()
            || self.minute.is_some()
            || self.second.is_some()
            || self.date_style.is_some()
            || self.time_style.is_some()
    }

    /// Expand the `time_style` shorthand into the individual field widths
    /// it implies.
    pub(crate) fn expand_time_style(&mut self) {
        let Some(style) = self.time_style.take() else {
            return;
        };
        self.hour = Some(FieldWidth::TwoDigit);
        self.minute = Some(FieldWidth::TwoDigit);
        self.second = Some(FieldWidth::TwoDigit);
        self.time_zone_name = Some(if style == TimeStyle::Full {
            FieldWidth::Long
        } else {
            FieldWidth::Short
        });
        match style {
            TimeStyle::Short => {
                self.second = None;
                self.time_zone_name = None;
            }
            TimeStyle::Medium => {
                self.time_zone_name = None;
            }
            TimeStyle::Long | TimeStyle::Full => {}
        }
    }

    /// Expand the `date_style` shorthand. Medium is the baseline (numeric
    /// day, short month, numeric year); short narrows to 2-digit numerals,
    /// long widens the month, full additionally shows the long weekday.
    pub(crate) fn expand_date_style(&mut self) {
        let Some(style) = self.date_style.take() else {
            return;
        };
        self.weekday = None;
        self.day = Some(FieldWidth::Numeric);
        self.month = Some(FieldWidth::Short);
        self.year = Some(FieldWidth::Numeric);
        match style {
            DateStyle::Medium => {}
            DateStyle::Short => {
                self.day = Some(FieldWidth::TwoDigit);
                self.month = Some(FieldWidth::TwoDigit);
            }
            DateStyle::Full => {
                self.weekday = Some(FieldWidth::Long);
                self.month = Some(FieldWidth::Long);
            }
            DateStyle::Long => {
                self.month = Some(FieldWidth::Long);
            }
        }
    }

    /// A 2-digit day forces a 2-digit month, a 2-digit hour a 2-digit
    /// minute, a 2-digit minute a 2-digit second.
    pub(crate) fn resolve_numeric_widths(&mut self) {
        if self.day == Some(FieldWidth::TwoDigit) && self.month == Some(FieldWidth::Numeric) {
            self.month = Some(FieldWidth::TwoDigit);
        }
        if self.hour == Some(FieldWidth::TwoDigit) && self.minute.is_some() {
            self.minute = Some(FieldWidth::TwoDigit);
        }
        if self.minute == Some(FieldWidth::TwoDigit) && self.second.is_some() {
            self.second = Some(FieldWidth::TwoDigit);
        }
    }

    pub(crate) fn width_of(&self, kind: PartKind) -> Option<FieldWidth> {
        match kind {
            PartKind::Weekday => self.weekday,
            PartKind::Era => self.era,
            PartKind::Year => self.year,
            PartKind::Month => self.month,
            PartKind::Day => self.day,
            PartKind::Hour => self.hour,
            PartKind::Minute => self.minute,
            PartKind::Second => self.second,
            PartKind::TimeZoneName => self.time_zone_name,
            PartKind::Literal | PartKind::DayPeriod => None,
        }
    }
}
