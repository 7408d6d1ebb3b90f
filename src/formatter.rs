//! Locale-aware formatter.
//!
//! A [`CalendarFormatter`] binds a locale, display options and a
//! [`LocaleDatabase`] at construction, optionally together with a custom
//! [`Chronology`]. Formatting runs the database first and then rewrites
//! individual parts according to the calendar's display rules, so a custom
//! calendar inherits the locale's part order and literals without shipping
//! its own patterns.

use std::sync::Arc;

use log::{debug, trace};

use crate::builtin;
use crate::calendar_date::{self, CalendarDate};
use crate::chronology::{weekday_key, Chronology, DisplayRule, StringFormat};
use crate::database::LocaleDatabase;
use crate::error::Error;
use crate::fields::{DateFields, WeekFields};
use crate::gregorian;
use crate::locale_data::{FieldKind, LocaleData};
use crate::options::{EraDisplay, FieldWidth, FormatOptions};
use crate::parts::{self, Part, PartKind};

/// Built-in calendars whose year/month/day structure matches the Gregorian
/// rendering canvas. Only these can back a `Fields` string format.
const GREGORIAN_CANVASES: [&str; 5] = ["iso8601", "gregory", "buddhist", "japanese", "roc"];

/// Lunisolar built-ins. Their month numbering shifts between years, so they
/// cannot serve as a canvas for a custom calendar at all.
const LUNISOLAR_CANVASES: [&str; 3] = ["chinese", "dangi", "hebrew"];

/// Languages written right to left. The width-correction pass is skipped
/// for these, as reordering literals would corrupt the bidi text.
const RTL_LANGUAGES: [&str; 7] = ["ar", "fa", "he", "ji", "ug", "ur", "yi"];

pub struct CalendarFormatter {
    options: FormatOptions,
    chronology: Option<Arc<dyn Chronology>>,
    database: Arc<dyn LocaleDatabase>,
    now_override: Option<i64>,
}

impl std::fmt::Debug for CalendarFormatter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CalendarFormatter")
            .field("options", &self.options)
            .field("chronology", &self.chronology.as_ref().map(|c| c.id()))
            .finish_non_exhaustive()
    }
}

fn pad2(value: i64) -> String {
    format!("{value:02}")
}

fn numeral(value: i64, width: Option<FieldWidth>) -> String {
    if width == Some(FieldWidth::TwoDigit) {
        pad2(value)
    } else {
        value.to_string()
    }
}

fn language_of(locale: &str) -> &str {
    locale.split('-').next().unwrap_or("")
}

impl CalendarFormatter {
    /// Formatter over the locale's default calendar.
    pub fn new(
        locale: &str,
        options: FormatOptions,
        database: Arc<dyn LocaleDatabase>,
    ) -> Result<CalendarFormatter, Error> {
        CalendarFormatter::build(locale, options, database, None)
    }

    /// Formatter over a named built-in calendar.
    pub fn with_calendar(
        locale: &str,
        mut options: FormatOptions,
        database: Arc<dyn LocaleDatabase>,
        calendar: &str,
    ) -> Result<CalendarFormatter, Error> {
        builtin::builtin(calendar)?;
        options.calendar = Some(calendar.to_string());
        CalendarFormatter::build(locale, options, database, None)
    }

    /// Formatter over a custom calendar. The calendar's canvas decides the
    /// rendering conventions; its display rules rewrite individual parts.
    pub fn with_chronology(
        locale: &str,
        options: FormatOptions,
        database: Arc<dyn LocaleDatabase>,
        chronology: Arc<dyn Chronology>,
    ) -> Result<CalendarFormatter, Error> {
        CalendarFormatter::build(locale, options, database, Some(chronology))
    }

    /// Pin "now" for the `auto` era display policy. Mainly for tests.
    pub fn with_now(mut self, ticks: i64) -> CalendarFormatter {
        self.now_override = Some(ticks);
        self
    }

    fn build(
        locale: &str,
        mut options: FormatOptions,
        database: Arc<dyn LocaleDatabase>,
        chronology: Option<Arc<dyn Chronology>>,
    ) -> Result<CalendarFormatter, Error> {
        // With no field selection at all the date falls back to numeric
        // year, month and day.
        if !options.has_field_selection() {
            options.year = Some(FieldWidth::Numeric);
            options.month = Some(FieldWidth::Numeric);
            options.day = Some(FieldWidth::Numeric);
        }

        let mut resolved = database.resolve(locale, options.calendar.as_deref());

        if let Some(chronology) = &chronology {
            let canvas = chronology.canvas();
            if LUNISOLAR_CANVASES.contains(&canvas) {
                return Err(Error::UnsupportedCalendar(format!(
                    "calendar {} uses lunisolar canvas {canvas}",
                    chronology.id()
                )));
            }
            if chronology.string_format() == StringFormat::Fields
                && !GREGORIAN_CANVASES.contains(&canvas)
            {
                return Err(Error::UnsupportedCalendar(format!(
                    "canvas {canvas} cannot back a fields string format"
                )));
            }
            // The canvas overrides whatever calendar the locale implied.
            if resolved.calendar != canvas {
                resolved = database.resolve(&resolved.locale, Some(canvas));
            }
        }

        options.locale = resolved.locale;
        options.calendar = Some(resolved.calendar);
        options.numbering_system = resolved.numbering_system;
        if options.hour12.is_none() {
            options.hour12 = Some(resolved.hour12);
        }

        options.expand_time_style();
        options.expand_date_style();
        options.resolve_numeric_widths();

        if options.era_display == EraDisplay::Always && options.era.is_none() {
            options.era = Some(FieldWidth::Short);
        }
        // Without a year there is nothing for an era to disambiguate.
        if options.era_display == EraDisplay::Auto && options.year.is_none() && options.era.is_none()
        {
            options.era_display = EraDisplay::Never;
        }

        trace!(
            "formatter resolved: locale={} calendar={:?}",
            options.locale,
            options.calendar
        );
        Ok(CalendarFormatter {
            options,
            chronology,
            database,
            now_override: None,
        })
    }

    /// The options after resolution against the locale database, style
    /// expansion and width cross-resolution.
    pub fn resolved_options(&self) -> &FormatOptions {
        &self.options
    }

    /// Whether the era part is shown for the given instant, per the
    /// configured era display policy.
    pub fn display_era(&self, ticks: i64) -> Result<bool, Error> {
        match self.options.era_display {
            EraDisplay::Never => Ok(false),
            EraDisplay::Always => {
                if let Some(chronology) = &self.chronology {
                    if chronology.eras().is_empty() {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            EraDisplay::Auto => {
                if self.options.year.is_none() && self.options.era.is_none() {
                    return Ok(false);
                }
                if let Some(chronology) = &self.chronology {
                    if chronology.eras().is_empty() {
                        return Ok(false);
                    }
                }
                let now = match self.now_override {
                    Some(ticks) => ticks,
                    None => calendar_date::system_now_ms()?,
                };
                let zone = self.options.time_zone;
                match &self.chronology {
                    Some(chronology) => {
                        let era_of =
                            |t: i64| chronology.fields_from_ticks(t - zone.offset_ms(t)).era;
                        Ok(era_of(ticks) != era_of(now))
                    }
                    None => {
                        let probe = FormatOptions {
                            locale: self.options.locale.clone(),
                            calendar: self.options.calendar.clone(),
                            year: Some(FieldWidth::Numeric),
                            era: Some(FieldWidth::Short),
                            ..Default::default()
                        };
                        let era_part = |t: i64| -> Result<Option<String>, Error> {
                            let rendered =
                                self.database
                                    .format_to_parts(&probe, t - zone.offset_ms(t), "")?;
                            Ok(rendered
                                .into_iter()
                                .find(|p| p.kind == PartKind::Era)
                                .map(|p| p.value))
                        };
                        match (era_part(ticks)?, era_part(now)?) {
                            (None, _) => Ok(false),
                            (Some(_), None) => Ok(true),
                            (Some(a), Some(b)) => Ok(a != b),
                        }
                    }
                }
            }
        }
    }

    pub fn format_to_parts(&self, date: &CalendarDate) -> Result<Vec<Part>, Error> {
        let ticks = date.ticks();
        let mut options = self.options.clone();
        let show_era = self.display_era(ticks)?;
        if show_era && options.era.is_none() {
            options.era = Some(FieldWidth::Short);
        }

        let zone = options.time_zone;
        // All calendar math after this point runs on the zone-shifted
        // counter; the zone itself only contributes its display name.
        let shifted = ticks - zone.offset_ms(ticks);
        let zone_name = zone.display_name(ticks);

        let mut calendar_fields: Option<DateFields> = None;
        let mut week_fields: Option<WeekFields> = None;
        if let Some(chronology) = &self.chronology {
            calendar_fields = Some(chronology.fields_from_ticks(shifted));
            week_fields = chronology.week_fields_from_ticks(shifted).ok();
        }

        let fields_mode = self
            .chronology
            .as_ref()
            .map(|c| c.string_format() == StringFormat::Fields)
            .unwrap_or(false);
        let mut rendered = if fields_mode {
            let fields = calendar_fields.as_ref().unwrap();
            self.render_fields_mode(&options, fields, shifted, &zone_name)?
        } else {
            self.database.format_to_parts(&options, shifted, &zone_name)?
        };

        if let (Some(chronology), Some(fields)) = (&self.chronology, &calendar_fields) {
            self.apply_display_rules(
                chronology.as_ref(),
                &options,
                fields,
                week_fields.as_ref(),
                &mut rendered,
            );
        }

        correct_widths(&options, &mut rendered);

        if !show_era {
            remove_era_part(&mut rendered);
        }
        Ok(rendered)
    }

    pub fn format(&self, date: &CalendarDate) -> Result<String, Error> {
        Ok(parts::join(&self.format_to_parts(date)?))
    }

    /// `Fields` string format: run the database over a counter whose UTC
    /// year and month equal the calendar's own, pinned to day 1, then put
    /// the calendar's day and the instant's true weekday back in.
    fn render_fields_mode(
        &self,
        options: &FormatOptions,
        fields: &DateFields,
        shifted: i64,
        zone_name: &str,
    ) -> Result<Vec<Part>, Error> {
        let weekday_value = if options.weekday.is_some() {
            let probe = FormatOptions {
                locale: options.locale.clone(),
                calendar: options.calendar.clone(),
                weekday: options.weekday,
                ..Default::default()
            };
            self.database
                .format_to_parts(&probe, shifted, zone_name)?
                .into_iter()
                .find(|p| p.kind == PartKind::Weekday)
                .map(|p| p.value)
        } else {
            None
        };

        let pinned = gregorian::ticks_from_utc_fields(
            fields.full_year,
            fields.month,
            1,
            fields.hour,
            fields.minute,
            fields.second,
            fields.millisecond,
        );
        let mut rendered = self.database.format_to_parts(options, pinned, zone_name)?;
        for part in rendered.iter_mut() {
            match part.kind {
                PartKind::Day => part.value = numeral(fields.day as i64, options.day),
                PartKind::Weekday => {
                    if let Some(value) = &weekday_value {
                        part.value = value.clone();
                    }
                }
                _ => {}
            }
        }
        Ok(rendered)
    }

    fn apply_display_rules(
        &self,
        chronology: &dyn Chronology,
        options: &FormatOptions,
        fields: &DateFields,
        week_fields: Option<&WeekFields>,
        rendered: &mut [Part],
    ) {
        let parts_format = chronology.parts_format();
        let repository = chronology.repository();
        let language = language_of(&options.locale).to_string();

        for part in rendered.iter_mut() {
            let Some(rule) = parts_format.rule(part.kind) else {
                continue;
            };
            let width = options.width_of(part.kind);
            match rule {
                DisplayRule::Standard => {}
                DisplayRule::Verbatim => {
                    if let Some(value) = verbatim_value(part.kind, fields, week_fields, width) {
                        part.value = value;
                    }
                }
                DisplayRule::Enumerated { values, codes } => {
                    enumerated_value(part, fields, week_fields, width, values, codes);
                }
                DisplayRule::Repository { key } => {
                    self.repository_value(
                        part,
                        chronology,
                        fields,
                        week_fields,
                        width,
                        *key,
                        repository.as_deref(),
                        &language,
                    );
                }
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn repository_value(
        &self,
        part: &mut Part,
        chronology: &dyn Chronology,
        fields: &DateFields,
        week_fields: Option<&WeekFields>,
        width: Option<FieldWidth>,
        key: Option<fn(i64) -> String>,
        repository: Option<&dyn LocaleData>,
        language: &str,
    ) {
        let lookup = |kind: FieldKind, key_string: &str| -> Option<String> {
            let repository = repository?;
            let width = width.unwrap_or(FieldWidth::Short);
            repository
                .lookup_for_language(language, kind, width, key_string)
                .or_else(|| repository.lookup(kind, width, key_string))
        };
        match part.kind {
            PartKind::Era => {
                let index = fields.era.as_deref().and_then(|code| {
                    chronology.eras().iter().position(|era| *era == code)
                });
                let Some(index) = index else {
                    part.value = String::new();
                    return;
                };
                let key_string = match key {
                    Some(key) => key(index as i64),
                    None => index.to_string(),
                };
                match lookup(FieldKind::Era, &key_string) {
                    Some(value) => part.value = value,
                    None => {
                        debug!(
                            "no era entry for calendar {} key {key_string}",
                            chronology.id()
                        );
                        part.value = String::new();
                    }
                }
            }
            PartKind::Year => part.value = year_numeral(fields.year, width),
            PartKind::Day => part.value = numeral(fields.day as i64, width),
            PartKind::Month => {
                let month = fields.month as i64;
                let key_string = match key {
                    Some(key) => key(month),
                    None => month.to_string(),
                };
                part.value = lookup(FieldKind::Month, &key_string)
                    .unwrap_or_else(|| numeral(month, width));
            }
            PartKind::Weekday => {
                let Some(week) = week_fields else {
                    return;
                };
                let weekday = week.weekday as i64;
                let key_string = match key {
                    Some(key) => key(weekday),
                    None => weekday_key(weekday),
                };
                match lookup(FieldKind::Weekday, &key_string) {
                    Some(value) => part.value = value,
                    None => {
                        debug!(
                            "no weekday entry for calendar {} key {key_string}",
                            chronology.id()
                        );
                        part.value = String::new();
                    }
                }
            }
            PartKind::Hour => part.value = numeral(fields.hour as i64, width),
            PartKind::Minute => part.value = numeral(fields.minute as i64, width),
            PartKind::Second => part.value = numeral(fields.second as i64, width),
            _ => {}
        }
    }
}

fn year_numeral(year: i64, width: Option<FieldWidth>) -> String {
    // Two-digit display years are truncated with a leading quote, but only
    // when the year is positive. Zero and negative years print in full.
    if width == Some(FieldWidth::TwoDigit) && year > 0 {
        format!("'{:02}", year % 100)
    } else {
        year.to_string()
    }
}

fn verbatim_value(
    kind: PartKind,
    fields: &DateFields,
    week_fields: Option<&WeekFields>,
    width: Option<FieldWidth>,
) -> Option<String> {
    match kind {
        PartKind::Era => Some(fields.era.clone().unwrap_or_default()),
        PartKind::Year => Some(year_numeral(fields.year, width)),
        PartKind::Month => Some(numeral(fields.month as i64, width)),
        PartKind::Day => Some(numeral(fields.day as i64, width)),
        PartKind::Weekday => Some(
            week_fields
                .map(|week| week.weekday.to_string())
                .unwrap_or_default(),
        ),
        PartKind::Hour => Some(numeral(fields.hour as i64, width)),
        PartKind::Minute => Some(numeral(fields.minute as i64, width)),
        PartKind::Second => Some(numeral(fields.second as i64, width)),
        _ => None,
    }
}

fn enumerated_value(
    part: &mut Part,
    fields: &DateFields,
    week_fields: Option<&WeekFields>,
    width: Option<FieldWidth>,
    values: &[String],
    codes: &[String],
) {
    match part.kind {
        PartKind::Era => {
            if let Some(code) = &fields.era {
                if let Some(position) = codes.iter().position(|c| c == code) {
                    if let Some(value) = values.get(position) {
                        part.value = value.clone();
                    }
                }
            }
        }
        PartKind::Month => {
            let month = fields.month as i64;
            part.value = match width {
                Some(FieldWidth::Numeric) | Some(FieldWidth::TwoDigit) => numeral(month, width),
                _ => values
                    .get((fields.month - 1) as usize)
                    .cloned()
                    .unwrap_or_else(|| month.to_string()),
            };
        }
        PartKind::Weekday => {
            if let Some(week) = week_fields {
                if let Some(value) = values.get((week.weekday - 1) as usize) {
                    part.value = value.clone();
                }
            }
        }
        _ => {}
    }
}

/// Undo the common platform upgrade of numeric fields to padded 2-digit
/// numerals, and turn the ":" separators that upgrade drags along into
/// unit markers. Skipped for right-to-left languages.
fn correct_widths(options: &FormatOptions, rendered: &mut Vec<Part>) {
    if RTL_LANGUAGES.contains(&language_of(&options.locale)) {
        return;
    }
    let mut append_seconds_unit = false;
    for i in 0..rendered.len() {
        let kind = rendered[i].kind;
        if options.width_of(kind) != Some(FieldWidth::Numeric) {
            continue;
        }
        let value = &rendered[i].value;
        if value.is_empty() || !value.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        let trimmed = value.trim_start_matches('0');
        rendered[i].value = if trimmed.is_empty() {
            "0".to_string()
        } else {
            trimmed.to_string()
        };
        match kind {
            PartKind::Hour => {
                if let Some(next) = rendered.get_mut(i + 1) {
                    if next.kind == PartKind::Literal && (next.value == ":" || next.value == ".") {
                        next.value = " h ".to_string();
                    }
                }
            }
            PartKind::Minute => {
                if let Some(next) = rendered.get_mut(i + 1) {
                    if next.kind == PartKind::Literal && (next.value == ":" || next.value == ".") {
                        next.value = " min ".to_string();
                    }
                }
            }
            PartKind::Second => {
                if let Some(next) = rendered.get_mut(i + 1) {
                    if next.kind == PartKind::Literal && next.value == " " {
                        next.value = " s ".to_string();
                    }
                } else {
                    append_seconds_unit = true;
                }
            }
            _ => {}
        }
    }
    if append_seconds_unit {
        rendered.push(Part::literal(" s"));
    }
}

/// Drop the era part together with one adjacent literal, preferring the
/// preceding one.
fn remove_era_part(rendered: &mut Vec<Part>) {
    let Some(index) = rendered.iter().position(|p| p.kind == PartKind::Era) else {
        return;
    };
    if index > 0 && rendered[index - 1].kind == PartKind::Literal {
        rendered.drain(index - 1..=index);
    } else if index + 1 < rendered.len() && rendered[index + 1].kind == PartKind::Literal {
        rendered.drain(index..=index + 1);
    } else {
        rendered.remove(index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chronology::PartsFormat;
    use crate::database::ReferenceDatabase;
    use crate::fields::FieldBag;
    use crate::locale_data::MemoryRepository;
    use crate::options::{DateStyle, TimeStyle};
    use crate::zone::Zone;

    fn database() -> Arc<dyn LocaleDatabase> {
        Arc::new(ReferenceDatabase::new())
    }

    fn utc_options() -> FormatOptions {
        FormatOptions {
            time_zone: Zone::Utc,
            era_display: EraDisplay::Never,
            ..Default::default()
        }
    }

    fn date(ticks: i64) -> CalendarDate {
        CalendarDate::from_ticks_builtin("gregory", ticks).unwrap()
    }

    #[test]
    fn default_options_give_numeric_date() {
        let formatter = CalendarFormatter::new("en-US", utc_options(), database()).unwrap();
        assert_eq!(formatter.format(&date(0)).unwrap(), "1/1/1970");

        let formatter = CalendarFormatter::new("en-GB", utc_options(), database()).unwrap();
        assert_eq!(formatter.format(&date(0)).unwrap(), "1/1/1970");
    }

    #[test]
    fn two_digit_date_keeps_padding() {
        let mut options = utc_options();
        options.date_style = Some(DateStyle::Short);
        let formatter = CalendarFormatter::new("en-GB", options, database()).unwrap();
        assert_eq!(formatter.format(&date(0)).unwrap(), "01/01/1970");
    }

    #[test]
    fn numeric_time_gets_unit_markers() {
        let mut options = utc_options();
        options.hour = Some(FieldWidth::Numeric);
        options.minute = Some(FieldWidth::Numeric);
        options.second = Some(FieldWidth::Numeric);
        let formatter = CalendarFormatter::new("en-GB", options, database()).unwrap();
        // 1970-01-01 05:07:09 UTC
        let ticks = (5 * 3600 + 7 * 60 + 9) * 1000;
        assert_eq!(formatter.format(&date(ticks)).unwrap(), "5 h 7 min 9 s");
    }

    #[test]
    fn two_digit_time_keeps_colons() {
        let mut options = utc_options();
        options.time_style = Some(TimeStyle::Medium);
        let formatter = CalendarFormatter::new("en-GB", options, database()).unwrap();
        let ticks = (5 * 3600 + 7 * 60 + 9) * 1000;
        assert_eq!(formatter.format(&date(ticks)).unwrap(), "05:07:09");
    }

    #[test]
    fn era_auto_hides_current_era() {
        let mut options = utc_options();
        options.era_display = EraDisplay::Auto;
        options.year = Some(FieldWidth::Numeric);
        options.month = Some(FieldWidth::Numeric);
        options.day = Some(FieldWidth::Numeric);
        let formatter = CalendarFormatter::with_calendar("en-GB", options, database(), "gregory")
            .unwrap()
            .with_now(0);
        // Same era as "now": no era part.
        assert_eq!(formatter.format(&date(0)).unwrap(), "1/1/1970");
        // 5 BC differs from the era of "now".
        let bc = gregorian::ticks_from_utc_fields(-4, 7, 1, 0, 0, 0, 0);
        assert_eq!(formatter.format(&date(bc)).unwrap(), "1/7/5 BC");
    }

    #[test]
    fn era_always_forces_short_era() {
        let mut options = utc_options();
        options.era_display = EraDisplay::Always;
        options.year = Some(FieldWidth::Numeric);
        let formatter =
            CalendarFormatter::with_calendar("en-GB", options, database(), "gregory").unwrap();
        assert_eq!(formatter.format(&date(0)).unwrap(), "1970 AD");
    }

    #[test]
    fn era_never_strips_requested_era() {
        let mut options = utc_options();
        options.year = Some(FieldWidth::Numeric);
        options.era = Some(FieldWidth::Long);
        let formatter =
            CalendarFormatter::with_calendar("en-GB", options, database(), "gregory").unwrap();
        assert_eq!(formatter.format(&date(0)).unwrap(), "1970");
    }

    #[test]
    fn unknown_builtin_calendar_is_rejected() {
        assert!(matches!(
            CalendarFormatter::with_calendar("en-GB", utc_options(), database(), "julian"),
            Err(Error::InvalidArgument(_))
        ));
    }

    // A duty-rota calendar: civil dates, Monday-first weekday numbering
    // 1-7, weekday names resolved through a private repository with the
    // calendar's own "d<n>" keys.
    fn rota_weekday_key(weekday: i64) -> String {
        format!("d{weekday}")
    }

    #[derive(Debug)]
    struct RotaCalendar {
        inner: Arc<dyn Chronology>,
        parts_format: PartsFormat,
        repository: Arc<MemoryRepository>,
    }

    impl RotaCalendar {
        fn new() -> RotaCalendar {
            let mut repository = MemoryRepository::new();
            repository.insert(FieldKind::Weekday, FieldWidth::Long, "d4", "Dies Iovis");
            repository.insert_for_language("fr", FieldKind::Weekday, FieldWidth::Long, "d4", "jeudi");
            RotaCalendar {
                inner: builtin::builtin("iso8601").unwrap(),
                parts_format: PartsFormat {
                    year: Some(DisplayRule::Verbatim),
                    weekday: Some(DisplayRule::Repository {
                        key: Some(rota_weekday_key),
                    }),
                    ..Default::default()
                },
                repository: Arc::new(repository),
            }
        }
    }

    impl Chronology for RotaCalendar {
        fn id(&self) -> &str {
            "rota"
        }

        fn canvas(&self) -> &str {
            "gregory"
        }

        fn parts_format(&self) -> &PartsFormat {
            &self.parts_format
        }

        fn repository(&self) -> Option<Arc<dyn LocaleData>> {
            Some(self.repository.clone())
        }

        fn fields_from_ticks(&self, ticks: i64) -> DateFields {
            self.inner.fields_from_ticks(ticks)
        }

        fn ticks_from_fields(&self, fields: &DateFields) -> Result<i64, Error> {
            self.inner.ticks_from_fields(fields)
        }

        fn week_fields_from_ticks(&self, ticks: i64) -> Result<WeekFields, Error> {
            let day = ticks.div_euclid(86_400_000);
            let sunday_first = (day + 4).rem_euclid(7);
            let weekday = if sunday_first == 0 {
                7
            } else {
                sunday_first as u8
            };
            Ok(WeekFields {
                week_year_offset: 0,
                week_year: self.inner.fields_from_ticks(ticks).full_year,
                week_number: 1,
                weekday,
                weeks_in_year: 52,
            })
        }

        fn resolve_fields(&self, bag: &FieldBag) -> Result<FieldBag, Error> {
            self.inner.resolve_fields(bag)
        }
    }

    #[test]
    fn repository_weekday_uses_calendar_key() {
        let mut options = utc_options();
        options.weekday = Some(FieldWidth::Long);
        let formatter = CalendarFormatter::with_chronology(
            "en-GB",
            options,
            database(),
            Arc::new(RotaCalendar::new()),
        )
        .unwrap();
        // Epoch day is a Thursday: Monday-first weekday 4, key "d4".
        assert_eq!(formatter.format(&date(0)).unwrap(), "Dies Iovis");
    }

    #[test]
    fn language_narrowed_repository_entry_wins() {
        let mut options = utc_options();
        options.weekday = Some(FieldWidth::Long);
        let formatter = CalendarFormatter::with_chronology(
            "fr",
            options,
            database(),
            Arc::new(RotaCalendar::new()),
        )
        .unwrap();
        assert_eq!(formatter.format(&date(0)).unwrap(), "jeudi");
    }

    #[test]
    fn repository_miss_renders_blank() {
        let mut options = utc_options();
        options.weekday = Some(FieldWidth::Short);
        let formatter = CalendarFormatter::with_chronology(
            "en-GB",
            options,
            database(),
            Arc::new(RotaCalendar::new()),
        )
        .unwrap();
        assert_eq!(formatter.format(&date(0)).unwrap(), "");
    }

    #[test]
    fn two_digit_year_truncates_with_quote() {
        let mut options = utc_options();
        options.year = Some(FieldWidth::TwoDigit);
        let formatter = CalendarFormatter::with_chronology(
            "en-GB",
            options,
            database(),
            Arc::new(RotaCalendar::new()),
        )
        .unwrap();
        assert_eq!(formatter.format(&date(0)).unwrap(), "'70");
        // Only positive years are truncated.
        assert_eq!(year_numeral(-5, Some(FieldWidth::TwoDigit)), "-5");
        assert_eq!(year_numeral(0, Some(FieldWidth::TwoDigit)), "0");
    }

    #[test]
    fn custom_calendar_defaults_to_numeric_date() {
        let formatter = CalendarFormatter::with_chronology(
            "en-GB",
            utc_options(),
            database(),
            Arc::new(RotaCalendar::new()),
        )
        .unwrap();
        assert_eq!(formatter.format(&date(0)).unwrap(), "1/1/1970");
    }

    // A fixed-offset calendar whose dates trail the civil calendar by 13
    // days, rendered through the fields string format.
    const SHIFT: i64 = 13 * 86_400_000;

    #[derive(Debug)]
    struct ShiftedCalendar {
        inner: Arc<dyn Chronology>,
    }

    impl ShiftedCalendar {
        fn new() -> ShiftedCalendar {
            ShiftedCalendar {
                inner: builtin::builtin("iso8601").unwrap(),
            }
        }
    }

    impl Chronology for ShiftedCalendar {
        fn id(&self) -> &str {
            "shifted"
        }

        fn canvas(&self) -> &str {
            "iso8601"
        }

        fn string_format(&self) -> StringFormat {
            StringFormat::Fields
        }

        fn fields_from_ticks(&self, ticks: i64) -> DateFields {
            self.inner.fields_from_ticks(ticks - SHIFT)
        }

        fn ticks_from_fields(&self, fields: &DateFields) -> Result<i64, Error> {
            Ok(self.inner.ticks_from_fields(fields)? + SHIFT)
        }

        fn resolve_fields(&self, bag: &FieldBag) -> Result<FieldBag, Error> {
            self.inner.resolve_fields(bag)
        }
    }

    #[test]
    fn fields_mode_renders_calendar_date_with_true_weekday() {
        let mut options = utc_options();
        options.weekday = Some(FieldWidth::Long);
        options.year = Some(FieldWidth::Numeric);
        options.month = Some(FieldWidth::Numeric);
        options.day = Some(FieldWidth::Numeric);
        let formatter = CalendarFormatter::with_chronology(
            "en-GB",
            options,
            database(),
            Arc::new(ShiftedCalendar::new()),
        )
        .unwrap();
        // Epoch in the shifted calendar is 1969-12-19, but the instant is
        // still a civil Thursday.
        assert_eq!(
            formatter.format(&date(0)).unwrap(),
            "Thursday, 19/12/1969"
        );
    }

    #[derive(Debug)]
    struct CanvasStub {
        canvas: &'static str,
        format: StringFormat,
    }

    impl Chronology for CanvasStub {
        fn id(&self) -> &str {
            "stub"
        }

        fn canvas(&self) -> &str {
            self.canvas
        }

        fn string_format(&self) -> StringFormat {
            self.format
        }

        fn fields_from_ticks(&self, _ticks: i64) -> DateFields {
            DateFields::new(1970, 1, 1)
        }

        fn ticks_from_fields(&self, _fields: &DateFields) -> Result<i64, Error> {
            Ok(0)
        }

        fn resolve_fields(&self, bag: &FieldBag) -> Result<FieldBag, Error> {
            Ok(bag.clone())
        }
    }

    #[test]
    fn lunisolar_canvas_is_rejected() {
        let stub = CanvasStub {
            canvas: "hebrew",
            format: StringFormat::Auto,
        };
        assert!(matches!(
            CalendarFormatter::with_chronology("en-GB", utc_options(), database(), Arc::new(stub)),
            Err(Error::UnsupportedCalendar(_))
        ));
    }

    #[test]
    fn fields_format_requires_gregorian_like_canvas() {
        let stub = CanvasStub {
            canvas: "islamic",
            format: StringFormat::Fields,
        };
        assert!(matches!(
            CalendarFormatter::with_chronology("en-GB", utc_options(), database(), Arc::new(stub)),
            Err(Error::UnsupportedCalendar(_))
        ));
    }

    #[test]
    fn rtl_language_skips_width_correction() {
        let formatter = CalendarFormatter::new("he", utc_options(), database()).unwrap();
        assert_eq!(formatter.format(&date(0)).unwrap(), "01/01/1970");
    }
}
