pub use calendar_date::CalendarDate;
pub use chronology::{weekday_key, Chronology, DisplayRule, PartsFormat, StringFormat};
pub use database::{LocaleDatabase, ReferenceDatabase, ResolvedLocale};
pub use error::Error;
pub use fields::{DateFields, FieldBag, WeekFieldBag, WeekFields};
pub use formatter::CalendarFormatter;
pub use locale_data::{FieldKind, LocaleData, MemoryRepository};
pub use options::{DateStyle, EraDisplay, FieldWidth, FormatOptions, TimeStyle};
pub use parts::{Part, PartKind};
pub use zone::Zone;

pub use builtin::{builtin, GREGORY, GREGORY_ERAS, ISO8601};

mod builtin;
mod calendar_date;
mod chronology;
mod database;
mod error;
mod fields;
mod formatter;
mod gregorian;
mod locale_data;
mod options;
mod parts;
mod zone;
