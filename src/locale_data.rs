//! Locale data accessor for custom calendars. A calendar whose display
//! rules say `Repository` resolves era, month and weekday names through
//! this trait instead of the standard locale database.

use std::collections::HashMap;
use std::fmt;

use crate::options::FieldWidth;

/// Field categories a repository can be queried for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Era,
    Month,
    Weekday,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FieldKind::Era => "era",
            FieldKind::Month => "month",
            FieldKind::Weekday => "weekday",
        })
    }
}

/// Name source for a custom calendar. Keys are calendar-defined strings,
/// typically produced by the calendar's key derivation functions. A
/// language-narrowed entry, when present, wins over the general one.
pub trait LocaleData: fmt::Debug + Send + Sync {
    fn lookup(&self, kind: FieldKind, width: FieldWidth, key: &str) -> Option<String>;

    fn lookup_for_language(
        &self,
        _language: &str,
        _kind: FieldKind,
        _width: FieldWidth,
        _key: &str,
    ) -> Option<String> {
        None
    }
}

/// In-memory repository backed by hash maps. Suitable for calendars that
/// ship their own name tables.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    general: HashMap<(FieldKind, FieldWidth, String), String>,
    by_language: HashMap<(String, FieldKind, FieldWidth, String), String>,
}

impl MemoryRepository {
    pub fn new() -> MemoryRepository {
        MemoryRepository::default()
    }

    pub fn insert(&mut self, kind: FieldKind, width: FieldWidth, key: &str, value: &str) {
        self.general
            .insert((kind, width, key.to_string()), value.to_string());
    }

    pub fn insert_for_language(
        &mut self,
        language: &str,
        kind: FieldKind,
        width: FieldWidth,
        key: &str,
        value: &str,
    ) {
        self.by_language.insert(
            (language.to_string(), kind, width, key.to_string()),
            value.to_string(),
        );
    }
}

impl LocaleData for MemoryRepository {
    fn lookup(&self, kind: FieldKind, width: FieldWidth, key: &str) -> Option<String> {
        self.general
            .get(&(kind, width, key.to_string()))
            .cloned()
    }

    fn lookup_for_language(
        &self,
        language: &str,
        kind: FieldKind,
        width: FieldWidth,
        key: &str,
    ) -> Option<String> {
        self.by_language
            .get(&(language.to_string(), kind, width, key.to_string()))
            .cloned()
    }
}
