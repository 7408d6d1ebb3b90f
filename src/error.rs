use thiserror::Error;

/// Everything in this crate fails synchronously at the point of detection.
/// There are no internal retries and no partial results: an operation either
/// returns a complete value or one of these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Bad constructor input: unknown built-in calendar name, malformed ISO
    /// text, out-of-range field values, unknown zone name.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An enumerated option value outside its vocabulary.
    #[error("invalid option: {0}")]
    InvalidOption(String),

    /// The bound chronology does not implement the requested operation
    /// (week-field conversions, leap-year check).
    #[error("capability not supported: {0}")]
    UnsupportedCapability(String),

    /// A calendar that the formatting pipeline refuses outright, such as a
    /// lunisolar canvas or a non-Gregorian-like canvas in `Fields` mode.
    #[error("unsupported calendar: {0}")]
    UnsupportedCalendar(String),

    /// A field bag whose year/era/full-year or month/month-code groups are
    /// mutually inconsistent and cannot be resolved deterministically.
    #[error("ambiguous fields: {0}")]
    AmbiguousFields(String),
}

impl Error {
    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    pub(crate) fn unsupported_capability(msg: impl Into<String>) -> Self {
        Error::UnsupportedCapability(msg.into())
    }
}
