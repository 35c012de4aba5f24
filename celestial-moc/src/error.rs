//! Error types for MOC construction, algebra and serialization.
//!
//! Everything in the crate returns [`MocResult<T>`]. Validation failures on
//! orders and cells carry a [`ValueErrorKind`] so callers can tell text that
//! could not be read as an integer apart from an integer outside the valid
//! range.
//!
//! | Variant | Raised by |
//! |---------|-----------|
//! | [`InvalidOrder`](MocError::InvalidOrder) | `add`, `remove`, `normalize_to`, `cells_at`, codecs |
//! | [`InvalidCell`](MocError::InvalidCell) | `add`, `remove`, codecs |
//! | [`InvalidType`](MocError::InvalidType) | `Moc::set_type`, FITS metadata import |
//! | [`UnknownFormat`](MocError::UnknownFormat) | file-type inference |
//! | [`TypeMismatch`](MocError::TypeMismatch) | JSON documents that are not shaped like a MOC |
//! | [`Parse`](MocError::Parse) | malformed range text or catalog text |
//! | [`InvalidArgument`](MocError::InvalidArgument) | catalog query parameters |
//! | [`Fits`](MocError::Fits) | malformed FITS structure |
//! | [`Command`](MocError::Command) | `moc-tool` usage errors |

use thiserror::Error;

/// Why an order or cell value was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueErrorKind {
    /// The input could not be read as an integer.
    NotConvertible,
    /// The integer lies outside the valid range.
    OutOfRange,
}

#[derive(Error, Debug)]
pub enum MocError {
    #[error("Invalid MOC order '{order}' ({kind:?}): {message}")]
    InvalidOrder {
        order: String,
        kind: ValueErrorKind,
        message: String,
    },

    #[error("Invalid MOC cell '{cell}' at order {order} ({kind:?}): {message}")]
    InvalidCell {
        order: u8,
        cell: String,
        kind: ValueErrorKind,
        message: String,
    },

    #[error("Invalid MOC type '{0}': must be one of IMAGE, CATALOG")]
    InvalidType(String),

    #[error("Unknown MOC file format: {0}")]
    UnknownFormat(String),

    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("Parse error ({format}): {message}")]
    Parse { format: String, message: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("FITS error: {0}")]
    Fits(String),

    #[error("Command error: {0}")]
    Command(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type MocResult<T> = Result<T, MocError>;

impl MocError {
    pub fn invalid_order(order: impl ToString, kind: ValueErrorKind, reason: &str) -> Self {
        Self::InvalidOrder {
            order: order.to_string(),
            kind,
            message: reason.to_string(),
        }
    }

    pub fn invalid_cell(
        order: u8,
        cell: impl ToString,
        kind: ValueErrorKind,
        reason: &str,
    ) -> Self {
        Self::InvalidCell {
            order,
            cell: cell.to_string(),
            kind,
            message: reason.to_string(),
        }
    }

    pub fn type_mismatch(expected: &str, found: &str) -> Self {
        Self::TypeMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    pub fn parse(format: &str, reason: impl Into<String>) -> Self {
        Self::Parse {
            format: format.to_string(),
            message: reason.into(),
        }
    }

    /// Returns the validation kind for order and cell errors.
    pub fn value_kind(&self) -> Option<ValueErrorKind> {
        match self {
            Self::InvalidOrder { kind, .. } | Self::InvalidCell { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// `true` for errors raised by a value outside its permitted range
    /// (orders, cells and MOC types).
    pub fn is_range_error(&self) -> bool {
        matches!(self, Self::InvalidType(_))
            || self.value_kind() == Some(ValueErrorKind::OutOfRange)
    }
}
