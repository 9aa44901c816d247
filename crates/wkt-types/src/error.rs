//! Error types for wkt-types crate.

use crate::timestamp::TimestampError;
use thiserror::Error;

/// Error type produced by the PostgreSQL client library's `ToSql`/`FromSql`.
pub type BoxError = Box<dyn std::error::Error + Sync + Send>;

/// Errors that can occur while converting well-known types to or from columns.
#[derive(Error, Debug)]
pub enum ConversionError {
    /// The reader was handed a destination it cannot store its wrapper into.
    #[error("cannot scan {wrapper} into destination of type {destination}")]
    Unassignable {
        destination: &'static str,
        wrapper: &'static str,
    },

    /// The client library failed to decode the raw column bytes.
    #[error("failed to decode {wrapper} from {pg_type} column: {source}")]
    Decode {
        wrapper: &'static str,
        pg_type: String,
        #[source]
        source: BoxError,
    },

    /// The client library failed to encode the wrapper payload.
    #[error("failed to encode {wrapper} into {pg_type} column: {source}")]
    Encode {
        wrapper: &'static str,
        pg_type: String,
        #[source]
        source: BoxError,
    },

    #[error(transparent)]
    InvalidTimestamp(#[from] TimestampError),

    /// The wrapper has no encoding for this column type.
    #[error("{wrapper} cannot be stored in a {pg_type} column")]
    UnsupportedColumn {
        wrapper: &'static str,
        pg_type: String,
    },

    #[error("value {value} out of range for {wrapper}")]
    OutOfRange { wrapper: &'static str, value: String },

    /// A type-erased writer was dispatched a value of another type.
    #[error("expected a {expected} value")]
    WrongWrapperType { expected: &'static str },

    /// SQL NULL was scanned into a destination that cannot be absent.
    #[error("cannot scan NULL into non-optional destination {destination}")]
    UnexpectedNull { destination: &'static str },

    #[error("no conversion registered for {0}")]
    NotRegistered(&'static str),

    /// The row did not yield the requested column.
    #[error("Row access error: {0}")]
    Row(#[from] tokio_postgres::Error),
}

impl ConversionError {
    pub(crate) fn decode(wrapper: &'static str, ty: &postgres_types::Type, source: BoxError) -> Self {
        ConversionError::Decode {
            wrapper,
            pg_type: ty.name().to_string(),
            source,
        }
    }

    pub(crate) fn encode(wrapper: &'static str, ty: &postgres_types::Type, source: BoxError) -> Self {
        ConversionError::Encode {
            wrapper,
            pg_type: ty.name().to_string(),
            source,
        }
    }

    pub(crate) fn unsupported(wrapper: &'static str, ty: &postgres_types::Type) -> Self {
        ConversionError::UnsupportedColumn {
            wrapper,
            pg_type: ty.name().to_string(),
        }
    }
}

/// Result type alias for wkt-types operations.
pub type Result<T> = std::result::Result<T, ConversionError>;
