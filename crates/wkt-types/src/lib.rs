//! PostgreSQL column conversions for protobuf well-known types.
//!
//! This crate lets `tokio-postgres` bind and scan the nullable scalar wrappers
//! from `google/protobuf/wrappers.proto` and `google.protobuf.Timestamp` as
//! plain PostgreSQL column values. A wrapper is unwrapped to its primitive
//! and encoded exactly like that primitive; scanning decodes the primitive
//! and wraps it again.
//!
//! # Modules
//!
//! - [`forward`] - wrapper → column bytes (writers)
//! - [`reverse`] - column bytes → wrapper (readers)
//! - [`registry`] - runtime-type keyed writer/reader table
//! - [`sql`] - `ToSql`/`FromSql` glue for `tokio-postgres`
//! - [`ddl`] - column type DDL for each wrapper
//!
//! # Example
//!
//! ```ignore
//! use wkt_types::{carrier, ConversionRegistry, Pb, RegistryOptions};
//!
//! // Static dispatch through the Pb newtype
//! client
//!     .execute("INSERT INTO t (n) VALUES ($1)", &[&Pb(carrier::int32(-7))])
//!     .await?;
//! let n: Option<Pb<Int32Value>> = row.get("n");
//!
//! // Dynamic dispatch through a registry built once at startup
//! let registry = ConversionRegistry::with_well_known_types(&RegistryOptions::default());
//! ```

use std::fmt::Debug;

use protobuf::well_known_types::timestamp::Timestamp;
use protobuf::well_known_types::wrappers::{
    BoolValue, BytesValue, DoubleValue, FloatValue, Int32Value, Int64Value, StringValue,
    UInt32Value, UInt64Value,
};

pub mod carrier;
pub mod ddl;
pub mod destination;
pub mod error;
pub mod forward;
pub mod kind;
pub mod registry;
pub mod reverse;
pub mod sql;
pub mod timestamp;

pub use carrier::ScalarCarrier;
pub use ddl::{PostgreSQLDdl, ToDdl};
pub use destination::{assign, assign_null, Destination};
pub use error::{ConversionError, Result};
pub use forward::ToColumn;
pub use kind::WktKind;
pub use registry::{
    register_well_known_types, Conversion, ConversionRegistry, NullReader, Reader, RegistryOptions,
    Writer,
};
pub use reverse::{FromColumn, Narrowing};
pub use sql::{scan_column, Pb, RawColumn, RegistryParam};
pub use timestamp::TimestampError;

/// A protobuf well-known type with a PostgreSQL column mapping.
pub trait WellKnownType:
    ToColumn + FromColumn + Debug + Clone + PartialEq + Send + Sync + 'static
{
    const KIND: WktKind;
}

impl WellKnownType for Timestamp {
    const KIND: WktKind = WktKind::Timestamp;
}

impl WellKnownType for DoubleValue {
    const KIND: WktKind = WktKind::Double;
}

impl WellKnownType for FloatValue {
    const KIND: WktKind = WktKind::Float;
}

impl WellKnownType for Int64Value {
    const KIND: WktKind = WktKind::Int64;
}

impl WellKnownType for UInt64Value {
    const KIND: WktKind = WktKind::UInt64;
}

impl WellKnownType for Int32Value {
    const KIND: WktKind = WktKind::Int32;
}

impl WellKnownType for UInt32Value {
    const KIND: WktKind = WktKind::UInt32;
}

impl WellKnownType for BoolValue {
    const KIND: WktKind = WktKind::Bool;
}

impl WellKnownType for StringValue {
    const KIND: WktKind = WktKind::String;
}

impl WellKnownType for BytesValue {
    const KIND: WktKind = WktKind::Bytes;
}
