//! Forward conversion: well-known type → PostgreSQL column bytes.
//!
//! Each writer unwraps the protobuf message and hands the scalar to the
//! client library's own `ToSql` implementation, so the bytes on the wire are
//! exactly those of a plain `f64`, `i64`, `String`, ... parameter.

use bytes::BytesMut;
use chrono::{DateTime, NaiveDateTime, Utc};
use postgres_types::{IsNull, ToSql, Type};
use protobuf::well_known_types::timestamp::Timestamp;
use protobuf::well_known_types::wrappers::{
    BoolValue, BytesValue, DoubleValue, FloatValue, Int32Value, Int64Value, StringValue,
    UInt32Value, UInt64Value,
};
use rust_decimal::Decimal;

use crate::error::{ConversionError, Result};
use crate::timestamp;
use crate::WellKnownType;

/// Encode a value into a PostgreSQL column.
pub trait ToColumn {
    /// Whether this value can be written into a column of type `ty`.
    fn writes_to(ty: &Type) -> bool;

    /// Append the column encoding of `self` to `out`.
    fn to_column(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull>;
}

/// Encode `scalar` with the client library's `ToSql` for `ty`.
fn encode<W: WellKnownType, S: ToSql>(scalar: &S, ty: &Type, out: &mut BytesMut) -> Result<IsNull> {
    scalar
        .to_sql(ty, out)
        .map_err(|e| ConversionError::encode(W::KIND.full_name(), ty, e))
}

fn unsupported<W: WellKnownType>(ty: &Type) -> ConversionError {
    ConversionError::unsupported(W::KIND.full_name(), ty)
}

impl ToColumn for DoubleValue {
    fn writes_to(ty: &Type) -> bool {
        *ty == Type::FLOAT8
    }

    fn to_column(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull> {
        if !Self::writes_to(ty) {
            return Err(unsupported::<Self>(ty));
        }
        encode::<Self, _>(&self.value, ty, out)
    }
}

impl ToColumn for FloatValue {
    fn writes_to(ty: &Type) -> bool {
        *ty == Type::FLOAT4
    }

    fn to_column(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull> {
        if !Self::writes_to(ty) {
            return Err(unsupported::<Self>(ty));
        }
        encode::<Self, _>(&self.value, ty, out)
    }
}

impl ToColumn for Int64Value {
    fn writes_to(ty: &Type) -> bool {
        *ty == Type::INT8
    }

    fn to_column(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull> {
        if !Self::writes_to(ty) {
            return Err(unsupported::<Self>(ty));
        }
        encode::<Self, _>(&self.value, ty, out)
    }
}

impl ToColumn for UInt64Value {
    fn writes_to(ty: &Type) -> bool {
        *ty == Type::INT8 || *ty == Type::NUMERIC
    }

    fn to_column(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull> {
        match ty {
            // Two's-complement reinterpretation keeps every u64 round-trippable.
            t if *t == Type::INT8 => encode::<Self, _>(&(self.value as i64), ty, out),
            t if *t == Type::NUMERIC => encode::<Self, _>(&Decimal::from(self.value), ty, out),
            _ => Err(unsupported::<Self>(ty)),
        }
    }
}

impl ToColumn for Int32Value {
    fn writes_to(ty: &Type) -> bool {
        *ty == Type::INT4 || *ty == Type::INT8
    }

    fn to_column(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull> {
        match ty {
            t if *t == Type::INT4 => encode::<Self, _>(&self.value, ty, out),
            t if *t == Type::INT8 => encode::<Self, _>(&i64::from(self.value), ty, out),
            _ => Err(unsupported::<Self>(ty)),
        }
    }
}

impl ToColumn for UInt32Value {
    fn writes_to(ty: &Type) -> bool {
        *ty == Type::INT8 || *ty == Type::OID
    }

    fn to_column(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull> {
        match ty {
            t if *t == Type::INT8 => encode::<Self, _>(&i64::from(self.value), ty, out),
            t if *t == Type::OID => encode::<Self, _>(&self.value, ty, out),
            _ => Err(unsupported::<Self>(ty)),
        }
    }
}

impl ToColumn for BoolValue {
    fn writes_to(ty: &Type) -> bool {
        *ty == Type::BOOL
    }

    fn to_column(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull> {
        if !Self::writes_to(ty) {
            return Err(unsupported::<Self>(ty));
        }
        encode::<Self, _>(&self.value, ty, out)
    }
}

impl ToColumn for StringValue {
    fn writes_to(ty: &Type) -> bool {
        <String as ToSql>::accepts(ty)
    }

    fn to_column(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull> {
        if !Self::writes_to(ty) {
            return Err(unsupported::<Self>(ty));
        }
        encode::<Self, _>(&self.value, ty, out)
    }
}

impl ToColumn for BytesValue {
    fn writes_to(ty: &Type) -> bool {
        *ty == Type::BYTEA
    }

    fn to_column(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull> {
        if !Self::writes_to(ty) {
            return Err(unsupported::<Self>(ty));
        }
        encode::<Self, _>(&self.value, ty, out)
    }
}

/// Writes the instant as `timestamptz`, or as a UTC wall-clock `timestamp`.
///
/// PostgreSQL keeps microseconds. Sub-microsecond `nanos` are truncated
/// toward 2000-01-01, the server's epoch: later instants round down, earlier
/// instants round up to the next microsecond.
///
/// An invalid timestamp is returned as [`ConversionError::InvalidTimestamp`]
/// before anything is appended to `out`. Callers that relied on the write
/// aborting must check for this error instead.
impl ToColumn for Timestamp {
    fn writes_to(ty: &Type) -> bool {
        *ty == Type::TIMESTAMPTZ || *ty == Type::TIMESTAMP
    }

    fn to_column(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull> {
        if !Self::writes_to(ty) {
            return Err(unsupported::<Self>(ty));
        }
        let instant: DateTime<Utc> = timestamp::to_datetime(self)?;
        if *ty == Type::TIMESTAMP {
            let naive: NaiveDateTime = instant.naive_utc();
            encode::<Self, _>(&naive, ty, out)
        } else {
            encode::<Self, _>(&instant, ty, out)
        }
    }
}
