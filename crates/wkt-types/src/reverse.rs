//! Reverse conversion: PostgreSQL column bytes → well-known type.
//!
//! The raw column is decoded with the client library's `FromSql` for the
//! matching primitive, then wrapped in a fresh protobuf message.

use chrono::{DateTime, NaiveDateTime, Utc};
use postgres_types::{FromSql, Type};
use protobuf::well_known_types::timestamp::Timestamp;
use protobuf::well_known_types::wrappers::{
    BoolValue, BytesValue, DoubleValue, FloatValue, Int32Value, Int64Value, StringValue,
    UInt32Value, UInt64Value,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::carrier::ScalarCarrier;
use crate::error::{BoxError, ConversionError, Result};
use crate::timestamp;
use crate::WellKnownType;

/// Decode a value from a PostgreSQL column.
pub trait FromColumn: Sized {
    /// Whether this value can be read from a column of type `ty`.
    fn reads_from(ty: &Type) -> bool;

    /// Decode `raw`, the complete non-NULL value of one column.
    fn from_column(ty: &Type, raw: &[u8]) -> Result<Self>;
}

/// How 32-bit wrappers treat integers that do not fit their width.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Narrowing {
    /// Keep the low 32 bits, like an `as` cast. 2^32 reads as 0.
    #[default]
    Truncate,
    /// Report [`ConversionError::OutOfRange`].
    Checked,
}

fn decode_error<W: WellKnownType>(ty: &Type, source: BoxError) -> ConversionError {
    ConversionError::decode(W::KIND.full_name(), ty, source)
}

fn unsupported<W: WellKnownType>(ty: &Type) -> ConversionError {
    ConversionError::unsupported(W::KIND.full_name(), ty)
}

fn out_of_range<W: WellKnownType>(value: impl ToString) -> ConversionError {
    ConversionError::OutOfRange {
        wrapper: W::KIND.full_name(),
        value: value.to_string(),
    }
}

fn is_integer(ty: &Type) -> bool {
    *ty == Type::INT2 || *ty == Type::INT4 || *ty == Type::INT8
}

/// Decode any integer column as a 64-bit signed integer.
fn read_integer<W: WellKnownType>(ty: &Type, raw: &[u8]) -> Result<i64> {
    let decoded = match ty {
        t if *t == Type::INT2 => i16::from_sql(ty, raw).map(i64::from),
        t if *t == Type::INT4 => i32::from_sql(ty, raw).map(i64::from),
        t if *t == Type::INT8 => i64::from_sql(ty, raw),
        _ => return Err(unsupported::<W>(ty)),
    };
    decoded.map_err(|e| decode_error::<W>(ty, e))
}

/// Read an `Int32Value`: decode 64 bits, then narrow according to `narrowing`.
pub fn read_int32(ty: &Type, raw: &[u8], narrowing: Narrowing) -> Result<Int32Value> {
    let wide = read_integer::<Int32Value>(ty, raw)?;
    let value = match narrowing {
        Narrowing::Truncate => wide as i32,
        Narrowing::Checked => {
            i32::try_from(wide).map_err(|_| out_of_range::<Int32Value>(wide))?
        }
    };
    Ok(Int32Value::wrap(value))
}

/// Read a `UInt32Value`: decode 64 bits, then narrow according to `narrowing`.
pub fn read_uint32(ty: &Type, raw: &[u8], narrowing: Narrowing) -> Result<UInt32Value> {
    if *ty == Type::OID {
        let value = u32::from_sql(ty, raw).map_err(|e| decode_error::<UInt32Value>(ty, e))?;
        return Ok(UInt32Value::wrap(value));
    }
    let wide = read_integer::<UInt32Value>(ty, raw)?;
    let value = match narrowing {
        Narrowing::Truncate => wide as u32,
        Narrowing::Checked => {
            u32::try_from(wide).map_err(|_| out_of_range::<UInt32Value>(wide))?
        }
    };
    Ok(UInt32Value::wrap(value))
}

impl FromColumn for DoubleValue {
    fn reads_from(ty: &Type) -> bool {
        *ty == Type::FLOAT8 || *ty == Type::FLOAT4
    }

    fn from_column(ty: &Type, raw: &[u8]) -> Result<Self> {
        let value = match ty {
            t if *t == Type::FLOAT8 => f64::from_sql(ty, raw),
            t if *t == Type::FLOAT4 => f32::from_sql(ty, raw).map(f64::from),
            _ => return Err(unsupported::<Self>(ty)),
        };
        value
            .map(Self::wrap)
            .map_err(|e| decode_error::<Self>(ty, e))
    }
}

impl FromColumn for FloatValue {
    fn reads_from(ty: &Type) -> bool {
        *ty == Type::FLOAT4
    }

    fn from_column(ty: &Type, raw: &[u8]) -> Result<Self> {
        if !Self::reads_from(ty) {
            return Err(unsupported::<Self>(ty));
        }
        f32::from_sql(ty, raw)
            .map(Self::wrap)
            .map_err(|e| decode_error::<Self>(ty, e))
    }
}

impl FromColumn for Int64Value {
    fn reads_from(ty: &Type) -> bool {
        is_integer(ty)
    }

    fn from_column(ty: &Type, raw: &[u8]) -> Result<Self> {
        read_integer::<Self>(ty, raw).map(Self::wrap)
    }
}

impl FromColumn for UInt64Value {
    fn reads_from(ty: &Type) -> bool {
        *ty == Type::INT8 || *ty == Type::NUMERIC
    }

    fn from_column(ty: &Type, raw: &[u8]) -> Result<Self> {
        match ty {
            t if *t == Type::INT8 => {
                let bits = i64::from_sql(ty, raw).map_err(|e| decode_error::<Self>(ty, e))?;
                Ok(Self::wrap(bits as u64))
            }
            t if *t == Type::NUMERIC => {
                let decimal =
                    Decimal::from_sql(ty, raw).map_err(|e| decode_error::<Self>(ty, e))?;
                if !decimal.fract().is_zero() {
                    return Err(out_of_range::<Self>(decimal));
                }
                decimal
                    .to_u64()
                    .map(Self::wrap)
                    .ok_or_else(|| out_of_range::<Self>(decimal))
            }
            _ => Err(unsupported::<Self>(ty)),
        }
    }
}

impl FromColumn for Int32Value {
    fn reads_from(ty: &Type) -> bool {
        is_integer(ty)
    }

    fn from_column(ty: &Type, raw: &[u8]) -> Result<Self> {
        read_int32(ty, raw, Narrowing::Truncate)
    }
}

impl FromColumn for UInt32Value {
    fn reads_from(ty: &Type) -> bool {
        is_integer(ty) || *ty == Type::OID
    }

    fn from_column(ty: &Type, raw: &[u8]) -> Result<Self> {
        read_uint32(ty, raw, Narrowing::Truncate)
    }
}

impl FromColumn for BoolValue {
    fn reads_from(ty: &Type) -> bool {
        *ty == Type::BOOL
    }

    fn from_column(ty: &Type, raw: &[u8]) -> Result<Self> {
        if !Self::reads_from(ty) {
            return Err(unsupported::<Self>(ty));
        }
        bool::from_sql(ty, raw)
            .map(Self::wrap)
            .map_err(|e| decode_error::<Self>(ty, e))
    }
}

impl FromColumn for StringValue {
    fn reads_from(ty: &Type) -> bool {
        <String as FromSql>::accepts(ty)
    }

    fn from_column(ty: &Type, raw: &[u8]) -> Result<Self> {
        if !Self::reads_from(ty) {
            return Err(unsupported::<Self>(ty));
        }
        String::from_sql(ty, raw)
            .map(Self::wrap)
            .map_err(|e| decode_error::<Self>(ty, e))
    }
}

impl FromColumn for BytesValue {
    fn reads_from(ty: &Type) -> bool {
        *ty == Type::BYTEA
    }

    fn from_column(ty: &Type, raw: &[u8]) -> Result<Self> {
        if !Self::reads_from(ty) {
            return Err(unsupported::<Self>(ty));
        }
        Vec::<u8>::from_sql(ty, raw)
            .map(Self::wrap)
            .map_err(|e| decode_error::<Self>(ty, e))
    }
}

/// Reads are re-validated: an instant outside years 1..=9999 decodes fine
/// but is still reported as [`ConversionError::InvalidTimestamp`].
impl FromColumn for Timestamp {
    fn reads_from(ty: &Type) -> bool {
        *ty == Type::TIMESTAMPTZ || *ty == Type::TIMESTAMP
    }

    fn from_column(ty: &Type, raw: &[u8]) -> Result<Self> {
        let instant = match ty {
            t if *t == Type::TIMESTAMPTZ => DateTime::<Utc>::from_sql(ty, raw),
            t if *t == Type::TIMESTAMP => NaiveDateTime::from_sql(ty, raw).map(|n| n.and_utc()),
            _ => return Err(unsupported::<Self>(ty)),
        }
        .map_err(|e| decode_error::<Self>(ty, e))?;

        let ts = timestamp::from_datetime(instant);
        timestamp::check_valid(&ts)?;
        Ok(ts)
    }
}
