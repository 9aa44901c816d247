//! The closed set of supported well-known types.

use postgres_types::Type;
use std::fmt;

/// One supported protobuf well-known type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WktKind {
    Timestamp,
    Double,
    Float,
    Int64,
    UInt64,
    Int32,
    UInt32,
    Bool,
    String,
    Bytes,
}

impl WktKind {
    /// Every kind, in registration order.
    pub const ALL: [WktKind; 10] = [
        WktKind::Timestamp,
        WktKind::Double,
        WktKind::Float,
        WktKind::Int64,
        WktKind::UInt64,
        WktKind::Int32,
        WktKind::UInt32,
        WktKind::Bool,
        WktKind::String,
        WktKind::Bytes,
    ];

    /// Fully qualified protobuf message name.
    pub fn full_name(&self) -> &'static str {
        match self {
            WktKind::Timestamp => "google.protobuf.Timestamp",
            WktKind::Double => "google.protobuf.DoubleValue",
            WktKind::Float => "google.protobuf.FloatValue",
            WktKind::Int64 => "google.protobuf.Int64Value",
            WktKind::UInt64 => "google.protobuf.UInt64Value",
            WktKind::Int32 => "google.protobuf.Int32Value",
            WktKind::UInt32 => "google.protobuf.UInt32Value",
            WktKind::Bool => "google.protobuf.BoolValue",
            WktKind::String => "google.protobuf.StringValue",
            WktKind::Bytes => "google.protobuf.BytesValue",
        }
    }

    /// Look a kind up by its fully qualified protobuf message name.
    pub fn from_full_name(name: &str) -> Option<WktKind> {
        WktKind::ALL.into_iter().find(|k| k.full_name() == name)
    }

    /// The column type a wrapper of this kind is stored in by default.
    pub fn column_type(&self) -> Type {
        match self {
            WktKind::Timestamp => Type::TIMESTAMPTZ,
            WktKind::Double => Type::FLOAT8,
            WktKind::Float => Type::FLOAT4,
            WktKind::Int64 => Type::INT8,
            // PostgreSQL has no unsigned 64-bit integer
            WktKind::UInt64 => Type::NUMERIC,
            WktKind::Int32 => Type::INT4,
            WktKind::UInt32 => Type::INT8,
            WktKind::Bool => Type::BOOL,
            WktKind::String => Type::TEXT,
            WktKind::Bytes => Type::BYTEA,
        }
    }
}

impl fmt::Display for WktKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.full_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name_lookup() {
        for kind in WktKind::ALL {
            assert_eq!(WktKind::from_full_name(kind.full_name()), Some(kind));
        }
        assert_eq!(WktKind::from_full_name("google.protobuf.Any"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(WktKind::UInt32.to_string(), "google.protobuf.UInt32Value");
    }
}
