//! Offline round trips through the public registry API.
//!
//! Values are encoded with the registered writer for each kind's default
//! column type and scanned back with the registered reader, exactly as
//! `tokio-postgres` would drive them with binary-format parameters and rows.

use bytes::BytesMut;
use postgres_types::{IsNull, Type};
use protobuf::well_known_types::timestamp::Timestamp;
use protobuf::well_known_types::wrappers::{
    BoolValue, BytesValue, DoubleValue, FloatValue, Int32Value, Int64Value, StringValue,
    UInt32Value, UInt64Value,
};
use std::any::Any;
use wkt_types::{
    carrier, ConversionError, ConversionRegistry, Narrowing, RegistryOptions, WellKnownType,
    WktKind,
};

fn registry() -> ConversionRegistry {
    ConversionRegistry::with_well_known_types(&RegistryOptions::default())
}

fn round_trip<W: WellKnownType>(registry: &ConversionRegistry, value: W) -> W {
    let ty = W::KIND.column_type();
    let mut buf = BytesMut::new();
    let is_null = registry.write(&value, &ty, &mut buf).unwrap();
    assert!(matches!(is_null, IsNull::No), "{} wrote NULL", W::KIND);

    let mut dest: Option<W> = None;
    registry.scan(&mut dest, &ty, Some(&buf[..])).unwrap();
    dest.unwrap_or_else(|| panic!("{} scanned nothing", W::KIND))
}

#[test]
fn test_every_kind_round_trips_on_default_column() {
    let registry = registry();

    let mut ts = Timestamp::new();
    ts.seconds = 1_700_000_000;
    ts.nanos = 123_456_000;

    assert_eq!(round_trip(&registry, ts.clone()), ts);
    assert_eq!(round_trip(&registry, carrier::double(-2.5)), carrier::double(-2.5));
    assert_eq!(round_trip(&registry, carrier::float(0.25)), carrier::float(0.25));
    assert_eq!(round_trip(&registry, carrier::int64(i64::MIN)), carrier::int64(i64::MIN));
    assert_eq!(round_trip(&registry, carrier::uint64(u64::MAX)), carrier::uint64(u64::MAX));
    assert_eq!(round_trip(&registry, carrier::int32(i32::MIN)), carrier::int32(i32::MIN));
    assert_eq!(round_trip(&registry, carrier::uint32(u32::MAX)), carrier::uint32(u32::MAX));
    assert_eq!(round_trip(&registry, carrier::bool(true)), carrier::bool(true));
    assert_eq!(
        round_trip(&registry, carrier::string("héllo".to_string())),
        carrier::string("héllo".to_string())
    );
    assert_eq!(
        round_trip(&registry, carrier::bytes(vec![0, 255, 7])),
        carrier::bytes(vec![0, 255, 7])
    );
}

#[test]
fn test_registry_covers_every_kind_once() {
    let registry = registry();
    assert_eq!(registry.len(), WktKind::ALL.len());

    let kinds: Vec<WktKind> = registry.iter().map(|c| c.kind).collect();
    assert_eq!(kinds, WktKind::ALL.to_vec());

    assert!(registry.lookup::<DoubleValue>().is_some());
    assert!(registry.lookup::<Option<FloatValue>>().is_some());
    assert!(registry.lookup::<i32>().is_none());
}

#[test]
fn test_null_scan_clears_reused_destination() {
    let registry = registry();
    let mut dest: Option<Int64Value> = None;

    // Value row, then NULL row, into the same destination
    registry
        .scan(&mut dest, &Type::INT8, Some(&9i64.to_be_bytes()[..]))
        .unwrap();
    assert_eq!(dest, Some(carrier::int64(9)));
    registry.scan(&mut dest, &Type::INT8, None).unwrap();
    assert_eq!(dest, None);

    let mut bare = carrier::bool(true);
    let err = registry.scan(&mut bare, &Type::BOOL, None).unwrap_err();
    assert!(matches!(err, ConversionError::UnexpectedNull { .. }));
    assert!(bare.value);
}

#[test]
fn test_optional_none_writes_null() {
    let registry = registry();
    let value: Option<BytesValue> = None;
    let mut buf = BytesMut::new();

    let is_null = registry.write(&value, &Type::BYTEA, &mut buf).unwrap();
    assert!(matches!(is_null, IsNull::Yes));
    assert!(buf.is_empty());
}

#[test]
fn test_unregistered_value_is_rejected() {
    let registry = registry();
    let value: &dyn Any = &42u8;
    let mut buf = BytesMut::new();

    let err = registry.write(value, &Type::INT2, &mut buf).err().unwrap();
    assert!(matches!(err, ConversionError::NotRegistered(_)));
}

#[test]
fn test_wrong_column_type_is_rejected() {
    let registry = registry();
    let mut buf = BytesMut::new();

    let err = registry
        .write(&carrier::string("x".to_string()), &Type::INT4, &mut buf)
        .err()
        .unwrap();
    assert!(matches!(err, ConversionError::UnsupportedColumn { .. }));

    let mut dest: Option<BoolValue> = None;
    let err = registry
        .scan(&mut dest, &Type::TEXT, Some(&b"true"[..]))
        .unwrap_err();
    assert!(matches!(err, ConversionError::UnsupportedColumn { .. }));
    assert!(dest.is_none());
}

#[test]
fn test_uint32_wraps_unless_checked() {
    let raw = (1i64 << 32).to_be_bytes();

    let mut dest: Option<UInt32Value> = None;
    registry()
        .scan(&mut dest, &Type::INT8, Some(&raw[..]))
        .unwrap();
    assert_eq!(dest, Some(carrier::uint32(0)));

    let checked = ConversionRegistry::with_well_known_types(&RegistryOptions {
        narrowing: Narrowing::Checked,
    });
    let mut dest: Option<UInt32Value> = None;
    let err = checked
        .scan(&mut dest, &Type::INT8, Some(&raw[..]))
        .unwrap_err();
    assert!(matches!(err, ConversionError::OutOfRange { .. }));
}

#[test]
fn test_int32_reads_wider_integer_columns() {
    let registry = registry();
    let raw = 70_000i64.to_be_bytes();

    let mut dest: Option<Int32Value> = None;
    registry.scan(&mut dest, &Type::INT8, Some(&raw[..])).unwrap();
    assert_eq!(dest, Some(carrier::int32(70_000)));
}

#[test]
fn test_invalid_timestamp_write_is_an_error() {
    let registry = registry();
    let mut ts = Timestamp::new();
    ts.seconds = 0;
    ts.nanos = -1;

    let mut buf = BytesMut::new();
    let err = registry
        .write(&ts, &Type::TIMESTAMPTZ, &mut buf)
        .err()
        .unwrap();
    assert!(matches!(err, ConversionError::InvalidTimestamp(_)));
    assert!(buf.is_empty());
}

#[test]
fn test_scan_into_mismatched_destination() {
    let registry = registry();
    let raw = 1.5f64.to_be_bytes();

    // Destination type picks the reader; a plain f64 has none
    let mut dest = 0.0f64;
    let err = registry
        .scan(&mut dest, &Type::FLOAT8, Some(&raw[..]))
        .unwrap_err();
    assert!(matches!(err, ConversionError::NotRegistered(_)));

    let mut dest: Option<StringValue> = None;
    let err = registry
        .scan(&mut dest, &Type::FLOAT8, Some(&raw[..]))
        .unwrap_err();
    assert!(matches!(err, ConversionError::UnsupportedColumn { .. }));
}

#[test]
fn test_uint64_numeric_round_trip() {
    let registry = registry();
    let mut buf = BytesMut::new();
    registry
        .write(&carrier::uint64(12), &Type::NUMERIC, &mut buf)
        .unwrap();

    let mut dest: Option<UInt64Value> = None;
    registry
        .scan(&mut dest, &Type::NUMERIC, Some(&buf[..]))
        .unwrap();
    assert_eq!(dest, Some(carrier::uint64(12)));
}
