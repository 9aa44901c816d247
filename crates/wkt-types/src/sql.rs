//! `tokio-postgres` glue.
//!
//! - [`Pb`] binds and scans a wrapper through static dispatch.
//! - [`RegistryParam`] binds any registered value through a [`ConversionRegistry`].
//! - [`RawColumn`] exposes a column's raw bytes so [`scan_column`] can hand
//!   them to the registry.

use std::any::Any;

use bytes::BytesMut;
use postgres_types::{to_sql_checked, FromSql, IsNull, ToSql, Type};
use tokio_postgres::Row;

use crate::destination::Destination;
use crate::error::{BoxError, Result};
use crate::registry::ConversionRegistry;
use crate::WellKnownType;

/// A well-known type usable directly as a query parameter or row value.
///
/// `Option<Pb<W>>` maps SQL NULL to `None` without ever calling the reader.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Pb<W>(pub W);

impl<W> Pb<W> {
    pub fn into_inner(self) -> W {
        self.0
    }
}

impl<W: WellKnownType> From<W> for Pb<W> {
    fn from(wrapper: W) -> Self {
        Pb(wrapper)
    }
}

impl<W: WellKnownType> ToSql for Pb<W> {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> std::result::Result<IsNull, BoxError> {
        self.0.to_column(ty, out).map_err(Into::into)
    }

    fn accepts(ty: &Type) -> bool {
        W::writes_to(ty)
    }

    to_sql_checked!();
}

impl<'a, W: WellKnownType> FromSql<'a> for Pb<W> {
    fn from_sql(ty: &Type, raw: &'a [u8]) -> std::result::Result<Self, BoxError> {
        W::from_column(ty, raw).map(Pb).map_err(Into::into)
    }

    fn accepts(ty: &Type) -> bool {
        W::reads_from(ty)
    }
}

/// A query parameter encoded by whatever writer `registry` holds for `value`.
#[derive(Debug)]
pub struct RegistryParam<'a> {
    registry: &'a ConversionRegistry,
    value: &'a (dyn Any + Send + Sync),
}

impl<'a> RegistryParam<'a> {
    pub fn new(registry: &'a ConversionRegistry, value: &'a (dyn Any + Send + Sync)) -> Self {
        Self { registry, value }
    }
}

impl ToSql for RegistryParam<'_> {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> std::result::Result<IsNull, BoxError> {
        self.registry.write(self.value, ty, out).map_err(Into::into)
    }

    // The registered writer rejects column types it cannot encode.
    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

/// The undecoded bytes of one column; `None` for SQL NULL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawColumn<'a>(pub Option<&'a [u8]>);

impl<'a> FromSql<'a> for RawColumn<'a> {
    fn from_sql(_ty: &Type, raw: &'a [u8]) -> std::result::Result<Self, BoxError> {
        Ok(RawColumn(Some(raw)))
    }

    fn from_sql_null(_ty: &Type) -> std::result::Result<Self, BoxError> {
        Ok(RawColumn(None))
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }
}

/// Scan column `idx` of `row` into `dest` through `registry`.
pub fn scan_column(
    registry: &ConversionRegistry,
    row: &Row,
    idx: usize,
    dest: &mut dyn Destination,
) -> Result<()> {
    let raw: RawColumn<'_> = row.try_get(idx)?;
    // try_get has already rejected an out-of-range idx
    let ty = row.columns()[idx].type_();
    registry.scan(dest, ty, raw.0)
}
