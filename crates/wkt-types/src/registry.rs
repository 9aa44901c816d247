//! Type-conversion registry.
//!
//! The registry maps the runtime type of a wrapper to its writer and reader.
//! It is filled explicitly during startup and shared read-only afterwards;
//! nothing is registered implicitly.
//!
//! ```text
//! bind:  &dyn Any ──TypeId──► Conversion::writer ──► column bytes
//! scan:  column bytes ──► Conversion::reader ──► &mut dyn Destination
//! ```

use std::any::{self, Any, TypeId};
use std::collections::HashMap;
use std::fmt;

use bytes::BytesMut;
use postgres_types::{IsNull, Type};
use protobuf::well_known_types::timestamp::Timestamp;
use protobuf::well_known_types::wrappers::{
    BoolValue, BytesValue, DoubleValue, FloatValue, Int32Value, Int64Value, StringValue,
    UInt32Value, UInt64Value,
};
use tracing::{debug, warn};

use crate::destination::{assign, assign_null, Destination};
use crate::error::{ConversionError, Result};
use crate::kind::WktKind;
use crate::reverse::{self, Narrowing};
use crate::WellKnownType;

/// Type-erased writer: encode `value` for a column of type `ty`.
pub type Writer = fn(value: &dyn Any, ty: &Type, out: &mut BytesMut) -> Result<IsNull>;

/// Type-erased reader: decode `raw` and store it into `dest`.
pub type Reader = fn(dest: &mut dyn Destination, ty: &Type, raw: &[u8]) -> Result<()>;

/// Type-erased NULL handler: record SQL NULL in `dest`.
pub type NullReader = fn(dest: &mut dyn Destination) -> Result<()>;

/// One registry entry: a wrapper type and its writer/reader pair.
#[derive(Clone, Copy)]
pub struct Conversion {
    pub kind: WktKind,
    pub rust_type: &'static str,
    pub type_id: TypeId,
    optional_type_id: TypeId,
    pub writer: Writer,
    pub reader: Reader,
    pub null_reader: NullReader,
}

impl Conversion {
    /// The default conversion for `W`.
    pub fn of<W: WellKnownType>() -> Self {
        Conversion {
            kind: W::KIND,
            rust_type: any::type_name::<W>(),
            type_id: TypeId::of::<W>(),
            optional_type_id: TypeId::of::<Option<W>>(),
            writer: write_erased::<W>,
            reader: read_erased::<W>,
            null_reader: assign_null::<W>,
        }
    }

    /// Replace the reader, keeping everything else.
    pub fn with_reader(mut self, reader: Reader) -> Self {
        self.reader = reader;
        self
    }
}

impl fmt::Debug for Conversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Conversion")
            .field("kind", &self.kind)
            .field("rust_type", &self.rust_type)
            .finish_non_exhaustive()
    }
}

/// Write a `W`, or an `Option<W>` where `None` becomes SQL NULL.
fn write_erased<W: WellKnownType>(value: &dyn Any, ty: &Type, out: &mut BytesMut) -> Result<IsNull> {
    if let Some(wrapper) = value.downcast_ref::<W>() {
        return wrapper.to_column(ty, out);
    }
    match value.downcast_ref::<Option<W>>() {
        Some(Some(wrapper)) => wrapper.to_column(ty, out),
        Some(None) => Ok(IsNull::Yes),
        None => Err(ConversionError::WrongWrapperType {
            expected: W::KIND.full_name(),
        }),
    }
}

fn read_erased<W: WellKnownType>(dest: &mut dyn Destination, ty: &Type, raw: &[u8]) -> Result<()> {
    assign::<W>(dest, || W::from_column(ty, raw))
}

fn read_int32_checked(dest: &mut dyn Destination, ty: &Type, raw: &[u8]) -> Result<()> {
    assign::<Int32Value>(dest, || reverse::read_int32(ty, raw, Narrowing::Checked))
}

fn read_uint32_checked(dest: &mut dyn Destination, ty: &Type, raw: &[u8]) -> Result<()> {
    assign::<UInt32Value>(dest, || reverse::read_uint32(ty, raw, Narrowing::Checked))
}

/// Options for [`register_well_known_types`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryOptions {
    /// Narrowing applied by the `Int32Value` and `UInt32Value` readers.
    pub narrowing: Narrowing,
}

/// Registry of writer/reader pairs keyed by runtime type.
#[derive(Debug, Default)]
pub struct ConversionRegistry {
    entries: Vec<Conversion>,
    index: HashMap<TypeId, usize>,
}

impl ConversionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every well-known type conversion.
    pub fn with_well_known_types(options: &RegistryOptions) -> Self {
        let mut registry = Self::new();
        registry.register_well_known_types(options);
        registry
    }

    /// Register `conversion`. A previous entry for the same type is replaced.
    pub fn register(&mut self, conversion: Conversion) -> &mut Self {
        match self.index.get(&conversion.type_id) {
            Some(&slot) => {
                warn!(
                    "Replacing conversion for {} ({})",
                    conversion.kind, conversion.rust_type
                );
                self.entries[slot] = conversion;
            }
            None => {
                debug!(
                    "Registering conversion for {} ({})",
                    conversion.kind, conversion.rust_type
                );
                let slot = self.entries.len();
                self.entries.push(conversion);
                self.index.insert(conversion.type_id, slot);
                self.index.insert(conversion.optional_type_id, slot);
            }
        }
        self
    }

    /// Register all ten well-known type conversions.
    pub fn register_well_known_types(&mut self, options: &RegistryOptions) -> &mut Self {
        register_well_known_types(self, options);
        self
    }

    /// Conversion registered for the runtime type `type_id`.
    ///
    /// Both `W` and `Option<W>` resolve to the entry of `W`.
    pub fn get(&self, type_id: TypeId) -> Option<&Conversion> {
        self.index.get(&type_id).map(|&slot| &self.entries[slot])
    }

    pub fn lookup<T: Any>(&self) -> Option<&Conversion> {
        self.get(TypeId::of::<T>())
    }

    /// Registered conversions, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Conversion> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Encode `value` with the writer registered for its runtime type.
    pub fn write(&self, value: &dyn Any, ty: &Type, out: &mut BytesMut) -> Result<IsNull> {
        let conversion = self
            .get(Any::type_id(value))
            .ok_or(ConversionError::NotRegistered("bound value"))?;
        (conversion.writer)(value, ty, out)
    }

    /// Decode one column into `dest` with the reader registered for the
    /// destination's type.
    ///
    /// `raw` is `None` for SQL NULL. The reader is never invoked for NULL:
    /// an `Option<W>` destination is reset to `None` and a bare `W` fails with
    /// [`ConversionError::UnexpectedNull`].
    pub fn scan(&self, dest: &mut dyn Destination, ty: &Type, raw: Option<&[u8]>) -> Result<()> {
        let conversion = self
            .get((*dest).destination_type_id())
            .ok_or_else(|| ConversionError::NotRegistered((*dest).destination_type()))?;
        match raw {
            Some(raw) => (conversion.reader)(dest, ty, raw),
            None => (conversion.null_reader)(dest),
        }
    }
}

/// Install the writer/reader pair of every supported well-known type.
///
/// Intended to run once during startup, before the registry is shared.
pub fn register_well_known_types(registry: &mut ConversionRegistry, options: &RegistryOptions) {
    let (int32, uint32) = match options.narrowing {
        Narrowing::Truncate => (
            Conversion::of::<Int32Value>(),
            Conversion::of::<UInt32Value>(),
        ),
        Narrowing::Checked => (
            Conversion::of::<Int32Value>().with_reader(read_int32_checked),
            Conversion::of::<UInt32Value>().with_reader(read_uint32_checked),
        ),
    };

    registry
        .register(Conversion::of::<Timestamp>())
        .register(Conversion::of::<DoubleValue>())
        .register(Conversion::of::<FloatValue>())
        .register(Conversion::of::<Int64Value>())
        .register(Conversion::of::<UInt64Value>())
        .register(int32)
        .register(uint32)
        .register(Conversion::of::<BoolValue>())
        .register(Conversion::of::<StringValue>())
        .register(Conversion::of::<BytesValue>());
}
