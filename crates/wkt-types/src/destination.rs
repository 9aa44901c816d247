//! Reader destinations.
//!
//! A reader stores the wrapper it decodes into a caller-owned slot. The slot
//! is type-erased so the registry can hand any destination to any reader; a
//! reader that does not recognise the slot's type refuses to touch it.

use std::any::{self, Any, TypeId};

use crate::error::{ConversionError, Result};

/// A location a reader may store a decoded value into.
///
/// Implemented for every `'static` type; only `Option<W>` and `W` are
/// assignable for a wrapper `W`.
pub trait Destination {
    /// Name of the destination's concrete type, for error messages.
    fn destination_type(&self) -> &'static str;

    fn destination_type_id(&self) -> TypeId;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> Destination for T {
    fn destination_type(&self) -> &'static str {
        any::type_name::<T>()
    }

    fn destination_type_id(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Store the result of `decode` into `dest`.
///
/// `dest` must be an `Option<W>` (set to `Some`) or a `W` (replaced). Any
/// other destination fails with [`ConversionError::Unassignable`] without
/// calling `decode`. If `decode` fails the destination is left untouched.
pub fn assign<W: Any>(
    dest: &mut dyn Destination,
    decode: impl FnOnce() -> Result<W>,
) -> Result<()> {
    let destination = (*dest).destination_type();
    let slot = dest.as_any_mut();

    if let Some(optional) = slot.downcast_mut::<Option<W>>() {
        *optional = Some(decode()?);
        return Ok(());
    }
    if let Some(direct) = slot.downcast_mut::<W>() {
        *direct = decode()?;
        return Ok(());
    }

    Err(ConversionError::Unassignable {
        destination,
        wrapper: any::type_name::<W>(),
    })
}

/// Record SQL NULL in `dest`.
///
/// An `Option<W>` becomes `None`. A bare `W` cannot be absent and fails with
/// [`ConversionError::UnexpectedNull`], keeping its value.
pub fn assign_null<W: Any>(dest: &mut dyn Destination) -> Result<()> {
    let destination = (*dest).destination_type();
    let slot = dest.as_any_mut();

    if let Some(optional) = slot.downcast_mut::<Option<W>>() {
        *optional = None;
        return Ok(());
    }
    if slot.is::<W>() {
        return Err(ConversionError::UnexpectedNull { destination });
    }

    Err(ConversionError::Unassignable {
        destination,
        wrapper: any::type_name::<W>(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carrier::{self, ScalarCarrier};
    use protobuf::well_known_types::wrappers::{Int32Value, StringValue};

    #[test]
    fn test_assign_into_option() {
        let mut dest: Option<Int32Value> = None;
        assign(&mut dest, || Ok(carrier::int32(3))).unwrap();
        assert_eq!(dest, Some(carrier::int32(3)));
    }

    #[test]
    fn test_assign_into_bare_wrapper() {
        let mut dest = Int32Value::wrap(1);
        assign(&mut dest, || Ok(carrier::int32(2))).unwrap();
        assert_eq!(dest.value, 2);
    }

    #[test]
    fn test_unassignable_destination_skips_decode() {
        let mut dest = String::from("unchanged");
        let mut decoded = false;
        let err = assign::<Int32Value>(&mut dest, || {
            decoded = true;
            Ok(carrier::int32(3))
        })
        .unwrap_err();

        assert!(!decoded);
        assert_eq!(dest, "unchanged");
        match err {
            ConversionError::Unassignable { destination, .. } => {
                assert_eq!(destination, "alloc::string::String")
            }
            other => panic!("Expected Unassignable, got {other:?}"),
        }
    }

    #[test]
    fn test_failed_decode_leaves_destination() {
        let mut dest = Some(carrier::string("before".to_string()));
        let result = assign::<StringValue>(&mut dest, || {
            Err(ConversionError::NotRegistered("test"))
        });
        assert!(result.is_err());
        assert_eq!(dest.unwrap().value, "before");
    }

    #[test]
    fn test_assign_null_clears_option() {
        let mut dest = Some(carrier::int32(4));
        assign_null::<Int32Value>(&mut dest).unwrap();
        assert_eq!(dest, None);
    }

    #[test]
    fn test_assign_null_rejects_bare_wrapper() {
        let mut dest = carrier::int32(4);
        let err = assign_null::<Int32Value>(&mut dest).unwrap_err();
        assert!(matches!(err, ConversionError::UnexpectedNull { .. }));
        assert_eq!(dest.value, 4);

        let mut other: Option<StringValue> = None;
        let err = assign_null::<Int32Value>(&mut other).unwrap_err();
        assert!(matches!(err, ConversionError::Unassignable { .. }));
    }
}
