//! Scalar carriers: the protobuf wrapper messages seen as single-value boxes.
//!
//! Every wrapper in `google/protobuf/wrappers.proto` holds exactly one scalar
//! in field `value`. [`ScalarCarrier`] gives the readers and writers a uniform
//! way to build a wrapper from its scalar and to read the scalar back out.

use protobuf::well_known_types::wrappers::{
    BoolValue, BytesValue, DoubleValue, FloatValue, Int32Value, Int64Value, StringValue,
    UInt32Value, UInt64Value,
};

/// A protobuf message carrying exactly one scalar value.
pub trait ScalarCarrier: Sized {
    /// The primitive payload type.
    type Scalar;

    /// Build a fresh wrapper holding `value`.
    fn wrap(value: Self::Scalar) -> Self;

    /// Borrow the wrapped scalar.
    fn get(&self) -> &Self::Scalar;

    /// Consume the wrapper, returning its scalar.
    fn into_inner(self) -> Self::Scalar;
}

macro_rules! scalar_carrier {
    ($($wrapper:ty => $scalar:ty, $ctor:ident;)*) => {
        $(
            impl ScalarCarrier for $wrapper {
                type Scalar = $scalar;

                fn wrap(value: $scalar) -> Self {
                    Self {
                        value,
                        ..Default::default()
                    }
                }

                fn get(&self) -> &$scalar {
                    &self.value
                }

                fn into_inner(self) -> $scalar {
                    self.value
                }
            }

            #[doc = concat!("Build a `", stringify!($wrapper), "` holding `value`.")]
            pub fn $ctor(value: $scalar) -> $wrapper {
                <$wrapper as ScalarCarrier>::wrap(value)
            }
        )*
    };
}

scalar_carrier! {
    DoubleValue => f64, double;
    FloatValue => f32, float;
    Int64Value => i64, int64;
    UInt64Value => u64, uint64;
    Int32Value => i32, int32;
    UInt32Value => u32, uint32;
    BoolValue => bool, bool;
    StringValue => String, string;
    BytesValue => Vec<u8>, bytes;
}
