use alloc::format;
use alloc::string::{String, ToString};
use core::marker::PhantomData;

use crate::convert::{Converter, mismatched};
use crate::registry::TypeMeta;
use crate::value::{Number, envelope};
use crate::{Declared, Encoded, GraphError, GraphSerializer, Outcome, Reflect, Value};

// -----------------------------------------------------------------------------
// Scalar

/// A leaf type with a direct [`Value`] representation.
pub trait Scalar: Reflect + Sized {
    /// Describes the accepted data, for messages.
    const EXPECTED: &'static str;

    /// Converts to a value; lossy conversions report a warning.
    fn to_value(&self, outcome: &mut Outcome) -> Value;

    /// Converts back, or returns `None` if the node has the wrong kind or range.
    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! impl_signed {
    ($($ty:ty),+) => {$(
        impl Scalar for $ty {
            const EXPECTED: &'static str = "an integer";

            #[inline]
            fn to_value(&self, _: &mut Outcome) -> Value {
                Value::int(*self as i64)
            }

            #[inline]
            fn from_value(value: &Value) -> Option<Self> {
                value.as_i64().and_then(|v| <$ty>::try_from(v).ok())
            }
        }
    )+};
}

macro_rules! impl_unsigned {
    ($($ty:ty),+) => {$(
        impl Scalar for $ty {
            const EXPECTED: &'static str = "a non-negative integer";

            fn to_value(&self, outcome: &mut Outcome) -> Value {
                match i64::try_from(*self) {
                    Ok(v) => Value::int(v),
                    Err(_) => {
                        *outcome += Outcome::warn(format!(
                            "{self} does not fit a 64 bit signed integer and was written as a float"
                        ));
                        Value::float(*self as f64)
                    }
                }
            }

            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::Number(Number::Int(v)) => <$ty>::try_from(*v).ok(),
                    Value::Number(Number::Float(v))
                        if v.fract() == 0.0 && *v >= 0.0 && *v <= <$ty>::MAX as f64 =>
                    {
                        Some(*v as $ty)
                    }
                    _ => None,
                }
            }
        }
    )+};
}

impl_signed!(i8, i16, i32, i64, isize);
impl_unsigned!(u8, u16, u32, u64, usize);

impl Scalar for f32 {
    const EXPECTED: &'static str = "a number";

    #[inline]
    fn to_value(&self, _: &mut Outcome) -> Value {
        Value::float(*self as f64)
    }

    #[inline]
    fn from_value(value: &Value) -> Option<Self> {
        value.as_f64().map(|v| v as f32)
    }
}

impl Scalar for f64 {
    const EXPECTED: &'static str = "a number";

    #[inline]
    fn to_value(&self, _: &mut Outcome) -> Value {
        Value::float(*self)
    }

    #[inline]
    fn from_value(value: &Value) -> Option<Self> {
        value.as_f64()
    }
}

impl Scalar for bool {
    const EXPECTED: &'static str = "a boolean";

    #[inline]
    fn to_value(&self, _: &mut Outcome) -> Value {
        Value::Bool(*self)
    }

    #[inline]
    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl Scalar for char {
    const EXPECTED: &'static str = "a one character string";

    fn to_value(&self, _: &mut Outcome) -> Value {
        Value::String(self.to_string())
    }

    fn from_value(value: &Value) -> Option<Self> {
        let mut chars = value.as_str()?.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    }
}

impl Scalar for String {
    const EXPECTED: &'static str = "a string";

    #[inline]
    fn to_value(&self, _: &mut Outcome) -> Value {
        Value::String(self.clone())
    }

    #[inline]
    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(String::from)
    }
}

/// Raw values are copied through, minus reserved keys at any depth: the
/// decoder and the id bookkeeping would read them as metadata.
impl Scalar for Value {
    const EXPECTED: &'static str = "any value";

    fn to_value(&self, outcome: &mut Outcome) -> Value {
        let mut value = self.clone();
        strip_reserved(&mut value, outcome);
        value
    }

    #[inline]
    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

// -----------------------------------------------------------------------------
// ScalarConverter

/// Converts one [`Scalar`] type.
///
/// Registered in the exact-type map of the [`ConverterChain`], so it is
/// never shadowed by converters added later.
///
/// [`ConverterChain`]: crate::convert::ConverterChain
pub struct ScalarConverter<T>(PhantomData<fn() -> T>);

impl<T> ScalarConverter<T> {
    #[inline]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for ScalarConverter<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Scalar> Converter for ScalarConverter<T> {
    #[inline]
    fn can_process(&self, meta: &TypeMeta) -> bool {
        meta.ty().is::<T>()
    }

    fn encode(&self, _: &mut GraphSerializer, value: &dyn Reflect, _: &Declared) -> Encoded {
        let Some(value) = value.downcast_ref::<T>() else {
            return Encoded::with(Value::Null, mismatched("scalar converter", value.reflect_type()));
        };
        let mut outcome = Outcome::success();
        let value = value.to_value(&mut outcome);
        Encoded::with(value, outcome)
    }

    fn decode(
        &self,
        _: &mut GraphSerializer,
        data: &Value,
        _: &Declared,
        slot: &mut dyn Reflect,
    ) -> Result<Outcome, GraphError> {
        let ty = slot.reflect_type();
        let Some(slot) = slot.downcast_mut::<T>() else {
            return Ok(mismatched("scalar converter", ty));
        };
        Ok(match T::from_value(data) {
            Some(value) => {
                *slot = value;
                Outcome::success()
            }
            None => Outcome::fail(format!(
                "expected {} for `{ty}`, found {}",
                T::EXPECTED,
                describe(data),
            )),
        })
    }
}

fn strip_reserved(value: &mut Value, outcome: &mut Outcome) {
    match value {
        Value::Map(map) => {
            map.retain(|key, _| {
                let reserved = envelope::is_reserved(key);
                if reserved {
                    *outcome += Outcome::fail(format!(
                        "key `{key}` of a raw value is reserved, entry skipped"
                    ));
                }
                !reserved
            });
            map.values_mut().for_each(|v| strip_reserved(v, outcome));
        }
        Value::Array(items) => items.iter_mut().for_each(|v| strip_reserved(v, outcome)),
        _ => {}
    }
}

fn describe(data: &Value) -> String {
    match data {
        Value::Number(n) => format!("number {n}"),
        other => other.kind_name().into(),
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::Scalar;
    use crate::{Outcome, Value};

    #[test]
    fn large_unsigned_becomes_float() {
        let mut outcome = Outcome::success();
        let value = u64::MAX.to_value(&mut outcome);
        assert!(matches!(value, Value::Number(crate::value::Number::Float(_))));
        assert!(outcome.has_warnings());

        let mut outcome = Outcome::success();
        assert_eq!(42_u64.to_value(&mut outcome), Value::int(42));
        assert!(!outcome.has_warnings());
    }

    #[test]
    fn integer_ranges_are_checked() {
        assert_eq!(u8::from_value(&Value::int(255)), Some(255));
        assert_eq!(u8::from_value(&Value::int(256)), None);
        assert_eq!(i8::from_value(&Value::int(-128)), Some(-128));
        assert_eq!(u32::from_value(&Value::int(-1)), None);
        assert_eq!(i32::from_value(&Value::float(3.0)), Some(3));
        assert_eq!(i32::from_value(&Value::float(3.5)), None);
    }

    #[test]
    fn chars_are_single_character_strings() {
        let mut outcome = Outcome::success();
        assert_eq!('x'.to_value(&mut outcome), Value::from("x"));
        assert_eq!(char::from_value(&Value::from("x")), Some('x'));
        assert_eq!(char::from_value(&Value::from("xy")), None);
        assert_eq!(char::from_value(&Value::from("")), None);
    }
}
