use alloc::format;

use crate::convert::Converter;
use crate::registry::TypeMeta;
use crate::{Declared, Encoded, GraphError, GraphSerializer, Outcome, Reflect, Value};

// -----------------------------------------------------------------------------
// ForwardConverter

/// Writes a type exactly like one of its members.
///
/// Synthesized by the [`ConverterChain`] for types registering
/// [`TypeTraitForwardMember`]. The other members keep their values from
/// construction on decode.
///
/// [`ConverterChain`]: crate::convert::ConverterChain
/// [`TypeTraitForwardMember`]: crate::registry::TypeTraitForwardMember
pub struct ForwardConverter {
    member: &'static str,
}

impl ForwardConverter {
    #[inline]
    pub const fn new(member: &'static str) -> Self {
        Self { member }
    }

    #[inline]
    pub const fn member(&self) -> &'static str {
        self.member
    }

    fn missing(&self, ty: impl core::fmt::Display) -> Outcome {
        Outcome::fail(format!(
            "`{ty}` forwards to member `{}` which is not serialized",
            self.member
        ))
    }
}

impl Converter for ForwardConverter {
    #[inline]
    fn can_process(&self, meta: &TypeMeta) -> bool {
        meta.member(self.member).is_some()
    }

    #[inline]
    fn request_inheritance_support(&self, _meta: &TypeMeta) -> bool {
        false
    }

    fn encode(&self, ser: &mut GraphSerializer, value: &dyn Reflect, _: &Declared) -> Encoded {
        let ty = value.reflect_type();
        let schema = ser.schema_for(ty);
        let Some(member) = schema.as_ref().and_then(|s| s.member(self.member)) else {
            return Encoded::with(Value::Null, self.missing(ty));
        };
        match member.get(value) {
            Some(field) => ser.encode_value(field, &member.declared()),
            None => Encoded::with(Value::Null, self.missing(ty)),
        }
    }

    fn decode(
        &self,
        ser: &mut GraphSerializer,
        data: &Value,
        _: &Declared,
        slot: &mut dyn Reflect,
    ) -> Result<Outcome, GraphError> {
        let ty = slot.reflect_type();
        let schema = ser.schema_for(ty);
        let Some(member) = schema.as_ref().and_then(|s| s.member(self.member)) else {
            return Ok(self.missing(ty));
        };
        match member.get_mut(slot) {
            Some(field) => ser.decode_into(data, &member.declared(), field),
            None => Ok(self.missing(ty)),
        }
    }
}
