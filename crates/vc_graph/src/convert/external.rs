use alloc::format;

use crate::convert::{Converter, mismatched, unexpected};
use crate::info::TypeKind;
use crate::registry::TypeMeta;
use crate::{Declared, Encoded, ExternalRef, GraphError, GraphSerializer, Outcome, Reflect, Value};

// -----------------------------------------------------------------------------
// ExternalConverter

/// Writes [`ExternalRef`] handles as their index in the table handed to
/// [`GraphSerializer::set_external_references`].
///
/// Without a table, handles are written and read as null with a warning.
#[derive(Default)]
pub struct ExternalConverter;

const NO_TABLE: &str = "no external reference table is set, external object written as null";

impl Converter for ExternalConverter {
    #[inline]
    fn can_process(&self, meta: &TypeMeta) -> bool {
        meta.kind() == TypeKind::External
    }

    #[inline]
    fn request_inheritance_support(&self, _meta: &TypeMeta) -> bool {
        false
    }

    fn encode(&self, ser: &mut GraphSerializer, value: &dyn Reflect, _: &Declared) -> Encoded {
        let Some(external) = value.downcast_ref::<ExternalRef>() else {
            return Encoded::with(Value::Null, mismatched("external converter", value.reflect_type()));
        };
        let Some(handle) = external.handle() else {
            return Encoded::new(Value::Null);
        };
        let Some(table) = ser.external_references_mut() else {
            log::warn!("{NO_TABLE}");
            return Encoded::with(Value::Null, Outcome::warn(NO_TABLE));
        };

        let index = table.index_or_push(handle);
        match i64::try_from(index) {
            Ok(index) => Encoded::new(Value::int(index)),
            Err(_) => Encoded::with(Value::Null, Outcome::fail("external table index overflow")),
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
        let Some(slot) = slot.downcast_mut::<ExternalRef>() else {
            return Ok(mismatched("external converter", ty));
        };
        if data.is_null() {
            *slot = ExternalRef::null();
            return Ok(Outcome::success());
        }
        let Some(index) = data.as_i64() else {
            return Ok(unexpected("an index", data, ty));
        };
        let Some(table) = ser.external_references_mut() else {
            log::warn!("no external reference table is set");
            *slot = ExternalRef::null();
            return Ok(Outcome::warn("no external reference table is set, read as null"));
        };

        let handle = usize::try_from(index).ok().and_then(|i| table.get(i));
        Ok(match handle {
            Some(handle) => {
                *slot = ExternalRef::from_rc(handle.clone());
                Outcome::success()
            }
            None => {
                *slot = ExternalRef::null();
                Outcome::warn(format!(
                    "external index {index} is out of range of a table of {}, read as null",
                    table.len()
                ))
            }
        })
    }
}
