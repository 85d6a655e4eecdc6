use crate::convert::{Converter, unexpected};
use crate::info::{TypeFlags, TypeKind};
use crate::registry::TypeMeta;
use crate::value::{envelope, new_map};
use crate::{Declared, Encoded, GraphError, GraphSerializer, ObjRef, Outcome, Reflect, Value};

// -----------------------------------------------------------------------------
// ReflectedConverter

/// Writes structs as maps, one entry per schema member.
///
/// Members flagged read-only are written but never populated, write-only
/// members the other way around. Keys without a member are ignored, which
/// lets old data carry fields that were since removed.
///
/// Instances of types flagged `REFERENCE` are tracked by identity when
/// reached through an [`ObjRef`].
#[derive(Default)]
pub struct ReflectedConverter;

impl Converter for ReflectedConverter {
    #[inline]
    fn can_process(&self, meta: &TypeMeta) -> bool {
        meta.kind() == TypeKind::Struct
    }

    #[inline]
    fn request_cycle_support(&self, meta: &TypeMeta) -> bool {
        meta.has_flags(TypeFlags::REFERENCE)
    }

    fn encode(&self, ser: &mut GraphSerializer, value: &dyn Reflect, _: &Declared) -> Encoded {
        let ty = value.reflect_type();
        let Some(schema) = ser.schema_for(ty) else {
            return Encoded::with(
                Value::Null,
                Outcome::fail(alloc::format!("type `{ty}` is not registered")),
            );
        };

        let mut map = new_map();
        let mut outcome = Outcome::success();
        for member in schema.members() {
            if member.write_only() {
                continue;
            }
            let Some(field) = member.get(value) else {
                outcome += Outcome::fail(alloc::format!(
                    "member `{}` of `{ty}` is not reachable",
                    member.name()
                ));
                continue;
            };
            let encoded = ser.encode_value(field, &member.declared());
            outcome += encoded.outcome;
            map.insert(member.serialized_name().into(), encoded.value);
        }
        Encoded::with(Value::Map(map), outcome)
    }

    fn decode(
        &self,
        ser: &mut GraphSerializer,
        data: &Value,
        _: &Declared,
        slot: &mut dyn Reflect,
    ) -> Result<Outcome, GraphError> {
        let ty = slot.reflect_type();
        let Some(map) = data.as_map() else {
            return Ok(unexpected("a map", data, ty));
        };
        let Some(schema) = ser.schema_for(ty) else {
            return Ok(Outcome::fail(alloc::format!("type `{ty}` is not registered")));
        };

        let mut outcome = Outcome::success();
        for member in schema.members() {
            if member.read_only() {
                continue;
            }
            let Some(field) = member.get_mut(&mut *slot) else {
                outcome += Outcome::fail(alloc::format!(
                    "member `{}` of `{ty}` is not reachable",
                    member.name()
                ));
                continue;
            };
            let declared = member.declared();
            match map.get(member.serialized_name()) {
                Some(item) => outcome += ser.decode_into(item, &declared, field)?,
                None if declared.auto_instantiate => {
                    outcome += auto_instantiate(ser, &declared, field);
                }
                None => {}
            }
        }

        for key in map.keys() {
            let known = schema.members().iter().any(|m| m.serialized_name() == key);
            if !known && !envelope::is_reserved(key) {
                log::debug!("key `{key}` has no member in `{ty}`, ignored");
            }
        }
        Ok(outcome)
    }
}

/// Fills a null shared handle that has no data with a fresh instance.
fn auto_instantiate(
    ser: &mut GraphSerializer,
    declared: &Declared,
    field: &mut dyn Reflect,
) -> Outcome {
    let Some(handle) = field.downcast_mut::<ObjRef>() else {
        return Outcome::success();
    };
    if !handle.is_null() {
        return Outcome::success();
    }
    let Some(content) = declared.content else {
        return Outcome::warn("auto-instantiated member declares no content type");
    };
    match ser.create_instance(content) {
        Ok(instance) => {
            *handle = ObjRef::from_boxed(instance);
            Outcome::success()
        }
        Err(e) => Outcome::fail(alloc::format!("{e}")),
    }
}
