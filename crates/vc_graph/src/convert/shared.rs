use alloc::boxed::Box;
use alloc::format;

use crate::convert::{Converter, mismatched};
use crate::info::{Type, TypeFlags, TypeKind};
use crate::registry::TypeMeta;
use crate::value::envelope;
use crate::{Declared, Encoded, GraphError, GraphSerializer, ObjRef, Outcome, Reflect, Value};

// -----------------------------------------------------------------------------
// SharedConverter

/// Writes the object behind an [`ObjRef`].
///
/// Objects are tracked by identity when their type is flagged `REFERENCE`,
/// when the member is flagged `AS_REFERENCE`, or when the converter of the
/// object asks for it. A tracked object is written in full once and as
/// `{"$ref": id}` afterwards; its definition keeps `$id` only if some
/// `$ref` points to it.
///
/// Untracked objects are written in full every time they are reached. One
/// that is reached again while it is still being written is part of a
/// cycle the serializer cannot express, it is written as null and reported.
///
/// The handle itself never gets a `$type` tag, the object does when its
/// concrete type differs from the declared content type.
#[derive(Default)]
pub struct SharedConverter;

impl Converter for SharedConverter {
    #[inline]
    fn can_process(&self, meta: &TypeMeta) -> bool {
        meta.kind() == TypeKind::Shared
    }

    #[inline]
    fn request_inheritance_support(&self, _meta: &TypeMeta) -> bool {
        false
    }

    fn encode(
        &self,
        ser: &mut GraphSerializer,
        value: &dyn Reflect,
        declared: &Declared,
    ) -> Encoded {
        let Some(handle) = value.downcast_ref::<ObjRef>() else {
            return Encoded::with(Value::Null, mismatched("shared converter", value.reflect_type()));
        };
        let Some(addr) = handle.addr() else {
            return Encoded::new(Value::Null);
        };
        let Some(content_ty) = handle.content_type() else {
            return Encoded::with(
                Value::Null,
                Outcome::fail("shared object is borrowed mutably and cannot be written"),
            );
        };

        let registry = ser.registry_handle();
        let Some(meta) = registry.get(content_ty.id()) else {
            log::warn!("type `{content_ty}` is not registered");
            return Encoded::with(
                Value::Null,
                Outcome::fail(format!("type `{content_ty}` is not registered")),
            );
        };

        let tracked = declared.as_reference
            || meta.has_flags(TypeFlags::REFERENCE)
            || ser
                .converter_for(content_ty)
                .is_some_and(|converter| converter.request_cycle_support(meta));

        if tracked && let Some(id) = ser.refs.definition_of(addr) {
            ser.refs.mark_referenced(id);
            return Encoded::new(envelope::reference(id));
        }
        if ser.refs.is_on_stack(addr) {
            return Encoded::with(
                Value::Null,
                Outcome::fail(format!(
                    "`{content_ty}` is reached again while being written and is not tracked by \
                     reference, written as null"
                )),
            );
        }

        let id = tracked.then(|| ser.refs.begin_definition(addr));
        ser.refs.push(addr);
        let token = ser.collectors.enter(handle, meta);

        let content = Declared::content_of(declared);
        let mut encoded = match handle.borrow() {
            Some(object) => ser.encode_value(&*object, &content),
            None => Encoded::new(Value::Null),
        };

        ser.collectors.exit(token);
        ser.refs.pop(addr);
        if let Some(id) = id {
            envelope::stamp(&mut encoded.value, envelope::ID_KEY, Value::int(id));
            ser.refs.add_pending(id);
        }
        encoded
    }

    fn decode(
        &self,
        ser: &mut GraphSerializer,
        data: &Value,
        declared: &Declared,
        slot: &mut dyn Reflect,
    ) -> Result<Outcome, GraphError> {
        let ty = slot.reflect_type();
        let Some(slot) = slot.downcast_mut::<ObjRef>() else {
            return Ok(mismatched("shared converter", ty));
        };
        if data.is_null() {
            *slot = ObjRef::null();
            return Ok(Outcome::success());
        }

        let mut outcome = Outcome::success();
        let mut def_id = None;
        if let Value::Map(map) = data {
            match envelope::ref_id(map) {
                Ok(Some(id)) => {
                    *slot = match ser.refs.resolve(id) {
                        Some(object) => object,
                        None => {
                            log::warn!("`$ref` {id} does not point to an earlier definition");
                            outcome += Outcome::warn(format!(
                                "`$ref` {id} does not point to an earlier definition, read as null"
                            ));
                            ObjRef::null()
                        }
                    };
                    return Ok(outcome);
                }
                Ok(None) => {}
                Err(malformed) => outcome += Outcome::warn(malformed.message()),
            }
            match envelope::def_id(map) {
                Ok(id) => def_id = id,
                Err(malformed) => outcome += Outcome::warn(malformed.message()),
            }
        }

        let content = Declared::content_of(declared);
        let instantiated = ser.instantiate(data, &content)?;
        outcome += instantiated.outcome;
        let Some(instance) = instantiated.instance else {
            *slot = ObjRef::null();
            return Ok(outcome);
        };

        let content_ty = instance.reflect_type();
        let object = ObjRef::from_boxed(instance);
        if let Some(id) = def_id {
            ser.refs.register(id, object.clone());
        }

        let registry = ser.registry_handle();
        let token = registry
            .get(content_ty.id())
            .map(|meta| ser.collectors.enter(&object, meta));

        let content = Declared {
            ty: Some(content_ty),
            ..content
        };
        let populated = match object.borrow_mut() {
            Some(mut target) => ser.decode_into(&instantiated.data, &content, &mut *target),
            None => Ok(Outcome::success()),
        };

        if let Some(token) = token {
            ser.collectors.exit(token);
        }
        outcome += populated?;
        *slot = object;
        Ok(outcome)
    }

    fn create_instance(
        &self,
        _: &mut GraphSerializer,
        _: Type,
    ) -> Result<Box<dyn Reflect>, GraphError> {
        Ok(Box::new(ObjRef::null()))
    }
}
