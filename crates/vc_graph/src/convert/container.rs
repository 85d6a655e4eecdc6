use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use crate::convert::{Converter, mismatched, unexpected};
use crate::info::{Type, TypeKind};
use crate::registry::TypeMeta;
use crate::value::{envelope, new_map};
use crate::{Declared, Encoded, GraphError, GraphSerializer, Outcome, Reflect, ReflectMut};
use crate::{ReflectRef, Value};

fn kind_of(ser: &GraphSerializer, ty: Type) -> Option<TypeKind> {
    ser.registry().get(ty.id()).map(TypeMeta::kind)
}

/// Stores a decoded element, or reports why it could not be.
fn store(
    decoded: Option<Box<dyn Reflect>>,
    ty: Type,
    put: impl FnOnce(Box<dyn Reflect>) -> Result<(), Box<dyn Reflect>>,
) -> Outcome {
    let Some(instance) = decoded else {
        return Outcome::success();
    };
    match put(instance) {
        Ok(()) => Outcome::success(),
        Err(rejected) => Outcome::fail(format!(
            "`{}` cannot be stored in `{ty}`",
            rejected.reflect_type()
        )),
    }
}

// -----------------------------------------------------------------------------
// ListConverter

/// Writes lists as arrays.
#[derive(Default)]
pub struct ListConverter;

impl Converter for ListConverter {
    #[inline]
    fn can_process(&self, meta: &TypeMeta) -> bool {
        meta.kind().is_list()
    }

    fn encode(
        &self,
        ser: &mut GraphSerializer,
        value: &dyn Reflect,
        declared: &Declared,
    ) -> Encoded {
        let ty = value.reflect_type();
        let (Some(TypeKind::List { element }), ReflectRef::List(list)) =
            (kind_of(ser, ty), value.reflect_ref())
        else {
            return Encoded::with(Value::Null, mismatched("list converter", ty));
        };

        let element = Declared::element(element, declared);
        let mut items = Vec::with_capacity(list.len());
        let mut outcome = Outcome::success();
        for index in 0..list.len() {
            if let Some(item) = list.get(index) {
                let encoded = ser.encode_value(item, &element);
                outcome += encoded.outcome;
                items.push(encoded.value);
            }
        }
        Encoded::with(Value::Array(items), outcome)
    }

    fn decode(
        &self,
        ser: &mut GraphSerializer,
        data: &Value,
        declared: &Declared,
        slot: &mut dyn Reflect,
    ) -> Result<Outcome, GraphError> {
        let ty = slot.reflect_type();
        let Some(items) = data.as_array() else {
            return Ok(unexpected("an array", data, ty));
        };
        let (Some(TypeKind::List { element }), ReflectMut::List(list)) =
            (kind_of(ser, ty), slot.reflect_mut())
        else {
            return Ok(mismatched("list converter", ty));
        };

        let element = Declared::element(element, declared);
        let mut outcome = Outcome::success();
        list.clear();
        for item in items {
            let decoded = ser.decode_new(item, &element)?;
            outcome += decoded.outcome;
            outcome += store(decoded.instance, ty, |v| list.push(v));
        }
        Ok(outcome)
    }
}

// -----------------------------------------------------------------------------
// MapConverter

/// Writes string-keyed maps as maps.
///
/// Keys colliding with reserved envelope keys cannot be represented and
/// are skipped with a failure.
#[derive(Default)]
pub struct MapConverter;

impl Converter for MapConverter {
    #[inline]
    fn can_process(&self, meta: &TypeMeta) -> bool {
        matches!(meta.kind(), TypeKind::Map { .. })
    }

    fn encode(
        &self,
        ser: &mut GraphSerializer,
        value: &dyn Reflect,
        declared: &Declared,
    ) -> Encoded {
        let ty = value.reflect_type();
        let (Some(TypeKind::Map { value: element }), ReflectRef::Map(entries)) =
            (kind_of(ser, ty), value.reflect_ref())
        else {
            return Encoded::with(Value::Null, mismatched("map converter", ty));
        };

        let element = Declared::element(element, declared);
        let mut map = new_map();
        let mut outcome = Outcome::success();
        for (key, item) in entries.iter() {
            if envelope::is_reserved(key) {
                outcome +=
                    Outcome::fail(format!("key `{key}` of `{ty}` is reserved, entry skipped"));
                continue;
            }
            let encoded = ser.encode_value(item, &element);
            outcome += encoded.outcome;
            map.insert(String::from(key), encoded.value);
        }
        Encoded::with(Value::Map(map), outcome)
    }

    fn decode(
        &self,
        ser: &mut GraphSerializer,
        data: &Value,
        declared: &Declared,
        slot: &mut dyn Reflect,
    ) -> Result<Outcome, GraphError> {
        let ty = slot.reflect_type();
        let Some(entries) = data.as_map() else {
            return Ok(unexpected("a map", data, ty));
        };
        let (Some(TypeKind::Map { value: element }), ReflectMut::Map(map)) =
            (kind_of(ser, ty), slot.reflect_mut())
        else {
            return Ok(mismatched("map converter", ty));
        };

        let element = Declared::element(element, declared);
        let mut outcome = Outcome::success();
        map.clear();
        for (key, item) in entries {
            if envelope::is_reserved(key) {
                continue;
            }
            let decoded = ser.decode_new(item, &element)?;
            outcome += decoded.outcome;
            outcome += store(decoded.instance, ty, |v| map.insert(key.clone(), v));
        }
        Ok(outcome)
    }
}

// -----------------------------------------------------------------------------
// OptionConverter

/// Writes `None` as null and `Some` as its content.
#[derive(Default)]
pub struct OptionConverter;

impl Converter for OptionConverter {
    #[inline]
    fn can_process(&self, meta: &TypeMeta) -> bool {
        matches!(meta.kind(), TypeKind::Option { .. })
    }

    fn encode(
        &self,
        ser: &mut GraphSerializer,
        value: &dyn Reflect,
        declared: &Declared,
    ) -> Encoded {
        let ty = value.reflect_type();
        let (Some(TypeKind::Option { some }), ReflectRef::Option(option)) =
            (kind_of(ser, ty), value.reflect_ref())
        else {
            return Encoded::with(Value::Null, mismatched("option converter", ty));
        };

        match option.get() {
            Some(inner) => ser.encode_value(inner, &Declared::element(some, declared)),
            None => Encoded::new(Value::Null),
        }
    }

    fn decode(
        &self,
        ser: &mut GraphSerializer,
        data: &Value,
        declared: &Declared,
        slot: &mut dyn Reflect,
    ) -> Result<Outcome, GraphError> {
        let ty = slot.reflect_type();
        let (Some(TypeKind::Option { some }), ReflectMut::Option(option)) =
            (kind_of(ser, ty), slot.reflect_mut())
        else {
            return Ok(mismatched("option converter", ty));
        };

        if data.is_null() {
            option.set_none();
            return Ok(Outcome::success());
        }
        let decoded = ser.decode_new(data, &Declared::element(some, declared))?;
        let stored = store(decoded.instance, ty, |v| option.set_some(v));
        Ok(decoded.outcome + stored)
    }
}
