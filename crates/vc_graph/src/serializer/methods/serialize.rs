use alloc::format;
use alloc::rc::Rc;

use crate::info::Type;
use crate::migrate::MigrationChain;
use crate::process::ObjectProcessor;
use crate::value::envelope;
use crate::{Declared, Encoded, GraphSerializer, ObjRef, Outcome, Reflect, Value};

impl GraphSerializer {
    /// Serializes `value` declared as `declared`.
    ///
    /// `$type` is written where the concrete type of a value differs from
    /// the declared one, including at the root. A shared handle declared as
    /// its content type is treated as an `ObjRef` declaring that content.
    ///
    /// Problems are reported in the outcome; whatever could be encoded is
    /// returned.
    pub fn serialize(&mut self, declared: Type, value: &dyn Reflect) -> Encoded {
        let declared = if value.is::<ObjRef>() && !declared.is::<ObjRef>() {
            Declared {
                ty: Some(Type::of::<ObjRef>()),
                content: Some(declared),
                ..Declared::default()
            }
        } else {
            Declared::of(declared)
        };

        let outermost = self.refs.enter();
        let mut encoded = self.encode_value(value, &declared);
        if outermost {
            self.refs.finalize(&mut encoded.value);
        }
        if self.refs.exit() {
            self.collectors.clear();
        }
        encoded
    }

    /// Encodes a nested value; the entry point of converters.
    pub fn encode_value(&mut self, value: &dyn Reflect, declared: &Declared) -> Encoded {
        let ty = value.reflect_type();
        let registry = self.registry_handle();
        let meta = registry.get(ty.id());

        let Some(converter) = self.converters.get(&registry, ty, declared.converter.as_ref())
        else {
            log::warn!("no converter for `{ty}`");
            let outcome = match meta {
                None => Outcome::fail(format!("type `{ty}` is not registered, written as null")),
                Some(_) => Outcome::warn(format!("no converter for `{ty}`, written as null")),
            };
            return Encoded::with(Value::Null, outcome);
        };
        let Some(meta) = meta else {
            return converter.encode(self, value, declared);
        };

        let processors: Rc<[Rc<dyn ObjectProcessor>]> = self.processors.get(meta);
        for processor in processors.iter() {
            processor.before_serialize(meta, value);
        }

        let mut encoded = converter.encode(self, value, declared);

        if encoded.value.is_map()
            && let Some(chain) = meta.get_trait::<MigrationChain>()
        {
            let version = i64::try_from(chain.current_version()).unwrap_or(i64::MAX);
            envelope::stamp(&mut encoded.value, envelope::VERSION_KEY, Value::int(version));
        }
        if declared.ty != Some(ty)
            && !encoded.value.is_null()
            && converter.request_inheritance_support(meta)
        {
            envelope::stamp(&mut encoded.value, envelope::TYPE_KEY, Value::from(ty.path()));
        }

        for processor in processors.iter().rev() {
            processor.after_serialize(meta, value, &mut encoded.value);
        }
        encoded
    }
}

// -----------------------------------------------------------------------------
// Tests
