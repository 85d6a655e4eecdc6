use alloc::borrow::Cow;
use alloc::format;

use crate::info::{Type, TypeFlags, TypeKind};
use crate::migrate::{self, ForwardMigration, MigrationChain};
use crate::serializer::Instantiated;
use crate::value::envelope;
use crate::{Declared, Decoded, GraphError, GraphSerializer, ObjRef, Outcome, Reflect, Value};

impl GraphSerializer {
    /// Decodes a fresh instance of `ty`, or of the type named by `$type`.
    ///
    /// Types flagged `REFERENCE` are decoded behind an [`ObjRef`], so that
    /// references to the root resolve; the instance is then the handle.
    ///
    /// Data problems are reported in the outcome. Errors are reserved for
    /// defects of the registered types, such as a broken migration chain.
    pub fn deserialize(&mut self, data: &Value, ty: Type) -> Result<Decoded, GraphError> {
        let declared = self.root_declared(ty);
        self.refs.enter();
        let decoded = self.decode_new(data, &declared);
        if self.refs.exit() {
            self.collectors.clear();
        }
        decoded
    }

    /// Populates an existing value declared as `declared` from `data`.
    pub fn deserialize_into(
        &mut self,
        data: &Value,
        declared: Type,
        slot: &mut dyn Reflect,
    ) -> Result<Outcome, GraphError> {
        let shared = slot.is::<ObjRef>();
        let declared = if shared && !declared.is::<ObjRef>() {
            shared_root(declared)
        } else {
            Declared::of(declared)
        };
        let data = if shared { data } else { envelope::content(data) };

        self.refs.enter();
        let outcome = self.decode_into(data, &declared, slot);
        if self.refs.exit() {
            self.collectors.clear();
        }
        outcome
    }

    fn root_declared(&self, ty: Type) -> Declared {
        let reference = !ty.is::<ObjRef>()
            && self
                .registry
                .get(ty.id())
                .is_some_and(|meta| meta.has_flags(TypeFlags::REFERENCE));
        if reference {
            shared_root(ty)
        } else {
            Declared::of(ty)
        }
    }

    /// Decodes a fresh instance; the entry point of container converters.
    pub fn decode_new(&mut self, data: &Value, declared: &Declared) -> Result<Decoded, GraphError> {
        let Instantiated {
            instance,
            data,
            mut outcome,
        } = self.instantiate(data, declared)?;
        let Some(mut instance) = instance else {
            return Ok(Decoded {
                instance: None,
                outcome,
            });
        };

        let concrete = instance.reflect_type();
        let declared = Declared {
            ty: Some(concrete),
            converter: declared
                .converter
                .filter(|_| declared.ty == Some(concrete)),
            ..declared.clone()
        };
        outcome += self.decode_into(&data, &declared, &mut *instance)?;
        Ok(Decoded {
            instance: Some(instance),
            outcome,
        })
    }

    /// Creates the instance `data` will be decoded into.
    ///
    /// Reads `$type` and unwraps `$content` unless the converter of the
    /// declared type handles the envelope itself. Forwarded types are
    /// decoded and converted here; the returned data is what is left to
    /// populate the new instance with.
    pub(crate) fn instantiate<'a>(
        &mut self,
        data: &'a Value,
        declared: &Declared,
    ) -> Result<Instantiated<'a>, GraphError> {
        let registry = self.registry_handle();
        let mut outcome = Outcome::success();
        let declared_meta = declared.ty.and_then(|ty| registry.get(ty.id()));

        if data.is_null() {
            let nullable = declared_meta.is_some_and(|meta| {
                !matches!(
                    meta.kind(),
                    TypeKind::Struct | TypeKind::List { .. } | TypeKind::Map { .. } | TypeKind::Interface
                )
            });
            if !nullable {
                return Ok(Instantiated {
                    instance: None,
                    data: Cow::Borrowed(data),
                    outcome,
                });
            }
        }

        let envelope_aware = match (declared.ty, declared_meta) {
            (Some(ty), Some(meta)) => self
                .converters
                .get(&registry, ty, declared.converter.as_ref())
                .is_some_and(|converter| !converter.request_inheritance_support(meta)),
            _ => false,
        };

        let mut concrete = declared.ty;
        let mut working = Cow::Borrowed(data);
        if !envelope_aware {
            if let Value::Map(map) = data {
                match envelope::type_name(map) {
                    Ok(Some(name)) => match self.resolve_type(name, declared.ty) {
                        Some(ty) => concrete = Some(ty),
                        None => {
                            log::warn!("type `{name}` could not be resolved");
                            outcome += Outcome::warn(format!(
                                "type `{name}` could not be resolved, the declared type is used"
                            ));
                        }
                    },
                    Ok(None) => {}
                    Err(malformed) => outcome += Outcome::warn(malformed.message()),
                }
            }
            working = Cow::Borrowed(envelope::content(data));
            let tagged = working
                .as_map()
                .is_some_and(|map| map.contains_key(envelope::TYPE_KEY));
            if tagged && let Value::Map(map) = working.to_mut() {
                map.shift_remove(envelope::TYPE_KEY);
            }
        }

        let Some(ty) = concrete else {
            outcome += Outcome::fail("no type is declared or named by `$type`");
            return Ok(Instantiated {
                instance: None,
                data: working,
                outcome,
            });
        };
        let Some(meta) = registry.get(ty.id()) else {
            log::warn!("type `{ty}` is not registered");
            outcome += Outcome::warn(format!("type `{ty}` is not registered, read as null"));
            return Ok(Instantiated {
                instance: None,
                data: working,
                outcome,
            });
        };

        if let Some(forward) = meta.get_trait::<ForwardMigration>() {
            let mut owned = working.into_owned();
            let (instance, forwarded) = migrate::forward(self, ty, forward, &mut owned)?;
            outcome += forwarded;
            return Ok(Instantiated {
                instance: Some(instance),
                data: Cow::Owned(owned),
                outcome,
            });
        }

        let over = declared.converter.as_ref().filter(|_| declared.ty == Some(ty));
        let created = match self.converters.get(&registry, ty, over) {
            Some(converter) => converter.create_instance(self, ty),
            None => self.create_from_schema(ty),
        };
        match created {
            Ok(instance) => Ok(Instantiated {
                instance: Some(instance),
                data: working,
                outcome,
            }),
            Err(GraphError::CannotConstruct(path)) => {
                log::warn!("cannot construct an instance of `{path}`");
                outcome += Outcome::fail(format!(
                    "cannot construct an instance of `{path}`, read as null"
                ));
                Ok(Instantiated {
                    instance: None,
                    data: working,
                    outcome,
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Populates `slot` from `data`; the entry point of converters.
    ///
    /// Runs the processors of the slot's type and migrates data written by
    /// an older version before handing it to the converter.
    pub fn decode_into(
        &mut self,
        data: &Value,
        declared: &Declared,
        slot: &mut dyn Reflect,
    ) -> Result<Outcome, GraphError> {
        let ty = slot.reflect_type();
        let registry = self.registry_handle();
        let Some(converter) = self.converters.get(&registry, ty, declared.converter.as_ref())
        else {
            log::warn!("no converter for `{ty}`");
            return Ok(Outcome::warn(format!("no converter for `{ty}`, left unchanged")));
        };
        let Some(meta) = registry.get(ty.id()) else {
            return converter.decode(self, data, declared, slot);
        };

        let processors = self.processors.get(meta);
        let mut data = Cow::Borrowed(data);
        if !processors.is_empty() {
            let edited = data.to_mut();
            for processor in processors.iter() {
                processor.before_deserialize(meta, edited);
            }
        }

        let mut outcome = Outcome::success();
        if let Some(chain) = meta.get_trait::<MigrationChain>()
            && let Some(stored) = migrate::stored_version(ty, chain, &data, &mut outcome)
        {
            outcome += migrate::run(self, ty, chain, stored, data.to_mut(), &mut *slot)?;
        }

        outcome += converter.decode(self, &data, declared, &mut *slot)?;

        for processor in processors.iter().rev() {
            processor.after_deserialize(meta, &mut *slot);
        }
        Ok(outcome)
    }
}

fn shared_root(content: Type) -> Declared {
    Declared {
        ty: Some(Type::of::<ObjRef>()),
        content: Some(content),
        ..Declared::default()
    }
}

// -----------------------------------------------------------------------------
// Tests
