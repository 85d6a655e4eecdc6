//! Schema evolution of registered types.
//!
//! A type lists the shapes it had in earlier versions with a
//! [`MigrationChain`]. Data written by an older version carries `$version`
//! (absent means 0); it is first decoded into the shape of that version
//! and then walked through the registered steps up to the current type.
//!
//! A type may also be replaced by another one altogether with a
//! [`ForwardMigration`]: data tagged with the old type is decoded as the
//! old type, converted, and continues as the new one.
//!
//! # Examples
//!
//! ```
//! use vc_graph::migrate::MigrationChain;
//! # use vc_graph::{impl_type_path, impl_reflect};
//! # #[derive(Default)] struct ConfigV0 { size: i32 }
//! # #[derive(Default)] struct Config { width: i32, height: i32 }
//! # impl_type_path!((in app) ConfigV0);
//! # impl_type_path!((in app) Config);
//! # impl_reflect!(ConfigV0);
//! # impl_reflect!(Config);
//!
//! let chain = MigrationChain::new()
//!     .with_previous::<ConfigV0>()
//!     .with_step(|old: &ConfigV0, new: &mut Config| {
//!         new.width = old.size;
//!         new.height = old.size;
//!     });
//!
//! assert_eq!(chain.current_version(), 1);
//! ```

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt;

use crate::info::{Type, TypePath};
use crate::registry::{TypeRegistry, impl_type_trait};
use crate::value::envelope;
use crate::{Declared, GraphError, GraphSerializer, Outcome, Reflect, Value};

// -----------------------------------------------------------------------------
// MigrationStep

type StepFn = Rc<dyn Fn(&dyn Reflect, &mut dyn Reflect) -> bool>;

/// Converts an instance of one shape into the next.
#[derive(Clone)]
struct MigrationStep {
    from: Type,
    to: Type,
    apply: StepFn,
}

impl MigrationStep {
    fn new<A, B>(f: fn(&A, &mut B)) -> Self
    where
        A: Reflect + TypePath,
        B: Reflect + TypePath,
    {
        Self {
            from: Type::of::<A>(),
            to: Type::of::<B>(),
            apply: Rc::new(move |old, new| {
                match (old.downcast_ref::<A>(), new.downcast_mut::<B>()) {
                    (Some(old), Some(new)) => {
                        f(old, new);
                        true
                    }
                    _ => false,
                }
            }),
        }
    }

    fn apply(
        &self,
        owner: Type,
        old: &dyn Reflect,
        new: &mut dyn Reflect,
    ) -> Result<(), GraphError> {
        if (self.apply)(old, new) {
            return Ok(());
        }
        let (expect, actual) = if old.reflect_type() != self.from {
            (self.from, old.reflect_type())
        } else {
            (self.to, new.reflect_type())
        };
        Err(GraphError::MigrationMismatch {
            ty: owner.path(),
            expect: expect.path(),
            actual: actual.path(),
        })
    }
}

impl fmt::Debug for MigrationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

// -----------------------------------------------------------------------------
// MigrationChain

/// The previous versions of a type and the steps between them.
///
/// `previous[i]` is the shape of data stored with `$version: i`, and the
/// current version is the number of previous shapes. Every previous shape
/// needs a step to the following one, the last to the type itself.
#[derive(Clone, Default)]
pub struct MigrationChain {
    previous: Vec<Type>,
    steps: Vec<MigrationStep>,
}

impl MigrationChain {
    #[inline]
    pub const fn new() -> Self {
        Self {
            previous: Vec::new(),
            steps: Vec::new(),
        }
    }

    /// Appends the shape of the next older-to-newer version.
    pub fn with_previous<V: TypePath + ?Sized>(mut self) -> Self {
        self.previous.push(Type::of::<V>());
        self
    }

    /// Adds the step converting an `A` into a `B`.
    pub fn with_step<A, B>(mut self, step: fn(&A, &mut B)) -> Self
    where
        A: Reflect + TypePath,
        B: Reflect + TypePath,
    {
        self.steps.push(MigrationStep::new(step));
        self
    }

    /// The version written by the current type.
    #[inline]
    pub fn current_version(&self) -> usize {
        self.previous.len()
    }

    /// Previous shapes, oldest first.
    #[inline]
    pub fn previous(&self) -> &[Type] {
        &self.previous
    }

    /// The steps from `stored` up to `ty`, checked against the chain.
    fn path(&self, ty: Type, stored: usize) -> Result<Vec<&MigrationStep>, GraphError> {
        let mut path = Vec::with_capacity(self.previous.len().saturating_sub(stored));
        for index in stored..self.previous.len() {
            let from = self.previous[index];
            let to = self.previous.get(index + 1).copied().unwrap_or(ty);
            let Some(step) = self.steps.iter().find(|step| step.from == from) else {
                return Err(GraphError::MissingMigration {
                    ty: ty.path(),
                    from: from.path(),
                });
            };
            if step.to != to {
                return Err(GraphError::MigrationMismatch {
                    ty: ty.path(),
                    expect: to.path(),
                    actual: step.to.path(),
                });
            }
            path.push(step);
        }
        Ok(path)
    }
}

impl fmt::Debug for MigrationChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrationChain")
            .field("previous", &self.previous)
            .field("steps", &self.steps)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// ForwardMigration

/// The type a [`ForwardMigration`] leads to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ForwardTarget {
    Type(Type),
    /// An open generic definition, closed over the arguments of the old type.
    Generic(&'static str),
}

/// Replaces a type by another one during decoding.
///
/// Data tagged with the old type is decoded as the old type first,
/// including its own version migration, then converted.
#[derive(Clone, Debug)]
pub struct ForwardMigration {
    target: ForwardTarget,
    step: MigrationStep,
}

impl ForwardMigration {
    /// Forwards `T` to `U`.
    pub fn to<T, U>(step: fn(&T, &mut U)) -> Self
    where
        T: Reflect + TypePath,
        U: Reflect + TypePath,
    {
        Self {
            target: ForwardTarget::Type(Type::of::<U>()),
            step: MigrationStep::new(step),
        }
    }

    /// Forwards `T` to the generic `definition` closed over the generic
    /// arguments of `T`, which must be `U`.
    ///
    /// The closed target must be registered.
    pub fn to_generic<T, U>(definition: &'static str, step: fn(&T, &mut U)) -> Self
    where
        T: Reflect + TypePath,
        U: Reflect + TypePath,
    {
        Self {
            target: ForwardTarget::Generic(definition),
            step: MigrationStep::new(step),
        }
    }

    #[inline]
    pub fn target(&self) -> ForwardTarget {
        self.target
    }

    /// Resolves the target type for the old type `ty`.
    pub fn resolve(&self, registry: &TypeRegistry, ty: Type) -> Result<Type, GraphError> {
        let (resolved, name) = match self.target {
            ForwardTarget::Type(target) => {
                (registry.contains(target.id()).then_some(target), target.path())
            }
            ForwardTarget::Generic(definition) => {
                let args = registry
                    .get(ty.id())
                    .and_then(|meta| meta.generics())
                    .map(|generics| generics.args())
                    .unwrap_or_default();
                (registry.close_generic(definition, args), definition)
            }
        };
        let Some(resolved) = resolved else {
            return Err(GraphError::ForwardTarget {
                ty: ty.path(),
                target: name,
            });
        };
        if resolved != self.step.to {
            return Err(GraphError::MigrationMismatch {
                ty: ty.path(),
                expect: self.step.to.path(),
                actual: resolved.path(),
            });
        }
        Ok(resolved)
    }
}

impl_type_trait!(MigrationChain, ForwardMigration);

// -----------------------------------------------------------------------------
// Running migrations

/// Reads the stored version of a migratable map.
///
/// Returns `None` when nothing has to be migrated.
pub(crate) fn stored_version(
    ty: Type,
    chain: &MigrationChain,
    data: &Value,
    outcome: &mut Outcome,
) -> Option<usize> {
    let map = data.as_map()?;
    let current = chain.current_version();
    match envelope::version(map) {
        Ok(None) => (current > 0).then_some(0),
        Ok(Some(stored)) => match usize::try_from(stored) {
            Ok(stored) if stored < current => Some(stored),
            Ok(stored) if stored > current => {
                log::warn!("`{ty}` data has version {stored}, newer than {current}");
                *outcome += Outcome::warn(alloc::format!(
                    "`{ty}` data has version {stored}, newer than the current {current}"
                ));
                None
            }
            Ok(_) => None,
            Err(_) => {
                *outcome += Outcome::warn(alloc::format!(
                    "`{ty}` data has the negative version {stored}, not migrated"
                ));
                None
            }
        },
        Err(malformed) => {
            *outcome += Outcome::warn(malformed.message());
            None
        }
    }
}

/// Migrates `data`, stored with version `stored`, into `target`.
///
/// The keys consumed by the old shape are removed from `data`, so only the
/// keys the current type added since then are left to populate.
pub(crate) fn run(
    ser: &mut GraphSerializer,
    ty: Type,
    chain: &MigrationChain,
    stored: usize,
    data: &mut Value,
    target: &mut dyn Reflect,
) -> Result<Outcome, GraphError> {
    let path = chain.path(ty, stored)?;
    let Some(&old_ty) = chain.previous.get(stored) else {
        return Ok(Outcome::success());
    };
    if let Value::Map(map) = data {
        map.shift_remove(envelope::VERSION_KEY);
    }
    log::debug!("migrating `{ty}` from version {stored} (`{old_ty}`)");

    let mut value = ser.create_instance(old_ty)?;
    let outcome = ser.decode_into(data, &Declared::of(old_ty), &mut *value)?;

    let last = path.len().saturating_sub(1);
    for (index, step) in path.into_iter().enumerate() {
        if index == last {
            step.apply(ty, &*value, target)?;
        } else {
            let mut next: Box<dyn Reflect> = ser.create_instance(step.to)?;
            step.apply(ty, &*value, &mut *next)?;
            value = next;
        }
    }

    strip_keys(ser, old_ty, data);
    Ok(outcome)
}

/// Decodes `data` as `ty` and forwards the result.
///
/// Returns the new instance, still to be populated from what is left of
/// `data`.
pub(crate) fn forward(
    ser: &mut GraphSerializer,
    ty: Type,
    forward: &ForwardMigration,
    data: &mut Value,
) -> Result<(Box<dyn Reflect>, Outcome), GraphError> {
    let registry = ser.registry_handle();
    let target = forward.resolve(&registry, ty)?;
    log::debug!("forwarding `{ty}` to `{target}`");

    let mut old = ser.create_instance(ty)?;
    let outcome = ser.decode_into(data, &Declared::of(ty), &mut *old)?;
    let mut new = ser.create_instance(target)?;
    forward.step.apply(ty, &*old, &mut *new)?;

    strip_keys(ser, ty, data);
    if let Value::Map(map) = data {
        match registry
            .get(target.id())
            .and_then(|meta| meta.get_trait::<MigrationChain>())
        {
            Some(chain) => {
                let current = i64::try_from(chain.current_version()).unwrap_or(i64::MAX);
                map.insert(envelope::VERSION_KEY.into(), Value::int(current));
            }
            None => {
                map.shift_remove(envelope::VERSION_KEY);
            }
        }
    }
    Ok((new, outcome))
}

/// Removes the keys written by the members of `ty`, and by the previous
/// shapes `ty` itself was migrated from.
fn strip_keys(ser: &mut GraphSerializer, ty: Type, data: &mut Value) {
    let registry = ser.registry_handle();
    if let Some(chain) = registry
        .get(ty.id())
        .and_then(|meta| meta.get_trait::<MigrationChain>())
    {
        for &old in chain.previous() {
            strip_keys(ser, old, data);
        }
    }

    let (Some(schema), Value::Map(map)) = (ser.schema_for(ty), data) else {
        return;
    };
    for member in schema.members() {
        if !member.write_only() {
            map.shift_remove(member.serialized_name());
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
