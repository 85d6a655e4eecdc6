use alloc::rc::Rc;
use core::fmt;

use bitflags::bitflags;

use crate::Reflect;
use crate::convert::{Converter, ConverterOverride};
use crate::info::{Type, TypePath};

// -----------------------------------------------------------------------------
// Accessors

type Getter = Rc<dyn for<'a> Fn(&'a dyn Reflect) -> Option<&'a dyn Reflect>>;
type GetterMut = Rc<dyn for<'a> Fn(&'a mut dyn Reflect) -> Option<&'a mut dyn Reflect>>;

// Pins the higher-ranked signature, closure inference would pick one lifetime.
fn getter<F>(f: F) -> Getter
where
    F: for<'a> Fn(&'a dyn Reflect) -> Option<&'a dyn Reflect> + 'static,
{
    Rc::new(f)
}

fn getter_mut<F>(f: F) -> GetterMut
where
    F: for<'a> Fn(&'a mut dyn Reflect) -> Option<&'a mut dyn Reflect> + 'static,
{
    Rc::new(f)
}

// -----------------------------------------------------------------------------
// MemberFlags

bitflags! {
    /// Declarative properties of a member, feeding the inclusion rule of
    /// [`TypeSchema`](crate::schema::TypeSchema).
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct MemberFlags: u16 {
        /// Belongs to the type rather than to instances.
        const STATIC = 1 << 0;
        /// Holds a callback.
        const DELEGATE = 1 << 1;
        /// Generated bookkeeping, not written by hand.
        const SYNTHESIZED = 1 << 2;
        /// Never serialized; wins over `SERIALIZE`.
        const IGNORE = 1 << 3;
        /// Serialized even when not public.
        const SERIALIZE = 1 << 4;
        /// Publicly accessible.
        const PUBLIC = 1 << 5;
        /// Written but never populated on decode.
        const READ_ONLY = 1 << 6;
        /// Populated on decode but never written.
        const WRITE_ONLY = 1 << 7;
        /// A null shared handle is filled with a fresh instance when the data has none.
        const AUTO_INSTANCE = 1 << 8;
        /// The shared object is tracked by identity even if its type is not `REFERENCE`.
        const AS_REFERENCE = 1 << 9;
    }
}

// -----------------------------------------------------------------------------
// MemberInfo

/// A registered member of a struct type.
///
/// # Examples
///
/// ```
/// use vc_graph::info::{MemberInfo, MemberFlags};
/// # use vc_graph::{impl_type_path, impl_reflect};
/// # #[derive(Default)]
/// # struct Player { hp: i32 }
/// # impl_type_path!((in game) Player);
/// # impl_reflect!(Player);
///
/// let member = MemberInfo::field::<Player, i32>("hp", |p| &p.hp, |p| &mut p.hp)
///     .rename("health");
///
/// assert_eq!(member.name(), "hp");
/// assert_eq!(member.serialized_name(), "health");
/// assert!(member.flags().contains(MemberFlags::PUBLIC));
/// ```
#[derive(Clone)]
pub struct MemberInfo {
    name: &'static str,
    rename: Option<&'static str>,
    ty: Type,
    content: Option<Type>,
    flags: MemberFlags,
    converter: Option<ConverterOverride>,
    get: Getter,
    get_mut: GetterMut,
}

impl MemberInfo {
    /// Creates a public member of `S` storing an `F`.
    pub fn field<S: Reflect, F: Reflect + TypePath>(
        name: &'static str,
        get: fn(&S) -> &F,
        get_mut: fn(&mut S) -> &mut F,
    ) -> Self {
        Self {
            name,
            rename: None,
            ty: Type::of::<F>(),
            content: None,
            flags: MemberFlags::PUBLIC,
            converter: None,
            get: getter(move |this: &dyn Reflect| {
                this.downcast_ref::<S>().map(|s| get(s) as &dyn Reflect)
            }),
            get_mut: getter_mut(move |this: &mut dyn Reflect| {
                this.downcast_mut::<S>().map(|s| get_mut(s) as &mut dyn Reflect)
            }),
        }
    }

    /// Serializes the member under another name.
    #[inline]
    pub fn rename(mut self, name: &'static str) -> Self {
        self.rename = Some(name);
        self
    }

    /// Adds flags.
    #[inline]
    pub fn with_flags(mut self, flags: MemberFlags) -> Self {
        self.flags |= flags;
        self
    }

    /// Removes flags.
    #[inline]
    pub fn without_flags(mut self, flags: MemberFlags) -> Self {
        self.flags -= flags;
        self
    }

    /// Declares the type of the object behind a shared handle.
    ///
    /// Shared objects whose concrete type differs are tagged with `$type`.
    #[inline]
    pub fn content<D: TypePath + ?Sized>(mut self) -> Self {
        self.content = Some(Type::of::<D>());
        self
    }

    /// Serializes this member with a specific converter.
    #[inline]
    pub fn with_converter<C: Converter + Default>(mut self) -> Self {
        self.converter = Some(ConverterOverride::of::<C>());
        self
    }

    /// Declared member name.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Key used in serialized maps.
    #[inline]
    pub fn serialized_name(&self) -> &'static str {
        self.rename.unwrap_or(self.name)
    }

    /// Storage type of the member.
    #[inline]
    pub fn ty(&self) -> Type {
        self.ty
    }

    /// Declared type of the shared object the member points to.
    #[inline]
    pub fn content_type(&self) -> Option<Type> {
        self.content
    }

    #[inline]
    pub fn flags(&self) -> MemberFlags {
        self.flags
    }

    #[inline]
    pub fn converter(&self) -> Option<&ConverterOverride> {
        self.converter.as_ref()
    }

    /// Reads the member out of an owner.
    ///
    /// Returns `None` if `owner` is not of the registering type.
    #[inline]
    pub fn get<'a>(&self, owner: &'a dyn Reflect) -> Option<&'a dyn Reflect> {
        (self.get)(owner)
    }

    /// Reads the member out of an owner, mutably.
    #[inline]
    pub fn get_mut<'a>(&self, owner: &'a mut dyn Reflect) -> Option<&'a mut dyn Reflect> {
        (self.get_mut)(owner)
    }

    /// Rebases the accessors of a base type member onto a derived type.
    pub(crate) fn through(&self, base: &BaseInfo) -> Self {
        let (project, get) = (base.project.clone(), self.get.clone());
        let (project_mut, get_mut) = (base.project_mut.clone(), self.get_mut.clone());
        Self {
            get: getter(move |this: &dyn Reflect| project(this).and_then(|b| get(b))),
            get_mut: getter_mut(move |this: &mut dyn Reflect| {
                project_mut(this).and_then(|b| get_mut(b))
            }),
            ..self.clone()
        }
    }
}

impl fmt::Debug for MemberInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberInfo")
            .field("name", &self.name)
            .field("serialized_name", &self.serialized_name())
            .field("ty", &self.ty)
            .field("content", &self.content)
            .field("flags", &self.flags)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// BaseInfo

/// The base type of a derived struct.
///
/// Rust models inheritance by composition: the derived struct embeds its
/// base, and this projection reaches it.
#[derive(Clone)]
pub struct BaseInfo {
    ty: Type,
    project: Getter,
    project_mut: GetterMut,
}

impl BaseInfo {
    /// Declares that `S` derives from the `B` it embeds.
    pub fn new<S: Reflect, B: Reflect + TypePath>(
        project: fn(&S) -> &B,
        project_mut: fn(&mut S) -> &mut B,
    ) -> Self {
        Self {
            ty: Type::of::<B>(),
            project: getter(move |this: &dyn Reflect| {
                this.downcast_ref::<S>().map(|s| project(s) as &dyn Reflect)
            }),
            project_mut: getter_mut(move |this: &mut dyn Reflect| {
                this.downcast_mut::<S>()
                    .map(|s| project_mut(s) as &mut dyn Reflect)
            }),
        }
    }

    #[inline]
    pub fn ty(&self) -> Type {
        self.ty
    }
}

impl fmt::Debug for BaseInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BaseInfo").field(&self.ty).finish()
    }
}
