//! Model types shared by the unit tests.
//!
//! Paths live under `app::`, as a host application would register them.

use alloc::collections::BTreeMap;
use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;

use crate::convert::{Converter, ReflectedConverter};
use crate::info::{BaseInfo, GenericInfo, GenericTypePathCell, MemberFlags, MemberInfo};
use crate::info::{Type, TypeFlags, TypeKind, TypePath, concat};
use crate::migrate::{ForwardMigration, MigrationChain};
use crate::process::ObjectProcessor;
use crate::registry::{ConstructBlank, FromType, GetTypeMeta, SerializationCallbacks};
use crate::registry::{SerializationCollector, TypeMeta, TypeRegistry, TypeTraitCollectable};
use crate::registry::{TypeTraitCollector, TypeTraitConverter, TypeTraitDefault};
use crate::registry::{TypeTraitForwardMember, TypeTraitLifecycle, TypeTraitProcessor};
use crate::registry::TypeTraitUninit;
use crate::{Declared, Encoded, ExternalRef, GraphError, GraphSerializer, ObjRef, Outcome};
use crate::{Reflect, Value, impl_reflect, impl_type_path};

/// Registers every fixture, with the containers the tests use.
pub fn register_all(registry: &mut TypeRegistry) {
    registry.register::<Cat>();
    registry.register::<Dog>();
    registry.register::<model::Item>();
    registry.register::<alt::Item>();
    registry.register::<Pair<i32, Vec<Cat>>>();
    registry.register::<Flagged>();
    registry.register::<Reserved>();
    registry.register::<Shape>();
    registry.register::<Person>();
    registry.register::<Node>();
    registry.register::<Chain>();
    registry.register::<Zoo>();
    registry.register::<Holder>();
    registry.register::<Blob>();
    registry.register::<Vec<Sprite>>();
    registry.register::<Settings>();
    registry.register::<Broken>();
    registry.register::<GadgetV0>();
    registry.register::<Lamp>();
    registry.register::<Profile>();
    registry.register::<OldSlot<i32>>();
    registry.register::<Journal>();
    registry.register::<Scene>();
    registry.register::<Thermometer>();
    registry.register::<Wrapper>();
    registry.register::<Annotated>();
    registry.register::<Vec<Cat>>();
    registry.register::<Option<Cat>>();
    registry.register::<Option<i32>>();
    registry.register::<BTreeMap<String, i32>>();
}

// -----------------------------------------------------------------------------
// Animals

/// The abstract base of [`Cat`] and [`Dog`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Animal {
    pub name: String,
}

impl_type_path!((in app::model) Animal);
impl_reflect!(Animal);

impl GetTypeMeta for Animal {
    fn get_type_meta() -> TypeMeta {
        TypeMeta::of::<Self>(TypeKind::Struct)
            .with_flags(TypeFlags::ABSTRACT)
            .with_member(MemberInfo::field::<Self, String>(
                "name",
                |a| &a.name,
                |a| &mut a.name,
            ))
    }
}

/// Stands in for an interface; only used as a declared type.
pub struct Named;

impl_type_path!((in app::model) Named);

impl GetTypeMeta for Named {
    fn get_type_meta() -> TypeMeta {
        TypeMeta::of::<Self>(TypeKind::Interface).with_flags(TypeFlags::INTERFACE)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Cat {
    pub animal: Animal,
    pub lives: i32,
}

impl Cat {
    pub fn new(name: &str, lives: i32) -> Self {
        Self {
            animal: Animal { name: name.into() },
            lives,
        }
    }
}

impl_type_path!((in app::model) Cat);
impl_reflect!(Cat);

impl GetTypeMeta for Cat {
    fn get_type_meta() -> TypeMeta {
        TypeMeta::of::<Self>(TypeKind::Struct)
            .with_base(BaseInfo::new::<Self, Animal>(|c| &c.animal, |c| &mut c.animal))
            .with_member(MemberInfo::field::<Self, i32>(
                "lives",
                |c| &c.lives,
                |c| &mut c.lives,
            ))
            .with_former_name("app::legacy::Kitten")
            .with_trait::<TypeTraitDefault>(FromType::<Self>::from_type())
    }

    fn register_dependencies(registry: &mut TypeRegistry) {
        registry.register::<Animal>();
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dog {
    pub animal: Animal,
}

impl Dog {
    pub fn new(name: &str) -> Self {
        Self {
            animal: Animal { name: name.into() },
        }
    }
}

impl_type_path!((in app::model) Dog);
impl_reflect!(Dog);

impl GetTypeMeta for Dog {
    fn get_type_meta() -> TypeMeta {
        TypeMeta::of::<Self>(TypeKind::Struct)
            .with_base(BaseInfo::new::<Self, Animal>(|d| &d.animal, |d| &mut d.animal))
            .with_interface::<Named>()
            .with_trait::<TypeTraitDefault>(FromType::<Self>::from_type())
    }

    fn register_dependencies(registry: &mut TypeRegistry) {
        registry.register::<Animal>();
        registry.register::<Named>();
    }
}

// -----------------------------------------------------------------------------
// Same name, two namespaces

pub mod model {
    use crate::info::{MemberInfo, TypeKind};
    use crate::registry::{FromType, GetTypeMeta, TypeMeta, TypeTraitDefault};
    use crate::{impl_reflect, impl_type_path};

    #[derive(Debug, Default)]
    pub struct Item {
        pub id: i32,
    }

    impl_type_path!((in app::model) Item);
    impl_reflect!(Item);

    impl GetTypeMeta for Item {
        fn get_type_meta() -> TypeMeta {
            TypeMeta::of::<Self>(TypeKind::Struct)
                .with_member(MemberInfo::field::<Self, i32>("id", |i| &i.id, |i| &mut i.id))
                .with_trait::<TypeTraitDefault>(FromType::<Self>::from_type())
        }
    }
}

pub mod alt {
    use crate::info::{MemberInfo, TypeKind};
    use crate::registry::{FromType, GetTypeMeta, TypeMeta, TypeTraitDefault};
    use crate::{impl_reflect, impl_type_path};

    #[derive(Debug, Default)]
    pub struct Item {
        pub id: i32,
    }

    impl_type_path!((in app::alt) Item);
    impl_reflect!(Item);

    impl GetTypeMeta for Item {
        fn get_type_meta() -> TypeMeta {
            TypeMeta::of::<Self>(TypeKind::Struct)
                .with_member(MemberInfo::field::<Self, i32>("id", |i| &i.id, |i| &mut i.id))
                .with_trait::<TypeTraitDefault>(FromType::<Self>::from_type())
        }
    }
}

// -----------------------------------------------------------------------------
// Generics

#[derive(Debug, Default)]
pub struct Pair<A, B> {
    pub first: A,
    pub second: B,
}

impl<A: TypePath, B: TypePath> TypePath for Pair<A, B> {
    fn type_path() -> &'static str {
        static CELL: GenericTypePathCell = GenericTypePathCell::new();
        CELL.get_or_insert::<Self>(|| {
            concat(&["app::model::Pair<", A::type_path(), ", ", B::type_path(), ">"])
        })
    }

    fn type_name() -> &'static str {
        static CELL: GenericTypePathCell = GenericTypePathCell::new();
        CELL.get_or_insert::<Self>(|| concat(&["Pair<", A::type_name(), ", ", B::type_name(), ">"]))
    }

    fn type_ident() -> &'static str {
        "Pair"
    }

    fn module_path() -> Option<&'static str> {
        Some("app::model")
    }
}

impl<A: Reflect + TypePath, B: Reflect + TypePath> Reflect for Pair<A, B> {
    crate::impl_reflect_cast_fn!();
}

impl<A, B> GetTypeMeta for Pair<A, B>
where
    A: GetTypeMeta + Reflect + Default,
    B: GetTypeMeta + Reflect + Default,
{
    fn get_type_meta() -> TypeMeta {
        TypeMeta::of::<Self>(TypeKind::Struct)
            .with_generics(GenericInfo::of::<Self>(&[Type::of::<A>(), Type::of::<B>()]))
            .with_member(MemberInfo::field::<Self, A>("first", |p| &p.first, |p| &mut p.first))
            .with_member(MemberInfo::field::<Self, B>("second", |p| &p.second, |p| &mut p.second))
            .with_trait::<TypeTraitDefault>(FromType::<Self>::from_type())
    }

    fn register_dependencies(registry: &mut TypeRegistry) {
        registry.register::<A>();
        registry.register::<B>();
    }
}

#[derive(Debug, Default)]
pub struct Slot<T> {
    pub value: T,
}

impl<T: TypePath> TypePath for Slot<T> {
    fn type_path() -> &'static str {
        static CELL: GenericTypePathCell = GenericTypePathCell::new();
        CELL.get_or_insert::<Self>(|| concat(&["app::model::Slot<", T::type_path(), ">"]))
    }

    fn type_name() -> &'static str {
        static CELL: GenericTypePathCell = GenericTypePathCell::new();
        CELL.get_or_insert::<Self>(|| concat(&["Slot<", T::type_name(), ">"]))
    }

    fn type_ident() -> &'static str {
        "Slot"
    }
}

impl<T: Reflect + TypePath> Reflect for Slot<T> {
    crate::impl_reflect_cast_fn!();
}

impl<T: GetTypeMeta + Reflect + Default> GetTypeMeta for Slot<T> {
    fn get_type_meta() -> TypeMeta {
        TypeMeta::of::<Self>(TypeKind::Struct)
            .with_generics(GenericInfo::of::<Self>(&[Type::of::<T>()]))
            .with_member(MemberInfo::field::<Self, T>("value", |s| &s.value, |s| &mut s.value))
            .with_trait::<TypeTraitDefault>(FromType::<Self>::from_type())
    }

    fn register_dependencies(registry: &mut TypeRegistry) {
        registry.register::<T>();
    }
}

/// The shape `Slot` had under its former name.
#[derive(Debug, Default)]
pub struct OldSlot<T> {
    pub item: T,
}

impl<T: TypePath> TypePath for OldSlot<T> {
    fn type_path() -> &'static str {
        static CELL: GenericTypePathCell = GenericTypePathCell::new();
        CELL.get_or_insert::<Self>(|| concat(&["app::legacy::OldSlot<", T::type_path(), ">"]))
    }

    fn type_name() -> &'static str {
        static CELL: GenericTypePathCell = GenericTypePathCell::new();
        CELL.get_or_insert::<Self>(|| concat(&["OldSlot<", T::type_name(), ">"]))
    }

    fn type_ident() -> &'static str {
        "OldSlot"
    }
}

impl<T: Reflect + TypePath> Reflect for OldSlot<T> {
    crate::impl_reflect_cast_fn!();
}

impl<T: GetTypeMeta + Reflect + Default + Clone> GetTypeMeta for OldSlot<T> {
    fn get_type_meta() -> TypeMeta {
        TypeMeta::of::<Self>(TypeKind::Struct)
            .with_generics(GenericInfo::of::<Self>(&[Type::of::<T>()]))
            .with_member(MemberInfo::field::<Self, T>("item", |s| &s.item, |s| &mut s.item))
            .with_trait::<TypeTraitDefault>(FromType::<Self>::from_type())
            .with_trait(ForwardMigration::to_generic(
                "app::model::Slot",
                |old: &OldSlot<T>, new: &mut Slot<T>| new.value = old.item.clone(),
            ))
    }

    fn register_dependencies(registry: &mut TypeRegistry) {
        registry.register::<T>();
        registry.register::<Slot<T>>();
    }
}

// -----------------------------------------------------------------------------
// Schema rules

/// One member per inclusion rule.
#[derive(Debug, Default)]
pub struct Flagged {
    pub public: i32,
    pub opted_in: i32,
    pub read_only: i32,
    pub write_only: i32,
    pub private: i32,
    pub ignored: i32,
    pub counter: i32,
    pub callback: i32,
    pub backing: i32,
}

impl_type_path!((in app::model) Flagged);
impl_reflect!(Flagged);

impl GetTypeMeta for Flagged {
    fn get_type_meta() -> TypeMeta {
        type F = Flagged;
        TypeMeta::of::<Self>(TypeKind::Struct)
            .with_member(MemberInfo::field::<F, i32>("public", |f| &f.public, |f| &mut f.public))
            .with_member(
                MemberInfo::field::<F, i32>("opted_in", |f| &f.opted_in, |f| &mut f.opted_in)
                    .without_flags(MemberFlags::PUBLIC)
                    .with_flags(MemberFlags::SERIALIZE),
            )
            .with_member(
                MemberInfo::field::<F, i32>("read_only", |f| &f.read_only, |f| &mut f.read_only)
                    .with_flags(MemberFlags::READ_ONLY),
            )
            .with_member(
                MemberInfo::field::<F, i32>("write_only", |f| &f.write_only, |f| {
                    &mut f.write_only
                })
                .with_flags(MemberFlags::WRITE_ONLY),
            )
            .with_member(
                MemberInfo::field::<F, i32>("private", |f| &f.private, |f| &mut f.private)
                    .without_flags(MemberFlags::PUBLIC),
            )
            .with_member(
                MemberInfo::field::<F, i32>("ignored", |f| &f.ignored, |f| &mut f.ignored)
                    .with_flags(MemberFlags::IGNORE | MemberFlags::SERIALIZE),
            )
            .with_member(
                MemberInfo::field::<F, i32>("counter", |f| &f.counter, |f| &mut f.counter)
                    .with_flags(MemberFlags::STATIC),
            )
            .with_member(
                MemberInfo::field::<F, i32>("callback", |f| &f.callback, |f| &mut f.callback)
                    .with_flags(MemberFlags::DELEGATE),
            )
            .with_member(
                MemberInfo::field::<F, i32>("backing", |f| &f.backing, |f| &mut f.backing)
                    .with_flags(MemberFlags::SYNTHESIZED),
            )
            .with_trait::<TypeTraitDefault>(FromType::<Self>::from_type())
    }
}

/// A member renamed onto an envelope key.
#[derive(Debug, Default)]
pub struct Reserved {
    pub value: i32,
    pub id: i32,
}

impl_type_path!((in app::model) Reserved);
impl_reflect!(Reserved);

impl GetTypeMeta for Reserved {
    fn get_type_meta() -> TypeMeta {
        TypeMeta::of::<Self>(TypeKind::Struct)
            .with_member(MemberInfo::field::<Self, i32>("value", |r| &r.value, |r| &mut r.value))
            .with_member(MemberInfo::field::<Self, i32>("id", |r| &r.id, |r| &mut r.id).rename("$id"))
            .with_trait::<TypeTraitDefault>(FromType::<Self>::from_type())
    }
}

/// Built blank, skipping its `Default`.
#[derive(Debug)]
pub struct Shape {
    pub sides: u8,
}

impl Default for Shape {
    fn default() -> Self {
        Self { sides: 4 }
    }
}

impl ConstructBlank for Shape {
    fn construct_blank() -> Self {
        Self { sides: 0 }
    }
}

impl_type_path!((in app::model) Shape);
impl_reflect!(Shape);

impl GetTypeMeta for Shape {
    fn get_type_meta() -> TypeMeta {
        TypeMeta::of::<Self>(TypeKind::Struct)
            .with_flags(TypeFlags::CONSTRUCT_UNINIT)
            .with_member(MemberInfo::field::<Self, u8>("sides", |s| &s.sides, |s| &mut s.sides))
            .with_trait::<TypeTraitDefault>(FromType::<Self>::from_type())
            .with_trait::<TypeTraitUninit>(FromType::<Self>::from_type())
    }
}

/// Registered without any converter accepting it.
#[derive(Debug)]
pub struct Blob(pub i32);

impl_type_path!((in app::model) Blob);
impl_reflect!(Blob);

impl GetTypeMeta for Blob {
    fn get_type_meta() -> TypeMeta {
        TypeMeta::of::<Self>(TypeKind::Opaque)
    }
}

/// Reflected but never registered.
pub struct Unregistered;

impl_type_path!((in app::model) Unregistered);
impl_reflect!(Unregistered);

// -----------------------------------------------------------------------------
// Object graphs

/// Points to itself through `self`.
#[derive(Debug, Default)]
pub struct Person {
    pub name: String,
    pub self_ref: ObjRef,
}

impl Person {
    /// A person whose `self` is its own handle.
    pub fn bob() -> ObjRef {
        let bob = ObjRef::new(Person {
            name: "Bob".into(),
            self_ref: ObjRef::null(),
        });
        if let Some(mut person) = bob.get_mut::<Person>() {
            person.self_ref = bob.clone();
        }
        bob
    }
}

impl_type_path!((in app::model) Person);
impl_reflect!(Person);

impl GetTypeMeta for Person {
    fn get_type_meta() -> TypeMeta {
        TypeMeta::of::<Self>(TypeKind::Struct)
            .with_flags(TypeFlags::REFERENCE)
            .with_member(MemberInfo::field::<Self, String>("name", |p| &p.name, |p| &mut p.name))
            .with_member(
                MemberInfo::field::<Self, ObjRef>("self_ref", |p| &p.self_ref, |p| {
                    &mut p.self_ref
                })
                .rename("self")
                .content::<Person>(),
            )
            .with_trait::<TypeTraitDefault>(FromType::<Self>::from_type())
    }
}

#[derive(Debug, Default)]
pub struct Node {
    pub name: String,
    pub left: ObjRef,
    pub right: ObjRef,
}

impl Node {
    pub fn shared(name: &str) -> ObjRef {
        ObjRef::new(Node {
            name: name.into(),
            ..Node::default()
        })
    }
}

impl_type_path!((in app::model) Node);
impl_reflect!(Node);

impl GetTypeMeta for Node {
    fn get_type_meta() -> TypeMeta {
        TypeMeta::of::<Self>(TypeKind::Struct)
            .with_flags(TypeFlags::REFERENCE)
            .with_member(MemberInfo::field::<Self, String>("name", |n| &n.name, |n| &mut n.name))
            .with_member(
                MemberInfo::field::<Self, ObjRef>("left", |n| &n.left, |n| &mut n.left)
                    .content::<Node>(),
            )
            .with_member(
                MemberInfo::field::<Self, ObjRef>("right", |n| &n.right, |n| &mut n.right)
                    .content::<Node>(),
            )
            .with_trait::<TypeTraitDefault>(FromType::<Self>::from_type())
    }
}

/// Shared but not tracked, so cycles cannot be written.
#[derive(Debug, Default)]
pub struct Chain {
    pub next: ObjRef,
}

impl_type_path!((in app::model) Chain);
impl_reflect!(Chain);

impl GetTypeMeta for Chain {
    fn get_type_meta() -> TypeMeta {
        TypeMeta::of::<Self>(TypeKind::Struct)
            .with_member(
                MemberInfo::field::<Self, ObjRef>("next", |c| &c.next, |c| &mut c.next)
                    .content::<Chain>(),
            )
            .with_trait::<TypeTraitDefault>(FromType::<Self>::from_type())
    }
}

#[derive(Debug, Default)]
pub struct Zoo {
    pub pet: ObjRef,
    pub pets: Vec<ObjRef>,
    pub keeper: ObjRef,
}

impl_type_path!((in app::model) Zoo);
impl_reflect!(Zoo);

impl GetTypeMeta for Zoo {
    fn get_type_meta() -> TypeMeta {
        TypeMeta::of::<Self>(TypeKind::Struct)
            .with_member(
                MemberInfo::field::<Self, ObjRef>("pet", |z| &z.pet, |z| &mut z.pet)
                    .content::<Animal>(),
            )
            .with_member(
                MemberInfo::field::<Self, Vec<ObjRef>>("pets", |z| &z.pets, |z| &mut z.pets)
                    .content::<Animal>(),
            )
            .with_member(
                MemberInfo::field::<Self, ObjRef>("keeper", |z| &z.keeper, |z| &mut z.keeper)
                    .content::<Dog>()
                    .with_flags(MemberFlags::AUTO_INSTANCE),
            )
            .with_trait::<TypeTraitDefault>(FromType::<Self>::from_type())
    }

    fn register_dependencies(registry: &mut TypeRegistry) {
        registry.register::<Vec<ObjRef>>();
        registry.register::<Cat>();
        registry.register::<Dog>();
    }
}

/// Tracks its shared members whatever their type.
#[derive(Debug, Default)]
pub struct Holder {
    pub first: ObjRef,
    pub second: ObjRef,
}

impl_type_path!((in app::model) Holder);
impl_reflect!(Holder);

impl GetTypeMeta for Holder {
    fn get_type_meta() -> TypeMeta {
        TypeMeta::of::<Self>(TypeKind::Struct)
            .with_member(
                MemberInfo::field::<Self, ObjRef>("first", |h| &h.first, |h| &mut h.first)
                    .with_flags(MemberFlags::AS_REFERENCE),
            )
            .with_member(
                MemberInfo::field::<Self, ObjRef>("second", |h| &h.second, |h| &mut h.second)
                    .with_flags(MemberFlags::AS_REFERENCE),
            )
            .with_trait::<TypeTraitDefault>(FromType::<Self>::from_type())
    }

    fn register_dependencies(registry: &mut TypeRegistry) {
        registry.register::<Settings>();
    }
}

#[derive(Debug, Default)]
pub struct Sprite {
    pub texture: ExternalRef,
}

impl_type_path!((in app::model) Sprite);
impl_reflect!(Sprite);

impl GetTypeMeta for Sprite {
    fn get_type_meta() -> TypeMeta {
        TypeMeta::of::<Self>(TypeKind::Struct)
            .with_member(MemberInfo::field::<Self, ExternalRef>(
                "texture",
                |s| &s.texture,
                |s| &mut s.texture,
            ))
            .with_trait::<TypeTraitDefault>(FromType::<Self>::from_type())
    }
}

// -----------------------------------------------------------------------------
// Versions

#[derive(Debug, Default)]
pub struct SettingsV0 {
    pub level: i32,
}

impl_type_path!((in app::model) SettingsV0);
impl_reflect!(SettingsV0);

impl GetTypeMeta for SettingsV0 {
    fn get_type_meta() -> TypeMeta {
        TypeMeta::of::<Self>(TypeKind::Struct)
            .with_member(MemberInfo::field::<Self, i32>("level", |s| &s.level, |s| &mut s.level))
            .with_trait::<TypeTraitDefault>(FromType::<Self>::from_type())
    }
}

#[derive(Debug, Default)]
pub struct SettingsV1 {
    pub level: i32,
    pub name: String,
}

impl_type_path!((in app::model) SettingsV1);
impl_reflect!(SettingsV1);

impl GetTypeMeta for SettingsV1 {
    fn get_type_meta() -> TypeMeta {
        TypeMeta::of::<Self>(TypeKind::Struct)
            .with_member(MemberInfo::field::<Self, i32>("level", |s| &s.level, |s| &mut s.level))
            .with_member(MemberInfo::field::<Self, String>("name", |s| &s.name, |s| &mut s.name))
            .with_trait::<TypeTraitDefault>(FromType::<Self>::from_type())
    }
}

/// Version 2; `level` was multiplied by ten in version 1.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Settings {
    pub level: i32,
    pub label: String,
    pub muted: bool,
}

impl_type_path!((in app::model) Settings);
impl_reflect!(Settings);

impl GetTypeMeta for Settings {
    fn get_type_meta() -> TypeMeta {
        TypeMeta::of::<Self>(TypeKind::Struct)
            .with_member(MemberInfo::field::<Self, i32>("level", |s| &s.level, |s| &mut s.level))
            .with_member(MemberInfo::field::<Self, String>("label", |s| &s.label, |s| &mut s.label))
            .with_member(MemberInfo::field::<Self, bool>("muted", |s| &s.muted, |s| &mut s.muted))
            .with_trait::<TypeTraitDefault>(FromType::<Self>::from_type())
            .with_trait(
                MigrationChain::new()
                    .with_previous::<SettingsV0>()
                    .with_previous::<SettingsV1>()
                    .with_step(|old: &SettingsV0, new: &mut SettingsV1| {
                        new.level = old.level * 10;
                        new.name = "default".into();
                    })
                    .with_step(|old: &SettingsV1, new: &mut Settings| {
                        new.level = old.level;
                        new.label = old.name.clone();
                    }),
            )
    }

    fn register_dependencies(registry: &mut TypeRegistry) {
        registry.register::<SettingsV0>();
        registry.register::<SettingsV1>();
    }
}

/// Declares a previous version but no step out of it.
#[derive(Debug, Default)]
pub struct Broken {
    pub level: i32,
}

impl_type_path!((in app::model) Broken);
impl_reflect!(Broken);

impl GetTypeMeta for Broken {
    fn get_type_meta() -> TypeMeta {
        TypeMeta::of::<Self>(TypeKind::Struct)
            .with_flags(TypeFlags::REFERENCE)
            .with_member(MemberInfo::field::<Self, i32>("level", |b| &b.level, |b| &mut b.level))
            .with_trait::<TypeTraitDefault>(FromType::<Self>::from_type())
            .with_trait(MigrationChain::new().with_previous::<SettingsV0>())
    }

    fn register_dependencies(registry: &mut TypeRegistry) {
        registry.register::<SettingsV0>();
    }
}

#[derive(Debug, Default)]
pub struct Gadget {
    pub width: i32,
    pub height: i32,
    pub color: String,
}

impl_type_path!((in app::model) Gadget);
impl_reflect!(Gadget);

impl GetTypeMeta for Gadget {
    fn get_type_meta() -> TypeMeta {
        TypeMeta::of::<Self>(TypeKind::Struct)
            .with_member(MemberInfo::field::<Self, i32>("width", |g| &g.width, |g| &mut g.width))
            .with_member(MemberInfo::field::<Self, i32>("height", |g| &g.height, |g| &mut g.height))
            .with_member(MemberInfo::field::<Self, String>("color", |g| &g.color, |g| &mut g.color))
            .with_trait::<TypeTraitDefault>(FromType::<Self>::from_type())
    }
}

/// Replaced by [`Gadget`].
#[derive(Debug, Default)]
pub struct GadgetV0 {
    pub size: i32,
}

impl_type_path!((in app::model) GadgetV0);
impl_reflect!(GadgetV0);

impl GetTypeMeta for GadgetV0 {
    fn get_type_meta() -> TypeMeta {
        TypeMeta::of::<Self>(TypeKind::Struct)
            .with_member(MemberInfo::field::<Self, i32>("size", |g| &g.size, |g| &mut g.size))
            .with_trait::<TypeTraitDefault>(FromType::<Self>::from_type())
            .with_trait(ForwardMigration::to(|old: &GadgetV0, new: &mut Gadget| {
                new.width = old.size;
                new.height = old.size;
            }))
    }

    fn register_dependencies(registry: &mut TypeRegistry) {
        registry.register::<Gadget>();
    }
}

#[derive(Debug, Default)]
pub struct LampV0 {
    pub level: i32,
}

impl_type_path!((in app::model) LampV0);
impl_reflect!(LampV0);

impl GetTypeMeta for LampV0 {
    fn get_type_meta() -> TypeMeta {
        TypeMeta::of::<Self>(TypeKind::Struct)
            .with_member(MemberInfo::field::<Self, i32>("level", |l| &l.level, |l| &mut l.level))
            .with_trait::<TypeTraitDefault>(FromType::<Self>::from_type())
    }
}

/// Version 1, replaced by [`Light`]; `level` of version 0 was tenths of `power`.
#[derive(Debug, Default)]
pub struct Lamp {
    pub power: i32,
    pub on: bool,
}

impl_type_path!((in app::model) Lamp);
impl_reflect!(Lamp);

impl GetTypeMeta for Lamp {
    fn get_type_meta() -> TypeMeta {
        TypeMeta::of::<Self>(TypeKind::Struct)
            .with_member(MemberInfo::field::<Self, i32>("power", |l| &l.power, |l| &mut l.power))
            .with_member(MemberInfo::field::<Self, bool>("on", |l| &l.on, |l| &mut l.on))
            .with_trait::<TypeTraitDefault>(FromType::<Self>::from_type())
            .with_trait(MigrationChain::new().with_previous::<LampV0>().with_step(
                |old: &LampV0, new: &mut Lamp| {
                    new.power = old.level * 10;
                },
            ))
            .with_trait(ForwardMigration::to(|old: &Lamp, new: &mut Light| {
                new.level = old.power;
                new.on = old.on;
            }))
    }

    fn register_dependencies(registry: &mut TypeRegistry) {
        registry.register::<LampV0>();
        registry.register::<Light>();
    }
}

/// Reuses the `level` key of [`LampV0`] with a different scale.
#[derive(Debug, Default)]
pub struct Light {
    pub level: i32,
    pub on: bool,
    pub color: String,
}

impl_type_path!((in app::model) Light);
impl_reflect!(Light);

impl GetTypeMeta for Light {
    fn get_type_meta() -> TypeMeta {
        TypeMeta::of::<Self>(TypeKind::Struct)
            .with_member(MemberInfo::field::<Self, i32>("level", |l| &l.level, |l| &mut l.level))
            .with_member(MemberInfo::field::<Self, bool>("on", |l| &l.on, |l| &mut l.on))
            .with_member(MemberInfo::field::<Self, String>("color", |l| &l.color, |l| &mut l.color))
            .with_trait::<TypeTraitDefault>(FromType::<Self>::from_type())
    }
}

#[derive(Debug, Default)]
pub struct ProfileV0 {
    pub nick: String,
}

impl_type_path!((in app::model) ProfileV0);
impl_reflect!(ProfileV0);

impl GetTypeMeta for ProfileV0 {
    fn get_type_meta() -> TypeMeta {
        TypeMeta::of::<Self>(TypeKind::Struct)
            .with_member(MemberInfo::field::<Self, String>("nick", |p| &p.nick, |p| &mut p.nick))
            .with_trait::<TypeTraitDefault>(FromType::<Self>::from_type())
    }
}

/// A previous shape of [`Profile`] with a chain of its own.
#[derive(Debug, Default)]
pub struct ProfileV1 {
    pub name: String,
    pub age: i32,
}

impl_type_path!((in app::model) ProfileV1);
impl_reflect!(ProfileV1);

impl GetTypeMeta for ProfileV1 {
    fn get_type_meta() -> TypeMeta {
        TypeMeta::of::<Self>(TypeKind::Struct)
            .with_member(MemberInfo::field::<Self, String>("name", |p| &p.name, |p| &mut p.name))
            .with_member(MemberInfo::field::<Self, i32>("age", |p| &p.age, |p| &mut p.age))
            .with_trait::<TypeTraitDefault>(FromType::<Self>::from_type())
            .with_trait(MigrationChain::new().with_previous::<ProfileV0>().with_step(
                |old: &ProfileV0, new: &mut ProfileV1| {
                    new.name = old.nick.to_uppercase();
                },
            ))
    }

    fn register_dependencies(registry: &mut TypeRegistry) {
        registry.register::<ProfileV0>();
    }
}

/// `nick` came back in version 1 as an optional extra.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Profile {
    pub display: String,
    pub age: i32,
    pub nick: String,
}

impl_type_path!((in app::model) Profile);
impl_reflect!(Profile);

impl GetTypeMeta for Profile {
    fn get_type_meta() -> TypeMeta {
        TypeMeta::of::<Self>(TypeKind::Struct)
            .with_member(MemberInfo::field::<Self, String>(
                "display",
                |p| &p.display,
                |p| &mut p.display,
            ))
            .with_member(MemberInfo::field::<Self, i32>("age", |p| &p.age, |p| &mut p.age))
            .with_member(MemberInfo::field::<Self, String>("nick", |p| &p.nick, |p| &mut p.nick))
            .with_trait::<TypeTraitDefault>(FromType::<Self>::from_type())
            .with_trait(MigrationChain::new().with_previous::<ProfileV1>().with_step(
                |old: &ProfileV1, new: &mut Profile| {
                    new.display = old.name.clone();
                    new.age = old.age;
                },
            ))
    }

    fn register_dependencies(registry: &mut TypeRegistry) {
        registry.register::<ProfileV1>();
    }
}

// -----------------------------------------------------------------------------
// Processors

/// Runs `Tagger` and lifecycle callbacks, and records every hook in `log`.
#[derive(Debug, Default)]
pub struct Journal {
    pub title: String,
    pub log: Rc<RefCell<Vec<String>>>,
}

impl Journal {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.into(),
            log: Rc::default(),
        }
    }

    fn record(&self, entry: String) {
        self.log.borrow_mut().push(entry);
    }
}

impl SerializationCallbacks for Journal {
    fn before_serialize(&self) {
        self.record("lifecycle:before_serialize".into());
    }

    fn after_deserialize(&mut self) {
        self.record("lifecycle:after_deserialize".into());
    }
}

impl_type_path!((in app::model) Journal);
impl_reflect!(Journal);

impl GetTypeMeta for Journal {
    fn get_type_meta() -> TypeMeta {
        TypeMeta::of::<Self>(TypeKind::Struct)
            .with_member(MemberInfo::field::<Self, String>("title", |j| &j.title, |j| &mut j.title))
            .with_trait::<TypeTraitDefault>(FromType::<Self>::from_type())
            .with_trait::<TypeTraitLifecycle>(FromType::<Self>::from_type())
            .with_trait(TypeTraitProcessor::of::<Tagger>())
    }
}

/// Appends `entry` to the `trail` array of an encoded map.
fn push_trail(data: &mut Value, entry: &str) {
    if let Some(map) = data.as_map_mut()
        && let Value::Array(trail) = map
            .entry(String::from("trail"))
            .or_insert_with(|| Value::Array(Vec::new()))
    {
        trail.push(Value::from(entry));
    }
}

/// Logs the hooks it sees on a [`Journal`] under `label`.
fn journal_hook(value: &dyn Reflect, label: &str, hook: &str) {
    if let Some(journal) = value.downcast_ref::<Journal>() {
        journal.record(format!("{label}:{hook}"));
    }
}

/// The processor annotated on [`Journal`]; also tags the title on decode.
#[derive(Default)]
pub struct Tagger;

impl ObjectProcessor for Tagger {
    fn before_serialize(&self, _: &TypeMeta, value: &dyn Reflect) {
        journal_hook(value, "annotated", "before_serialize");
    }

    fn after_serialize(&self, _: &TypeMeta, value: &dyn Reflect, data: &mut Value) {
        journal_hook(value, "annotated", "after_serialize");
        push_trail(data, "annotated");
    }

    fn before_deserialize(&self, _: &TypeMeta, data: &mut Value) {
        if let Some(map) = data.as_map_mut()
            && let Some(Value::String(title)) = map.get_mut("title")
        {
            title.push_str(" (tagged)");
        }
    }

    fn after_deserialize(&self, _: &TypeMeta, value: &mut dyn Reflect) {
        journal_hook(value, "annotated", "after_deserialize");
    }
}

/// A global processor accepting every type.
#[derive(Default)]
pub struct Recorder;

impl ObjectProcessor for Recorder {
    fn before_serialize(&self, _: &TypeMeta, value: &dyn Reflect) {
        journal_hook(value, "global", "before_serialize");
    }

    fn after_serialize(&self, meta: &TypeMeta, value: &dyn Reflect, data: &mut Value) {
        journal_hook(value, "global", "after_serialize");
        if meta.ty().is::<Journal>() {
            push_trail(data, "global");
        }
    }

    fn after_deserialize(&self, _: &TypeMeta, value: &mut dyn Reflect) {
        journal_hook(value, "global", "after_deserialize");
    }
}

// -----------------------------------------------------------------------------
// Collectors

/// A collector of the [`Actor`]s beneath it.
#[derive(Debug, Default)]
pub struct Scene {
    pub actors: Vec<ObjRef>,
    pub scenes: Vec<ObjRef>,
    pub log: Vec<String>,
    pub collected: Vec<(ObjRef, i32)>,
}

impl Scene {
    /// `name@depth` of every collected actor, in collection order.
    pub fn collected_names(&self) -> Vec<String> {
        self.collected
            .iter()
            .filter_map(|(object, depth)| {
                let actor = object.get::<Actor>()?;
                Some(format!("{}@{depth}", actor.name))
            })
            .collect()
    }
}

impl SerializationCollector for Scene {
    fn on_push(&mut self, parent: Option<&ObjRef>) {
        let entry = if parent.is_some() { "push:nested" } else { "push:root" };
        self.log.push(entry.into());
    }

    fn on_collect(&mut self, object: &ObjRef, depth: i32) {
        self.collected.push((object.clone(), depth));
    }

    fn on_pop(&mut self, parent: Option<&ObjRef>) {
        let entry = if parent.is_some() { "pop:nested" } else { "pop:root" };
        self.log.push(entry.into());
    }
}

impl_type_path!((in app::model) Scene);
impl_reflect!(Scene);

impl GetTypeMeta for Scene {
    fn get_type_meta() -> TypeMeta {
        TypeMeta::of::<Self>(TypeKind::Struct)
            .with_flags(TypeFlags::REFERENCE)
            .with_member(
                MemberInfo::field::<Self, Vec<ObjRef>>("actors", |s| &s.actors, |s| {
                    &mut s.actors
                })
                .content::<Actor>(),
            )
            .with_member(
                MemberInfo::field::<Self, Vec<ObjRef>>("scenes", |s| &s.scenes, |s| {
                    &mut s.scenes
                })
                .content::<Scene>(),
            )
            .with_trait::<TypeTraitDefault>(FromType::<Self>::from_type())
            .with_trait::<TypeTraitCollector>(FromType::<Self>::from_type())
    }

    fn register_dependencies(registry: &mut TypeRegistry) {
        registry.register::<Vec<ObjRef>>();
        registry.register::<Actor>();
    }
}

#[derive(Debug, Default)]
pub struct Actor {
    pub name: String,
    pub children: Vec<ObjRef>,
}

impl Actor {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }
}

impl_type_path!((in app::model) Actor);
impl_reflect!(Actor);

impl GetTypeMeta for Actor {
    fn get_type_meta() -> TypeMeta {
        TypeMeta::of::<Self>(TypeKind::Struct)
            .with_member(MemberInfo::field::<Self, String>("name", |a| &a.name, |a| &mut a.name))
            .with_member(
                MemberInfo::field::<Self, Vec<ObjRef>>("children", |a| &a.children, |a| {
                    &mut a.children
                })
                .content::<Actor>(),
            )
            .with_trait::<TypeTraitDefault>(FromType::<Self>::from_type())
            .with_trait::<TypeTraitCollectable>(FromType::<Self>::from_type())
    }

    fn register_dependencies(registry: &mut TypeRegistry) {
        registry.register::<Vec<ObjRef>>();
    }
}

// -----------------------------------------------------------------------------
// Converters

/// Degrees, written as `"21.5C"` by [`CelsiusConverter`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Celsius(pub f64);

impl_type_path!((in app::model) Celsius);
impl_reflect!(Celsius);

impl GetTypeMeta for Celsius {
    fn get_type_meta() -> TypeMeta {
        TypeMeta::of::<Self>(TypeKind::Struct)
            .with_member(MemberInfo::field::<Self, f64>("degrees", |c| &c.0, |c| &mut c.0))
            .with_trait::<TypeTraitDefault>(FromType::<Self>::from_type())
            .with_trait(TypeTraitConverter::specific::<CelsiusConverter>())
    }
}

#[derive(Default)]
pub struct CelsiusConverter;

impl Converter for CelsiusConverter {
    fn can_process(&self, meta: &TypeMeta) -> bool {
        meta.ty().is::<Celsius>()
    }

    fn encode(&self, _: &mut GraphSerializer, value: &dyn Reflect, _: &Declared) -> Encoded {
        match value.downcast_ref::<Celsius>() {
            Some(Celsius(degrees)) => Encoded::new(Value::from(format!("{degrees}C"))),
            None => Encoded::with(Value::Null, Outcome::fail("not a temperature")),
        }
    }

    fn decode(
        &self,
        _: &mut GraphSerializer,
        data: &Value,
        _: &Declared,
        slot: &mut dyn Reflect,
    ) -> Result<Outcome, GraphError> {
        let degrees = data
            .as_str()
            .and_then(|text| text.strip_suffix('C'))
            .and_then(|text| text.parse::<f64>().ok());
        Ok(match (degrees, slot.downcast_mut::<Celsius>()) {
            (Some(degrees), Some(slot)) => {
                slot.0 = degrees;
                Outcome::success()
            }
            _ => Outcome::fail("expected a temperature like `21.5C`"),
        })
    }
}

/// `raw` bypasses the converter annotated on [`Celsius`].
#[derive(Debug, Default, PartialEq)]
pub struct Thermometer {
    pub reading: Celsius,
    pub raw: Celsius,
}

impl_type_path!((in app::model) Thermometer);
impl_reflect!(Thermometer);

impl GetTypeMeta for Thermometer {
    fn get_type_meta() -> TypeMeta {
        TypeMeta::of::<Self>(TypeKind::Struct)
            .with_member(MemberInfo::field::<Self, Celsius>(
                "reading",
                |t| &t.reading,
                |t| &mut t.reading,
            ))
            .with_member(
                MemberInfo::field::<Self, Celsius>("raw", |t| &t.raw, |t| &mut t.raw)
                    .with_converter::<ReflectedConverter>(),
            )
            .with_trait::<TypeTraitDefault>(FromType::<Self>::from_type())
    }

    fn register_dependencies(registry: &mut TypeRegistry) {
        registry.register::<Celsius>();
    }
}

/// Written as its `inner` list.
#[derive(Debug, Default)]
pub struct Wrapper {
    pub inner: Vec<i32>,
    pub cache: i32,
}

impl_type_path!((in app::model) Wrapper);
impl_reflect!(Wrapper);

impl GetTypeMeta for Wrapper {
    fn get_type_meta() -> TypeMeta {
        TypeMeta::of::<Self>(TypeKind::Struct)
            .with_member(MemberInfo::field::<Self, Vec<i32>>(
                "inner",
                |w| &w.inner,
                |w| &mut w.inner,
            ))
            .with_member(
                MemberInfo::field::<Self, i32>("cache", |w| &w.cache, |w| &mut w.cache)
                    .with_flags(MemberFlags::IGNORE),
            )
            .with_trait::<TypeTraitDefault>(FromType::<Self>::from_type())
            .with_trait(TypeTraitForwardMember::new("inner"))
    }

    fn register_dependencies(registry: &mut TypeRegistry) {
        registry.register::<Vec<i32>>();
    }
}

/// A tracked node next to free-form data.
#[derive(Debug, Default)]
pub struct Annotated {
    pub node: ObjRef,
    pub raw: Value,
}

impl_type_path!((in app::model) Annotated);
impl_reflect!(Annotated);

impl GetTypeMeta for Annotated {
    fn get_type_meta() -> TypeMeta {
        TypeMeta::of::<Self>(TypeKind::Struct)
            .with_member(
                MemberInfo::field::<Self, ObjRef>("node", |a| &a.node, |a| &mut a.node)
                    .content::<Node>(),
            )
            .with_member(MemberInfo::field::<Self, Value>("raw", |a| &a.raw, |a| &mut a.raw))
            .with_trait::<TypeTraitDefault>(FromType::<Self>::from_type())
    }

    fn register_dependencies(registry: &mut TypeRegistry) {
        registry.register::<Node>();
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;

    use super::{Animal, Cat, ProfileV0, SettingsV1, Slot, register_all};
    use crate::info::Type;
    use crate::registry::TypeRegistry;
    use crate::Reflect;

    #[test]
    fn dependencies_are_registered() {
        let mut registry = TypeRegistry::new();
        register_all(&mut registry);
        for ty in [
            Type::of::<Animal>(),
            Type::of::<SettingsV1>(),
            Type::of::<Slot<i32>>(),
            Type::of::<ProfileV0>(),
        ] {
            assert!(registry.contains(ty.id()), "{ty}");
        }
        let boxed: Box<dyn Reflect> = Box::new(Cat::new("Tom", 9));
        assert_eq!(boxed.reflect_type().path(), "app::model::Cat");
    }
}
