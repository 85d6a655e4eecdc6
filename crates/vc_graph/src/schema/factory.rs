use alloc::boxed::Box;
use alloc::string::String;
use core::fmt;

use crate::info::{Type, TypeFlags, TypeKind};
use crate::registry::{TypeMeta, TypeTraitDefault, TypeTraitHost, TypeTraitUninit};
use crate::{GraphError, Reflect};

// -----------------------------------------------------------------------------
// InstanceFactory

/// How fresh instances of a type are created during decoding.
///
/// Chosen once per type by [`InstanceFactory::select`], in this order:
///
/// 1. interfaces and abstract types cannot be constructed;
/// 2. types registering [`TypeTraitHost`] are created by the host;
/// 3. lists start empty;
/// 4. `String` starts empty;
/// 5. value types, types flagged `CONSTRUCT_UNINIT` and types without
///    [`TypeTraitDefault`] use their blank constructor, or `Default` if
///    they have none;
/// 6. everything else uses `Default`.
#[derive(Clone)]
pub enum InstanceFactory {
    /// Fails when invoked.
    CannotConstruct,
    Host(TypeTraitHost),
    EmptyList(Option<TypeTraitDefault>),
    EmptyString,
    /// Skips field defaults; every member must come from the data.
    Uninitialized(TypeTraitUninit),
    Default(Option<TypeTraitDefault>),
}

impl InstanceFactory {
    /// Picks the factory of a registered type.
    pub fn select(meta: &TypeMeta) -> Self {
        let default = meta.get_trait::<TypeTraitDefault>().cloned();

        if meta.flags().intersects(TypeFlags::INTERFACE | TypeFlags::ABSTRACT)
            || meta.kind() == TypeKind::Interface
        {
            return Self::CannotConstruct;
        }
        if let Some(host) = meta.get_trait::<TypeTraitHost>() {
            return Self::Host(host.clone());
        }
        if meta.kind().is_list() {
            return Self::EmptyList(default);
        }
        if meta.ty().is::<String>() {
            return Self::EmptyString;
        }
        let blank = meta
            .flags()
            .intersects(TypeFlags::VALUE_TYPE | TypeFlags::CONSTRUCT_UNINIT);
        if (blank || default.is_none())
            && let Some(uninit) = meta.get_trait::<TypeTraitUninit>()
        {
            return Self::Uninitialized(uninit.clone());
        }
        Self::Default(default)
    }

    /// Creates an instance of `ty`.
    pub fn create(&self, ty: Type) -> Result<Box<dyn Reflect>, GraphError> {
        match self {
            Self::Host(host) => Ok(host.create()),
            Self::EmptyList(Some(default)) | Self::Default(Some(default)) => Ok(default.default()),
            Self::EmptyString => Ok(Box::new(String::new())),
            Self::Uninitialized(uninit) => Ok(uninit.construct()),
            Self::CannotConstruct | Self::EmptyList(None) | Self::Default(None) => {
                Err(GraphError::CannotConstruct(ty.path()))
            }
        }
    }
}

impl fmt::Debug for InstanceFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CannotConstruct => "CannotConstruct",
            Self::Host(_) => "Host",
            Self::EmptyList(_) => "EmptyList",
            Self::EmptyString => "EmptyString",
            Self::Uninitialized(_) => "Uninitialized",
            Self::Default(Some(_)) => "Default",
            Self::Default(None) => "Default(null)",
        };
        f.write_str(name)
    }
}
