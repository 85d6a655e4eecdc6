use alloc::string::String;

use crate::info::{TypeFlags, TypeKind};
use crate::registry::{FromType, GetTypeMeta, TypeMeta, TypeTraitDefault};

macro_rules! impl_native {
    ($($ty:ident),+ $(,)?) => {$(
        crate::impl_type_path!($ty);
        crate::impl_reflect!($ty);

        impl GetTypeMeta for $ty {
            fn get_type_meta() -> TypeMeta {
                TypeMeta::of::<Self>(TypeKind::Primitive)
                    .with_flags(TypeFlags::VALUE_TYPE)
                    .with_trait::<TypeTraitDefault>(FromType::<Self>::from_type())
            }
        }
    )+};
}

impl_native!(bool, char);
impl_native!(u8, u16, u32, u64, usize);
impl_native!(i8, i16, i32, i64, isize);
impl_native!(f32, f64);

crate::impl_type_path!((in alloc::string) String);
crate::impl_reflect!(String);

impl GetTypeMeta for String {
    fn get_type_meta() -> TypeMeta {
        TypeMeta::of::<Self>(TypeKind::Primitive)
            .with_trait::<TypeTraitDefault>(FromType::<Self>::from_type())
    }
}
