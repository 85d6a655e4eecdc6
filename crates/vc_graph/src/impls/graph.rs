use crate::info::TypeKind;
use crate::registry::{FromType, GetTypeMeta, TypeMeta, TypeTraitDefault};
use crate::{ExternalRef, ObjRef, Value};

crate::impl_type_path!((in vc_graph) Value);
crate::impl_reflect!(Value);

impl GetTypeMeta for Value {
    fn get_type_meta() -> TypeMeta {
        TypeMeta::of::<Self>(TypeKind::Primitive)
            .with_trait::<TypeTraitDefault>(FromType::<Self>::from_type())
    }
}

/// Fresh handles are null; the shared converter fills them.
impl GetTypeMeta for ObjRef {
    fn get_type_meta() -> TypeMeta {
        TypeMeta::of::<Self>(TypeKind::Shared)
            .with_trait::<TypeTraitDefault>(FromType::<Self>::from_type())
    }
}

impl GetTypeMeta for ExternalRef {
    fn get_type_meta() -> TypeMeta {
        TypeMeta::of::<Self>(TypeKind::External)
            .with_trait::<TypeTraitDefault>(FromType::<Self>::from_type())
    }
}
