use crate::info::TypePath;

/// Builds a [`TypeTrait`] capturing the functions of `T`.
///
/// # Example
///
/// ```
/// use vc_graph::registry::{FromType, TypeMeta, TypeTraitDefault};
/// use vc_graph::info::TypeKind;
///
/// let mut meta = TypeMeta::of::<String>(TypeKind::Primitive);
/// meta.insert_trait::<TypeTraitDefault>(FromType::<String>::from_type());
///
/// let s = meta.get_trait::<TypeTraitDefault>().unwrap().default();
/// assert_eq!(s.take::<String>().unwrap(), "");
/// ```
///
/// [`TypeTrait`]: crate::registry::TypeTrait
pub trait FromType<T: TypePath> {
    fn from_type() -> Self;
}
