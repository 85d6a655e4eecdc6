use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use vc_utils::TypeIdMap;

use crate::convert::{Converter, ConverterOverride, ExternalConverter, ForwardConverter};
use crate::convert::{ListConverter, MapConverter, OptionConverter, ReflectedConverter};
use crate::convert::{Scalar, ScalarConverter, SharedConverter};
use crate::info::Type;
use crate::registry::{TypeRegistry, TypeTraitConverter, TypeTraitForwardMember};
use crate::Value;

// -----------------------------------------------------------------------------
// ConverterChain

/// Priority-ordered converter lookup.
///
/// For a type, the first of these wins:
///
/// 1. the converter named by the caller, usually a member annotation;
/// 2. the exact-type map, holding the scalar converters;
/// 3. the type's [`TypeTraitConverter`] annotation;
/// 4. the type's [`TypeTraitForwardMember`] annotation;
/// 5. the first converter of the general list accepting the type.
///
/// Results of steps 2 to 5 are cached per type, misses included.
///
/// # Examples
///
/// ```
/// use vc_graph::convert::ConverterChain;
/// use vc_graph::info::Type;
/// use vc_graph::registry::TypeRegistry;
///
/// let registry = TypeRegistry::new();
/// let mut chain = ConverterChain::new();
///
/// assert!(chain.get(&registry, Type::of::<i32>(), None).is_some());
/// ```
pub struct ConverterChain {
    exact: TypeIdMap<Rc<dyn Converter>>,
    overrides: TypeIdMap<Rc<dyn Converter>>,
    general: Vec<Rc<dyn Converter>>,
    reflected: Rc<dyn Converter>,
    cache: TypeIdMap<Option<Rc<dyn Converter>>>,
}

impl ConverterChain {
    /// Creates a chain with the built-in converters.
    pub fn new() -> Self {
        let reflected: Rc<dyn Converter> = Rc::new(ReflectedConverter);
        let mut chain = Self {
            exact: TypeIdMap::new(),
            overrides: TypeIdMap::new(),
            general: Vec::new(),
            reflected: reflected.clone(),
            cache: TypeIdMap::new(),
        };

        macro_rules! exact {
            ($($ty:ty),+) => {$(
                chain.insert_scalar::<$ty>();
            )+};
        }
        exact!(bool, char, u8, u16, u32, u64, usize, i8, i16, i32, i64, isize, f32, f64);
        exact!(String, Value);

        chain.general = alloc::vec![
            Rc::new(ExternalConverter) as Rc<dyn Converter>,
            Rc::new(SharedConverter),
            Rc::new(OptionConverter),
            Rc::new(ListConverter),
            Rc::new(MapConverter),
            reflected,
        ];
        chain
    }

    fn insert_scalar<T: Scalar>(&mut self) {
        self.exact
            .insert_type::<T>(Rc::new(ScalarConverter::<T>::new()));
    }

    /// Adds a converter in front of the general list.
    ///
    /// The exact-type map still takes precedence.
    pub fn add_converter(&mut self, converter: Rc<dyn Converter>) {
        self.general.insert(0, converter);
        self.cache.clear();
    }

    /// Forgets every cached lookup.
    #[inline]
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Returns the converter of `ty`, or `None` if nothing handles it.
    ///
    /// `None` is also returned for unregistered types that have no exact
    /// converter.
    pub fn get(
        &mut self,
        registry: &TypeRegistry,
        ty: Type,
        over: Option<&ConverterOverride>,
    ) -> Option<Rc<dyn Converter>> {
        if let Some(over) = over {
            let converter = self.overrides.get_or_insert(over.id(), || over.make());
            return Some(converter.clone());
        }
        if let Some(cached) = self.cache.get(&ty.id()) {
            return cached.clone();
        }

        let found = self.lookup(registry, ty);
        if found.is_none() {
            log::debug!("no converter accepts `{ty}`");
        }
        self.cache.insert(ty.id(), found.clone());
        found
    }

    fn lookup(&mut self, registry: &TypeRegistry, ty: Type) -> Option<Rc<dyn Converter>> {
        if let Some(converter) = self.exact.get(&ty.id()) {
            return Some(converter.clone());
        }
        let meta = registry.get(ty.id())?;

        match meta.get_trait::<TypeTraitConverter>() {
            Some(TypeTraitConverter::Specific(over)) => {
                let converter = self.overrides.get_or_insert(over.id(), || over.make());
                return Some(converter.clone());
            }
            Some(TypeTraitConverter::Reflected) => return Some(self.reflected.clone()),
            None => {}
        }
        if let Some(forward) = meta.get_trait::<TypeTraitForwardMember>() {
            return Some(Rc::new(ForwardConverter::new(forward.member())));
        }

        self.general
            .iter()
            .find(|converter| converter.can_process(meta))
            .cloned()
    }
}

impl Default for ConverterChain {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ConverterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterChain")
            .field("exact", &self.exact.len())
            .field("general", &self.general.len())
            .field("cached", &self.cache.len())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::string::String;
    use alloc::vec::Vec;

    use super::ConverterChain;
    use crate::convert::{Converter, ConverterOverride};
    use crate::fixtures::{Cat, Celsius, CelsiusConverter, Wrapper, register_all};
    use crate::info::Type;
    use crate::registry::{TypeMeta, TypeRegistry};
    use crate::{Declared, Encoded, GraphSerializer, ObjRef, Reflect, Value};

    fn same(a: &Rc<dyn Converter>, b: &Rc<dyn Converter>) -> bool {
        core::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
    }

    /// Accepts every type, to check what it can shadow.
    #[derive(Default)]
    struct Greedy;

    impl Converter for Greedy {
        fn can_process(&self, _: &TypeMeta) -> bool {
            true
        }

        fn encode(&self, _: &mut GraphSerializer, _: &dyn Reflect, _: &Declared) -> Encoded {
            Encoded::new(Value::from("greedy"))
        }

        fn decode(
            &self,
            _: &mut GraphSerializer,
            _: &Value,
            _: &Declared,
            _: &mut dyn Reflect,
        ) -> Result<crate::Outcome, crate::GraphError> {
            Ok(crate::Outcome::success())
        }
    }

    #[test]
    fn builtins_cover_registered_kinds() {
        let mut registry = TypeRegistry::new();
        register_all(&mut registry);
        let mut chain = ConverterChain::new();

        for ty in [
            Type::of::<i32>(),
            Type::of::<String>(),
            Type::of::<Value>(),
            Type::of::<Cat>(),
            Type::of::<ObjRef>(),
            Type::of::<Vec<Cat>>(),
            Type::of::<Option<Cat>>(),
        ] {
            assert!(chain.get(&registry, ty, None).is_some(), "{ty}");
        }
    }

    #[test]
    fn unregistered_types_have_no_converter() {
        let registry = TypeRegistry::new();
        let mut chain = ConverterChain::new();
        assert!(chain.get(&registry, Type::of::<Cat>(), None).is_none());
    }

    #[test]
    fn added_converters_shadow_the_list_but_not_exact_types() {
        let mut registry = TypeRegistry::new();
        register_all(&mut registry);
        let mut chain = ConverterChain::new();

        let before = chain.get(&registry, Type::of::<Cat>(), None).unwrap();
        let greedy: Rc<dyn Converter> = Rc::new(Greedy);
        chain.add_converter(greedy.clone());

        let after = chain.get(&registry, Type::of::<Cat>(), None).unwrap();
        assert!(!same(&before, &after));
        assert!(same(&after, &greedy));

        let int = chain.get(&registry, Type::of::<i32>(), None).unwrap();
        assert!(!same(&int, &greedy));
    }

    #[test]
    fn override_wins_and_is_shared() {
        let mut registry = TypeRegistry::new();
        register_all(&mut registry);
        let mut chain = ConverterChain::new();

        let over = ConverterOverride::of::<Greedy>();
        let a = chain.get(&registry, Type::of::<i32>(), Some(&over)).unwrap();
        let b = chain.get(&registry, Type::of::<Cat>(), Some(&over)).unwrap();
        assert!(same(&a, &b));

        let plain = chain.get(&registry, Type::of::<i32>(), None).unwrap();
        assert!(!same(&a, &plain));
    }

    #[test]
    fn type_annotations_come_before_the_list() {
        let mut registry = TypeRegistry::new();
        register_all(&mut registry);
        let mut chain = ConverterChain::new();
        chain.add_converter(Rc::new(Greedy));

        // `Celsius` names its converter, `Wrapper` forwards to a member.
        let celsius = chain.get(&registry, Type::of::<Celsius>(), None).unwrap();
        let named = chain
            .get(&registry, Type::of::<i32>(), Some(&ConverterOverride::of::<CelsiusConverter>()))
            .unwrap();
        assert!(same(&celsius, &named));

        let meta = registry.get(Type::of::<Wrapper>().id()).unwrap();
        let wrapper = chain.get(&registry, Type::of::<Wrapper>(), None).unwrap();
        assert!(wrapper.can_process(meta));
        assert!(!wrapper.request_inheritance_support(meta));
    }
}
