use alloc::boxed::Box;
use alloc::rc::Rc;
use core::fmt;

use crate::convert::{Converter, ConverterChain};
use crate::info::Type;
use crate::migrate::ForwardMigration;
use crate::process::{CollectorStack, ObjectProcessor, ProcessorSet};
use crate::reference::ReferenceManager;
use crate::registry::{GetTypeMeta, TypeRegistry, TypeResolver};
use crate::schema::{SchemaCache, TypeSchema};
use crate::{ExternalReferences, GraphError, Reflect};

// -----------------------------------------------------------------------------
// SerializerConfig

/// Options of a [`GraphSerializer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerializerConfig {
    /// Resolve `$type` names by their short name when the full path is
    /// unknown, as long as exactly one registered type matches.
    pub allow_namespace_fallback: bool,
}

impl SerializerConfig {
    pub const DEFAULT: Self = Self {
        allow_namespace_fallback: true,
    };
}

impl Default for SerializerConfig {
    #[inline]
    fn default() -> Self {
        Self::DEFAULT
    }
}

// -----------------------------------------------------------------------------
// GraphSerializer

/// Converts object graphs to [`Value`] trees and back.
///
/// The serializer owns the caches derived from its [`TypeRegistry`]
/// (type name resolution, schemas, converters, processors) and the state
/// of the current call (reference ids, active collectors). The caches
/// live until [`invalidate`](Self::invalidate); the call state is cleared
/// after every top-level call.
///
/// A serializer is single-threaded. Use one per thread.
///
/// # Examples
///
/// ```
/// use vc_graph::{GraphSerializer, Value};
/// use vc_graph::info::Type;
///
/// let mut ser = GraphSerializer::new();
/// ser.register::<Vec<i32>>();
///
/// let encoded = ser.serialize(Type::of::<Vec<i32>>(), &vec![1, 2, 3]);
/// assert!(encoded.outcome.succeeded());
/// assert_eq!(encoded.value, Value::from(vec![Value::int(1), Value::int(2), Value::int(3)]));
///
/// let decoded = ser.deserialize(&encoded.value, Type::of::<Vec<i32>>()).unwrap();
/// assert_eq!(decoded.take::<Vec<i32>>(), Some(vec![1, 2, 3]));
/// ```
///
/// [`Value`]: crate::Value
pub struct GraphSerializer {
    pub(crate) registry: Rc<TypeRegistry>,
    pub(crate) config: SerializerConfig,
    resolver: TypeResolver,
    schemas: SchemaCache,
    pub(crate) converters: ConverterChain,
    pub(crate) processors: ProcessorSet,
    pub(crate) refs: ReferenceManager,
    pub(crate) collectors: CollectorStack,
    externals: Option<ExternalReferences>,
}

impl GraphSerializer {
    /// Creates a serializer over a registry of the built-in types.
    #[inline]
    pub fn new() -> Self {
        Self::with_registry(TypeRegistry::new())
    }

    pub fn with_registry(registry: TypeRegistry) -> Self {
        Self {
            registry: Rc::new(registry),
            config: SerializerConfig::DEFAULT,
            resolver: TypeResolver::new(),
            schemas: SchemaCache::new(),
            converters: ConverterChain::new(),
            processors: ProcessorSet::new(),
            refs: ReferenceManager::new(),
            collectors: CollectorStack::new(),
            externals: None,
        }
    }

    #[inline]
    pub fn with_config(mut self, config: SerializerConfig) -> Self {
        self.config = config;
        self
    }

    #[inline]
    pub fn config(&self) -> &SerializerConfig {
        &self.config
    }

    #[inline]
    pub fn config_mut(&mut self) -> &mut SerializerConfig {
        &mut self.config
    }

    // -------------------------------------------------------------------------
    // Registry

    #[inline]
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Mutable access to the registry; flushes every cache.
    pub fn registry_mut(&mut self) -> &mut TypeRegistry {
        self.invalidate();
        Rc::make_mut(&mut self.registry)
    }

    /// Registers `T` and its dependencies.
    #[inline]
    pub fn register<T: GetTypeMeta>(&mut self) {
        self.registry_mut().register::<T>();
    }

    /// A handle to the registry that does not borrow the serializer.
    #[inline]
    pub(crate) fn registry_handle(&self) -> Rc<TypeRegistry> {
        self.registry.clone()
    }

    /// Flushes every cache and clears the state of the current call.
    ///
    /// Call it when registrations change behind the serializer's back, and
    /// after a panic unwound through a call, which leaves the call state
    /// behind.
    pub fn invalidate(&mut self) {
        self.resolver.clear();
        self.schemas.clear();
        self.converters.clear_cache();
        self.processors.clear_cache();
        self.refs.reset();
        self.collectors.clear();
    }

    // -------------------------------------------------------------------------
    // Hooks

    /// Adds a converter, consulted before the built-in ones.
    pub fn add_converter(&mut self, converter: impl Converter) {
        self.converters.add_converter(Rc::new(converter));
    }

    /// Adds a processor, run after the ones already added.
    pub fn add_processor(&mut self, processor: impl ObjectProcessor) {
        self.processors.add(Rc::new(processor));
    }

    /// Sets the table external handles are written to and read from.
    #[inline]
    pub fn set_external_references(&mut self, table: ExternalReferences) {
        self.externals = Some(table);
    }

    #[inline]
    pub fn take_external_references(&mut self) -> Option<ExternalReferences> {
        self.externals.take()
    }

    #[inline]
    pub fn external_references(&self) -> Option<&ExternalReferences> {
        self.externals.as_ref()
    }

    #[inline]
    pub(crate) fn external_references_mut(&mut self) -> Option<&mut ExternalReferences> {
        self.externals.as_mut()
    }

    // -------------------------------------------------------------------------
    // Lookups

    /// Returns the converter of `ty`.
    pub fn converter_for(&mut self, ty: Type) -> Option<Rc<dyn Converter>> {
        self.converters.get(&self.registry, ty, None)
    }

    /// Returns the schema of `ty`, or `None` if it is not registered.
    pub fn schema_for(&mut self, ty: Type) -> Option<Rc<TypeSchema>> {
        self.schemas.get(&self.registry, ty)
    }

    /// Resolves a serialized type name.
    ///
    /// A name that resolves to a type not assignable to `assignable_to` is
    /// reported and treated as unresolved. Types with a [`ForwardMigration`]
    /// are assignable wherever their target is.
    pub fn resolve_type(&mut self, name: &str, assignable_to: Option<Type>) -> Option<Type> {
        let ty = self.resolver.resolve(
            &self.registry,
            name,
            self.config.allow_namespace_fallback,
            assignable_to,
        )?;
        match assignable_to {
            Some(target) if !self.is_assignable(ty, target) => {
                log::warn!("type `{ty}` named by `{name}` is not assignable to `{target}`");
                None
            }
            _ => Some(ty),
        }
    }

    fn is_assignable(&self, ty: Type, target: Type) -> bool {
        let registry = &*self.registry;
        registry.is_assignable(ty, target)
            || registry
                .get(ty.id())
                .and_then(|meta| meta.get_trait::<ForwardMigration>())
                .and_then(|forward| forward.resolve(registry, ty).ok())
                .is_some_and(|forwarded| registry.is_assignable(forwarded, target))
    }

    // -------------------------------------------------------------------------
    // Construction

    /// Creates a fresh instance of `ty` through its converter.
    pub fn create_instance(&mut self, ty: Type) -> Result<Box<dyn Reflect>, GraphError> {
        match self.converter_for(ty) {
            Some(converter) => converter.create_instance(self, ty),
            None => self.create_from_schema(ty),
        }
    }

    /// Creates a fresh instance of `ty` with the factory of its schema.
    pub fn create_from_schema(&mut self, ty: Type) -> Result<Box<dyn Reflect>, GraphError> {
        match self.schema_for(ty) {
            Some(schema) => schema.create_instance(),
            None => Err(GraphError::CannotConstruct(ty.path())),
        }
    }
}

impl Default for GraphSerializer {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for GraphSerializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphSerializer")
            .field("registry", &self.registry.len())
            .field("config", &self.config)
            .field("converters", &self.converters)
            .field("processors", &self.processors)
            .field("refs", &self.refs)
            .finish()
    }
}
