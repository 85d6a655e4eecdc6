use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::any::TypeId;

use vc_utils::hash::HashMap;

use crate::info::{Type, parse_generic, strip_namespace};
use crate::registry::{TypeMeta, TypeRegistry};

// -----------------------------------------------------------------------------
// TypeResolver

/// Maps serialized type names back to registered types.
///
/// Lookups go through, in order:
///
/// 1. the cache of earlier exact lookups made with the same fallback flag;
/// 2. the type path index of the registry;
/// 3. generic reconstruction, see [`parse_generic`];
/// 4. former names declared with [`TypeMeta::with_former_name`];
/// 5. if allowed, a namespace-insensitive scan that must find exactly one
///    type assignable to the expected type.
///
/// Every result, including failures, is cached until [`clear`](Self::clear).
///
/// # Examples
///
/// ```
/// use vc_graph::info::Type;
/// use vc_graph::registry::{TypeRegistry, TypeResolver};
///
/// let mut registry = TypeRegistry::new();
/// registry.register::<Vec<i32>>();
///
/// let mut resolver = TypeResolver::new();
/// let ty = resolver.resolve(&registry, "alloc::vec::Vec`1[[i32, core]]", false, None);
/// assert_eq!(ty, Some(Type::of::<Vec<i32>>()));
///
/// let ty = resolver.resolve(&registry, "collections.Vec`1[i32]", true, None);
/// assert_eq!(ty, Some(Type::of::<Vec<i32>>()));
/// ```
#[derive(Default)]
pub struct TypeResolver {
    exact: HashMap<(String, bool), Option<Type>>,
    fallback: HashMap<(String, Option<TypeId>), Option<Type>>,
}

impl TypeResolver {
    #[inline]
    pub const fn new() -> Self {
        Self {
            exact: vc_utils::hash::new_map(),
            fallback: vc_utils::hash::new_map(),
        }
    }

    /// Forgets every cached lookup.
    pub fn clear(&mut self) {
        self.exact.clear();
        self.fallback.clear();
    }

    /// Resolves a serialized type name.
    ///
    /// `assignable_to` only constrains the namespace-insensitive fallback:
    /// exact matches are returned as they are, and the caller checks them.
    pub fn resolve(
        &mut self,
        registry: &TypeRegistry,
        name: &str,
        allow_namespace_fallback: bool,
        assignable_to: Option<Type>,
    ) -> Option<Type> {
        // Generic arguments may have been found through the fallback, so the
        // exact result depends on the flag too.
        let exact_key = (name.to_string(), allow_namespace_fallback);
        let found = match self.exact.get(&exact_key) {
            Some(cached) => *cached,
            None => {
                let found = self.resolve_exact(registry, name, allow_namespace_fallback);
                self.exact.insert(exact_key, found);
                found
            }
        };
        if found.is_some() || !allow_namespace_fallback {
            return found;
        }

        let key = (name.to_string(), assignable_to.map(|ty| ty.id()));
        if let Some(cached) = self.fallback.get(&key) {
            return *cached;
        }
        let found = self.resolve_fallback(registry, name, assignable_to);
        self.fallback.insert(key, found);
        found
    }

    fn resolve_exact(
        &mut self,
        registry: &TypeRegistry,
        name: &str,
        allow_namespace_fallback: bool,
    ) -> Option<Type> {
        let name = name.trim();
        if let Some(meta) = registry.get_with_type_path(name) {
            return Some(meta.ty());
        }

        if let Some(generic) = parse_generic(name) {
            let args = self.resolve_args(registry, &generic.args, allow_namespace_fallback)?;
            if let Some(ty) = registry.close_generic(generic.definition, &args) {
                return Some(ty);
            }
        }

        registry
            .iter()
            .find(|meta| meta.former_names().iter().any(|former| *former == name))
            .map(TypeMeta::ty)
    }

    fn resolve_args(
        &mut self,
        registry: &TypeRegistry,
        args: &[&str],
        allow_namespace_fallback: bool,
    ) -> Option<Vec<Type>> {
        args.iter()
            .map(|arg| self.resolve(registry, arg, allow_namespace_fallback, None))
            .collect()
    }

    fn resolve_fallback(
        &mut self,
        registry: &TypeRegistry,
        name: &str,
        assignable_to: Option<Type>,
    ) -> Option<Type> {
        let ident = strip_namespace(name);
        if ident.is_empty() {
            return None;
        }

        let assignable = |meta: &TypeMeta| {
            assignable_to.is_none_or(|target| registry.is_assignable(meta.ty(), target))
        };

        let candidates: Vec<Type> = match parse_generic(name) {
            Some(generic) => {
                let args = self.resolve_args(registry, &generic.args, true)?;
                registry
                    .iter()
                    .filter(|meta| {
                        meta.generics().is_some_and(|info| {
                            strip_namespace(info.definition()) == ident
                                && info.args() == args.as_slice()
                        })
                    })
                    .filter(|meta| assignable(meta))
                    .map(TypeMeta::ty)
                    .collect()
            }
            None => registry
                .iter()
                .filter(|meta| meta.generics().is_none() && meta.type_ident() == ident)
                .filter(|meta| assignable(meta))
                .map(TypeMeta::ty)
                .collect(),
        };

        match candidates.as_slice() {
            [ty] => {
                log::debug!("type `{name}` resolved to `{ty}` ignoring its namespace");
                Some(*ty)
            }
            [] => None,
            _ => {
                log::warn!(
                    "type `{name}` is ambiguous without its namespace, {} candidates",
                    candidates.len()
                );
                None
            }
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
