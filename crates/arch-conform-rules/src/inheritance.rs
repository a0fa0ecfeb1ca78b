//! Inheritance, interface and attribute predicates.
//!
//! Base chains are followed through the provider for as long as each base
//! resolves; a base declared outside the loaded metadata ends the chain.

use std::collections::HashSet;

use arch_conform_core::metadata::TypeDefinition;
use arch_conform_core::{predicate, FilterContext, FilterFn};

/// Iterates over the resolvable base definitions of `def`, nearest first.
fn base_chain<'a>(
    ctx: &FilterContext<'a>,
    def: &'a TypeDefinition,
) -> impl Iterator<Item = &'a TypeDefinition> + 'a {
    let provider = ctx.provider;
    let mut seen = HashSet::new();
    let mut current = def;
    std::iter::from_fn(move || {
        let base = current.base.as_ref()?.element_full_name()?;
        if !seen.insert(base.clone()) {
            return None;
        }
        current = provider.resolve_definition(&base)?;
        Some(current)
    })
}

/// Base type names of `def`, nearest first, including the first unresolvable one.
fn base_names<'a>(ctx: &FilterContext<'a>, def: &'a TypeDefinition) -> Vec<String> {
    let mut names: Vec<String> = def.base.iter().filter_map(|b| b.element_full_name()).collect();
    for base in base_chain(ctx, def) {
        names.extend(base.base.iter().filter_map(|b| b.element_full_name()));
    }
    names
}

/// Types deriving from `base`, directly or through resolvable intermediates.
///
/// Generic bases compare by their open definition (``App.Repository`1``).
pub fn inherit(base: impl Into<String>) -> FilterFn {
    let base = base.into();
    predicate(move |ctx, def| {
        base_names(ctx, def)
            .iter()
            .any(|name| ctx.names_equal(name, &base))
    })
}

/// Types implementing `interface`, declared on the type or a resolvable base.
///
/// Generic interfaces compare by their open definition, so
/// ``System.IEquatable`1`` matches every instantiation.
pub fn implement_interface(interface: impl Into<String>) -> FilterFn {
    let interface = interface.into();
    predicate(move |ctx, def| {
        std::iter::once(def)
            .chain(base_chain(ctx, def))
            .flat_map(|d| d.interfaces.iter())
            .filter_map(|i| i.element_full_name())
            .any(|name| ctx.names_equal(&name, &interface))
    })
}

/// Types carrying the attribute `attribute` (full name).
pub fn have_custom_attribute(attribute: impl Into<String>) -> FilterFn {
    let attribute = attribute.into();
    predicate(move |ctx, def| def.has_attribute(&attribute, ctx.options.case_sensitive))
}

/// Types carrying `attribute` themselves or on a resolvable base.
pub fn have_custom_attribute_or_inherit(attribute: impl Into<String>) -> FilterFn {
    let attribute = attribute.into();
    predicate(move |ctx, def| {
        let case_sensitive = ctx.options.case_sensitive;
        def.has_attribute(&attribute, case_sensitive)
            || base_chain(ctx, def).any(|b| b.has_attribute(&attribute, case_sensitive))
    })
}
