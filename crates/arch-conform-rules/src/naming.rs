//! Name and namespace predicates.
//!
//! Simple names are the innermost name of a type (`Line` for `Order/Line`);
//! nested types report the namespace of their outermost declaring type.

use arch_conform_core::{filter, predicate, FilterFn};

use crate::pattern::{compile, fold, is_within};

/// Types whose simple name equals `name`.
pub fn have_name(name: impl Into<String>) -> FilterFn {
    let name = name.into();
    predicate(move |ctx, def| ctx.names_equal(def.simple_name(), &name))
}

/// Types whose simple name starts with `prefix`.
pub fn have_name_starting_with(prefix: impl Into<String>) -> FilterFn {
    let prefix = prefix.into();
    predicate(move |ctx, def| {
        fold(def.simple_name(), ctx.options).starts_with(fold(&prefix, ctx.options).as_ref())
    })
}

/// Types whose simple name ends with `suffix`.
pub fn have_name_ending_with(suffix: impl Into<String>) -> FilterFn {
    let suffix = suffix.into();
    predicate(move |ctx, def| {
        fold(def.simple_name(), ctx.options).ends_with(fold(&suffix, ctx.options).as_ref())
    })
}

/// Types whose simple name matches a regular expression.
pub fn have_name_matching(pattern: impl Into<String>) -> FilterFn {
    let pattern = pattern.into();
    filter(move |ctx, set, input| {
        let re = compile(&pattern, ctx.options)?;
        Ok(input
            .into_iter()
            .filter(|&i| {
                ctx.definition(set[i].handle)
                    .is_some_and(|def| re.is_match(def.simple_name()))
            })
            .collect())
    })
}

/// Types whose full name (`Namespace.Outer/Inner`) equals `full_name`.
pub fn have_full_name(full_name: impl Into<String>) -> FilterFn {
    let full_name = full_name.into();
    predicate(move |ctx, def| ctx.names_equal(&def.full_name(), &full_name))
}

/// Types in `namespace` or any namespace below it.
pub fn reside_in_namespace(namespace: impl Into<String>) -> FilterFn {
    let namespace = namespace.into();
    predicate(move |ctx, def| is_within(&def.namespace, &namespace, ctx.options))
}

/// Types whose namespace matches a regular expression.
pub fn reside_in_namespace_matching(pattern: impl Into<String>) -> FilterFn {
    let pattern = pattern.into();
    filter(move |ctx, set, input| {
        let re = compile(&pattern, ctx.options)?;
        Ok(input
            .into_iter()
            .filter(|&i| {
                ctx.definition(set[i].handle)
                    .is_some_and(|def| re.is_match(&def.namespace))
            })
            .collect())
    })
}

/// Types declared directly in `namespace`.
pub fn reside_in_namespace_exactly(namespace: impl Into<String>) -> FilterFn {
    let namespace = namespace.into();
    predicate(move |ctx, def| ctx.names_equal(&def.namespace, &namespace))
}
