//! Predicates over debug-symbol source information.
//!
//! Source locations come from method sequence points. Types without debug
//! information match none of these predicates.

use std::collections::HashSet;

use arch_conform_core::metadata::{MethodDefinition, TypeDefinition, HIDDEN_LINE};
use arch_conform_core::{filter, predicate, FilterContext, FilterFn};
use tracing::trace;

use crate::pattern::compile;

/// Methods whose sequence points belong to `def`: its own methods, event
/// accessors, and the methods of compiler-generated nested types.
fn methods<'a>(ctx: &FilterContext<'a>, def: &'a TypeDefinition) -> Vec<&'a MethodDefinition> {
    let mut methods = Vec::new();
    let mut entered = HashSet::from([def.full_name()]);
    collect_methods(ctx, def, &mut entered, &mut methods);
    methods
}

fn collect_methods<'a>(
    ctx: &FilterContext<'a>,
    def: &'a TypeDefinition,
    entered: &mut HashSet<String>,
    methods: &mut Vec<&'a MethodDefinition>,
) {
    methods.extend(
        def.methods
            .iter()
            .chain(def.events.iter().flat_map(|e| e.accessors.iter())),
    );
    for nested_name in &def.nested_types {
        match ctx.provider.resolve_definition(nested_name) {
            Some(nested) if nested.is_compiler_generated() => {
                if entered.insert(nested.full_name()) {
                    collect_methods(ctx, nested, entered, methods);
                }
            }
            Some(_) => {}
            None => trace!("{}: unresolvable nested type {}", def.full_name(), nested_name),
        }
    }
}

fn documents<'a>(ctx: &FilterContext<'a>, def: &'a TypeDefinition) -> HashSet<&'a str> {
    methods(ctx, def)
        .into_iter()
        .flat_map(|m| m.sequence_points.iter())
        .map(|p| p.document.as_str())
        .collect()
}

fn file_name(document: &str) -> &str {
    document.rsplit(['/', '\\']).next().unwrap_or(document)
}

fn source_filter(pattern: String, name_only: bool) -> FilterFn {
    filter(move |ctx, set, input| {
        let re = compile(&pattern, ctx.options)?;
        Ok(input
            .into_iter()
            .filter(|&i| {
                ctx.definition(set[i].handle).is_some_and(|def| {
                    documents(ctx, def).into_iter().any(|doc| {
                        re.is_match(if name_only { file_name(doc) } else { doc })
                    })
                })
            })
            .collect())
    })
}

/// Types with code in a source file whose name matches `pattern`.
pub fn have_source_file_name_matching(pattern: impl Into<String>) -> FilterFn {
    source_filter(pattern.into(), true)
}

/// Types with code in a source file whose path matches `pattern`.
pub fn have_source_file_path_matching(pattern: impl Into<String>) -> FilterFn {
    source_filter(pattern.into(), false)
}

/// Distinct source lines attributed to a type, hidden sequence points excluded.
#[must_use]
pub fn lines_of_code(ctx: &FilterContext<'_>, def: &TypeDefinition) -> usize {
    methods(ctx, def)
        .into_iter()
        .flat_map(|m| m.sequence_points.iter())
        .filter(|p| p.line != HIDDEN_LINE)
        .map(|p| (p.document.as_str(), p.line))
        .collect::<HashSet<_>>()
        .len()
}

/// Types spanning more than `lines` distinct source lines.
#[must_use]
pub fn have_lines_of_code_greater_than(lines: usize) -> FilterFn {
    predicate(move |ctx, def| lines_of_code(ctx, def) > lines)
}
