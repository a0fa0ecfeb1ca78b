//! Dependency-search filters.
//!
//! Each filter builds one [`NamespaceSearchTree`] per run and walks every
//! candidate with a fresh [`DependencyStrategy`]. The verdict and its witness
//! are written back to the candidate record before the filter keeps or drops
//! it.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::search_tree::NamespaceSearchTree;
use crate::sequence::{filter, CandidateSet, FilterContext, FilterFn, RuleError};
use crate::strategy::{CheckKind, DependencyStrategy};
use crate::walker::TypeCheckingContext;

/// Builds a filter keeping candidates that pass a dependency check.
///
/// The filter fails with [`RuleError::NoTargets`] when `targets` holds no
/// usable target.
pub fn dependency_filter<I, S>(kind: CheckKind, targets: I) -> FilterFn
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let targets: Vec<String> = targets.into_iter().map(Into::into).collect();
    filter(move |ctx, set, input| {
        let tree = NamespaceSearchTree::build(&targets, ctx.options.case_sensitive);
        if tree.terminal_count() == 0 {
            return Err(RuleError::NoTargets { kind });
        }
        debug!(
            "Dependency check {} against {} target(s) for {} type(s)",
            kind,
            tree.terminal_count(),
            input.len()
        );
        if kind == CheckKind::UsedBy {
            Ok(search_used_by(ctx, &tree, set, input))
        } else {
            Ok(search(ctx, kind, &tree, set, input))
        }
    })
}

fn search(
    ctx: &FilterContext<'_>,
    kind: CheckKind,
    tree: &NamespaceSearchTree,
    set: &mut CandidateSet,
    input: Vec<usize>,
) -> Vec<usize> {
    let walker = TypeCheckingContext::new(ctx.provider, ctx.options);
    let mut kept = Vec::with_capacity(input.len());

    for index in input {
        let Some(definition) = ctx.definition(set[index].handle) else {
            warn!("Skipping unresolvable candidate {}", set[index].handle);
            set[index].is_passing = false;
            set[index].explanation = None;
            continue;
        };
        let mut strategy = DependencyStrategy::new(kind, tree);
        walker.check(definition, &mut strategy);

        let record = &mut set[index];
        record.is_passing = strategy.passes();
        record.explanation = strategy.explanation();
        if record.is_passing {
            kept.push(index);
        }
    }

    kept
}

/// Keeps candidates referenced by at least one type whose name matches the
/// targets. The users are drawn from the whole provider, not the candidates.
fn search_used_by(
    ctx: &FilterContext<'_>,
    tree: &NamespaceSearchTree,
    set: &mut CandidateSet,
    input: Vec<usize>,
) -> Vec<usize> {
    let walker = TypeCheckingContext::new(ctx.provider, ctx.options);
    let fold = |name: &str| {
        if ctx.options.case_sensitive {
            name.to_string()
        } else {
            name.to_lowercase()
        }
    };

    let mut users_of: HashMap<String, String> = HashMap::new();
    for handle in ctx.provider.handles() {
        let Some(user) = ctx.definition(handle) else {
            continue;
        };
        let user_name = user.full_name();
        if !tree.matches(&user_name) {
            continue;
        }
        let mut strategy = DependencyStrategy::new(CheckKind::UsedBy, tree);
        walker.check(user, &mut strategy);
        let own = fold(&user_name);
        for referenced in strategy.referenced() {
            let key = fold(referenced);
            if key != own {
                users_of.entry(key).or_insert_with(|| user_name.clone());
            }
        }
    }

    let mut kept = Vec::with_capacity(input.len());
    for index in input {
        let Some(definition) = ctx.definition(set[index].handle) else {
            warn!("Skipping unresolvable candidate {}", set[index].handle);
            set[index].is_passing = false;
            set[index].explanation = None;
            continue;
        };
        let user = users_of.get(&fold(&definition.full_name()));
        let record = &mut set[index];
        record.is_passing = user.is_some();
        record.explanation = user.map(|u| format!("is used by {u}"));
        if record.is_passing {
            kept.push(index);
        }
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CheckOptions;
    use crate::metadata::{
        FieldDefinition, MetadataProvider, TypeDefinition, TypeHandle, TypeKind, TypeModel, TypeRef,
    };
    use crate::sequence::{evaluate, FunctionSequence, Polarity};

    fn field(name: &str, ty: &str) -> FieldDefinition {
        FieldDefinition::new(name, TypeRef::parse(ty).unwrap())
    }

    fn model() -> TypeModel {
        TypeModel::new([
            TypeDefinition::new("App.Core", "Empty", TypeKind::Class),
            TypeDefinition::new("App.Core", "OnlyX", TypeKind::Class).with_field(field("x", "X.A")),
            TypeDefinition::new("App.Core", "Both", TypeKind::Class)
                .with_field(field("x", "X.A"))
                .with_field(field("y", "Y.B")),
            TypeDefinition::new("App.Core", "XAndZ", TypeKind::Class)
                .with_field(field("x", "X.A"))
                .with_field(field("z", "Z.C")),
            TypeDefinition::new("X", "A", TypeKind::Class),
            TypeDefinition::new("App.Web", "Controller", TypeKind::Class)
                .with_field(field("both", "App.Core.Both")),
        ])
    }

    fn check(model: &TypeModel, name: &str, kind: CheckKind, targets: &[&str]) -> (bool, Option<String>) {
        let ctx = FilterContext::new(model, CheckOptions::default());
        let handle = model.resolve(name).unwrap();
        let mut set = CandidateSet::new([handle]);
        let kept = dependency_filter(kind, targets.iter().copied())(&ctx, &mut set, vec![0]).unwrap();
        assert_eq!(kept.is_empty(), !set[0].is_passing);
        (set[0].is_passing, set[0].explanation.clone())
    }

    #[test]
    fn unresolvable_candidate_clears_previous_verdict() {
        let model = model();
        let ctx = FilterContext::new(&model, CheckOptions::default());
        for kind in [CheckKind::AnyOf, CheckKind::UsedBy] {
            let mut set = CandidateSet::new([TypeHandle(usize::MAX)]);
            set[0].is_passing = true;
            set[0].explanation = Some("stale".into());
            let kept = dependency_filter(kind, ["X"])(&ctx, &mut set, vec![0]).unwrap();
            assert!(kept.is_empty());
            assert!(!set[0].is_passing);
            assert_eq!(set[0].explanation, None);
        }
    }

    #[test]
    fn empty_type_fails_any_of() {
        assert!(!check(&model(), "App.Core.Empty", CheckKind::AnyOf, &["X"]).0);
    }

    #[test]
    fn all_of_names_missing_targets() {
        let model = model();
        let (passes, why) = check(&model, "App.Core.OnlyX", CheckKind::AllOf, &["X", "Y"]);
        assert!(!passes);
        assert_eq!(why.as_deref(), Some("has no dependency on Y"));
        assert!(check(&model, "App.Core.Both", CheckKind::AllOf, &["X", "Y"]).0);
    }

    #[test]
    fn only_any_or_none_reports_the_outsider() {
        let (passes, why) = check(&model(), "App.Core.XAndZ", CheckKind::OnlyAnyOrNone, &["X"]);
        assert!(!passes);
        assert!(why.unwrap().contains("Z.C"));
    }

    #[test]
    fn used_by_draws_users_from_the_whole_model() {
        let model = model();
        let (passes, why) = check(&model, "App.Core.Both", CheckKind::UsedBy, &["App.Web"]);
        assert!(passes);
        assert_eq!(why.as_deref(), Some("is used by App.Web.Controller"));
        assert!(!check(&model, "App.Core.OnlyX", CheckKind::UsedBy, &["App.Web"]).0);
        assert!(check(&model, "X.A", CheckKind::UsedBy, &["App.Core"]).0);
    }

    #[test]
    fn empty_targets_are_rejected() {
        let model = model();
        let ctx = FilterContext::new(&model, CheckOptions::default());
        let mut set = CandidateSet::all(&model);
        for kind in [CheckKind::AnyOf, CheckKind::OnlyAll, CheckKind::UsedBy] {
            let err = dependency_filter(kind, Vec::<String>::new())(&ctx, &mut set, vec![0]).unwrap_err();
            assert!(matches!(err, RuleError::NoTargets { kind: k } if k == kind));
        }
    }

    #[test]
    fn should_not_depend_reports_witnesses() {
        let model = model();
        let ctx = FilterContext::new(&model, CheckOptions::default());
        let mut seq = FunctionSequence::new();
        seq.add_filter(dependency_filter(CheckKind::AnyOf, ["Z"]));

        let core: Vec<_> = model
            .iter()
            .filter(|(_, d)| d.namespace == "App.Core")
            .map(|(h, _)| h)
            .collect();
        let mut set = CandidateSet::new(core);
        let result = evaluate(&ctx, &mut set, &seq, Polarity::ShouldNot).unwrap();
        assert!(!result.is_successful);
        assert_eq!(result.failing_names(), vec!["App.Core.XAndZ"]);
        assert_eq!(
            result.failing_types[0].explanation.as_deref(),
            Some("has a dependency on Z.C")
        );
    }
}
