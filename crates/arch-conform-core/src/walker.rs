//! The metadata walker feeding type references to a [`DependencyStrategy`].
//!
//! Visitation order is fixed: base type, type attributes, interfaces, generic
//! constraints, fields, properties, events, then methods in three passes
//! (headers, locals, instructions), then compiler-generated nested types.
//! The strategy is asked after every step whether it already knows its
//! answer; instruction scanning is the most expensive step and comes last.
//!
//! Recursion only follows the structure of a reference (generic arguments,
//! array and pointer element types). A referenced type's own members are
//! never expanded, so cyclic type graphs terminate without a visited set.
//! Nested types are the exception: each is entered at most once per walk, so
//! a dump whose nesting loops back on itself still terminates.

use std::collections::HashSet;

use tracing::trace;

use crate::config::CheckOptions;
use crate::metadata::{
    Attribute, GenericParameter, MetadataProvider, MethodDefinition, Operand, TypeDefinition,
    TypeName, TypeRef,
};
use crate::strategy::DependencyStrategy;

/// Walks the metadata of one type at a time.
pub struct TypeCheckingContext<'m> {
    provider: &'m dyn MetadataProvider,
    options: CheckOptions,
}

/// Signals that the strategy asked to stop.
struct Finished;

type Step = Result<(), Finished>;

impl<'m> TypeCheckingContext<'m> {
    /// Creates a walker over a provider.
    #[must_use]
    pub fn new(provider: &'m dyn MetadataProvider, options: CheckOptions) -> Self {
        Self { provider, options }
    }

    /// Feeds every reference reachable from `definition` into `strategy`.
    pub fn check(&self, definition: &TypeDefinition, strategy: &mut DependencyStrategy<'_>) {
        let current = definition.full_name();
        let mut entered = HashSet::from([current.clone()]);
        if self.walk(definition, &current, &mut entered, strategy).is_err() {
            trace!("{}: finished early ({})", current, strategy.kind());
        }
    }

    fn walk(
        &self,
        definition: &TypeDefinition,
        current: &str,
        entered: &mut HashSet<String>,
        strategy: &mut DependencyStrategy<'_>,
    ) -> Step {
        if let Some(base) = &definition.base {
            self.visit_type_ref(base, strategy);
        }
        Self::checkpoint(strategy)?;

        self.visit_attributes(&definition.attributes, strategy);
        Self::checkpoint(strategy)?;

        for interface in &definition.interfaces {
            self.visit_type_ref(interface, strategy);
        }
        Self::checkpoint(strategy)?;

        self.visit_generic_parameters(&definition.generic_parameters, strategy);
        Self::checkpoint(strategy)?;

        for field in &definition.fields {
            self.visit_attributes(&field.attributes, strategy);
            self.visit_type_ref(&field.field_type, strategy);
            if self.options.search_field_constants && field.is_literal {
                if let Some(text) = field.constant.as_ref().and_then(|c| c.as_str()) {
                    Self::visit_constant_text(text, strategy);
                }
            }
        }
        Self::checkpoint(strategy)?;

        for property in &definition.properties {
            self.visit_attributes(&property.attributes, strategy);
            self.visit_type_ref(&property.property_type, strategy);
        }
        Self::checkpoint(strategy)?;

        for event in &definition.events {
            self.visit_attributes(&event.attributes, strategy);
            self.visit_type_ref(&event.event_type, strategy);
            for accessor in &event.accessors {
                self.visit_method_header(accessor, strategy);
                self.visit_method_locals(accessor, strategy);
                self.visit_method_instructions(accessor, current, strategy);
            }
        }
        Self::checkpoint(strategy)?;

        for method in &definition.methods {
            self.visit_method_header(method, strategy);
            Self::checkpoint(strategy)?;
        }
        for method in &definition.methods {
            self.visit_method_locals(method, strategy);
            Self::checkpoint(strategy)?;
        }
        for method in &definition.methods {
            self.visit_method_instructions(method, current, strategy);
            Self::checkpoint(strategy)?;
        }

        for nested_name in &definition.nested_types {
            let Some(nested) = self.provider.resolve_definition(nested_name) else {
                trace!("{}: unresolvable nested type {}", current, nested_name);
                continue;
            };
            if !nested.is_compiler_generated() {
                continue;
            }
            if !entered.insert(nested.full_name()) {
                trace!("{}: nested type {} already walked", current, nested_name);
                continue;
            }
            self.walk(nested, current, entered, strategy)?;
        }

        Ok(())
    }

    fn checkpoint(strategy: &DependencyStrategy<'_>) -> Step {
        if strategy.can_finish_early() {
            Err(Finished)
        } else {
            Ok(())
        }
    }

    fn visit_attributes(&self, attributes: &[Attribute], strategy: &mut DependencyStrategy<'_>) {
        for attribute in attributes {
            self.visit_type_ref(&attribute.attribute_type, strategy);
            for argument in &attribute.type_arguments {
                self.visit_type_ref(argument, strategy);
            }
        }
    }

    fn visit_generic_parameters(
        &self,
        parameters: &[GenericParameter],
        strategy: &mut DependencyStrategy<'_>,
    ) {
        for parameter in parameters {
            for constraint in &parameter.constraints {
                self.visit_type_ref(constraint, strategy);
            }
        }
    }

    fn visit_method_header(&self, method: &MethodDefinition, strategy: &mut DependencyStrategy<'_>) {
        self.visit_attributes(&method.attributes, strategy);
        self.visit_generic_parameters(&method.generic_parameters, strategy);
        if let Some(return_type) = &method.return_type {
            self.visit_type_ref(return_type, strategy);
        }
        for parameter in &method.parameters {
            self.visit_attributes(&parameter.attributes, strategy);
            self.visit_type_ref(&parameter.parameter_type, strategy);
        }
    }

    fn visit_method_locals(&self, method: &MethodDefinition, strategy: &mut DependencyStrategy<'_>) {
        for local in &method.locals {
            self.visit_type_ref(local, strategy);
        }
    }

    fn visit_method_instructions(
        &self,
        method: &MethodDefinition,
        current: &str,
        strategy: &mut DependencyStrategy<'_>,
    ) {
        for operand in method.instructions.iter().filter_map(|i| i.operand.as_ref()) {
            match operand {
                Operand::Type { type_ref } => self.visit_type_ref(type_ref, strategy),
                Operand::Field {
                    declaring_type,
                    field_type,
                    ..
                } => {
                    if self.is_foreign(declaring_type, current) {
                        self.visit_type_ref(declaring_type, strategy);
                        self.visit_type_ref(field_type, strategy);
                    }
                }
                Operand::Method {
                    declaring_type,
                    return_type,
                    parameters,
                    generic_arguments,
                    ..
                } => {
                    if self.is_foreign(declaring_type, current) {
                        self.visit_type_ref(declaring_type, strategy);
                        if let Some(return_type) = return_type {
                            self.visit_type_ref(return_type, strategy);
                        }
                        for parameter in parameters {
                            self.visit_type_ref(parameter, strategy);
                        }
                        for argument in generic_arguments {
                            self.visit_type_ref(argument, strategy);
                        }
                    }
                }
            }
        }
    }

    /// Whether a member's declaring type differs from the type being checked.
    fn is_foreign(&self, declaring_type: &TypeRef, current: &str) -> bool {
        declaring_type
            .element_full_name()
            .map_or(true, |name| !self.names_equal(&name, current))
    }

    fn names_equal(&self, a: &str, b: &str) -> bool {
        crate::metadata::names_equal(a, b, self.options.case_sensitive)
    }

    /// Resolves one reference down to the names it mentions.
    ///
    /// Wrappers are unwrapped to their element type, generic instantiations
    /// test their open definition and then each argument, and unbound
    /// generic parameters contribute nothing.
    fn visit_type_ref(&self, type_ref: &TypeRef, strategy: &mut DependencyStrategy<'_>) {
        match type_ref {
            TypeRef::Named(name) => self.visit_name(name, strategy),
            TypeRef::Array { element, .. } | TypeRef::Pointer(element) | TypeRef::ByRef(element) => {
                self.visit_type_ref(element, strategy);
            }
            TypeRef::Generic {
                definition,
                arguments,
            } => {
                self.visit_name(definition, strategy);
                for argument in arguments {
                    self.visit_type_ref(argument, strategy);
                }
            }
            TypeRef::GenericParameter { .. } => {}
        }
    }

    fn visit_name(&self, name: &TypeName, strategy: &mut DependencyStrategy<'_>) {
        let full_name = name.full_name();
        let exempt = self.is_exempt(name, &full_name);
        strategy.add_reference(&full_name, exempt);
    }

    fn visit_constant_text(text: &str, strategy: &mut DependencyStrategy<'_>) {
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            strategy.add_reference(trimmed, true);
        }
    }

    /// Compiler-generated artifacts never count as outside dependencies.
    fn is_exempt(&self, name: &TypeName, full_name: &str) -> bool {
        if (name.namespace.is_empty() || name.is_nested()) && name.has_synthetic_name() {
            return true;
        }
        self.provider
            .resolve_definition(full_name)
            .is_some_and(TypeDefinition::is_compiler_generated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{
        Attribute, EventDefinition, FieldDefinition, Instruction, PropertyDefinition, TypeModel,
        COMPILER_GENERATED_ATTRIBUTE,
    };
    use crate::search_tree::NamespaceSearchTree;
    use crate::strategy::CheckKind;

    fn t(s: &str) -> TypeRef {
        TypeRef::parse(s).unwrap()
    }

    fn used_by_refs(model: &TypeModel, name: &str, options: CheckOptions) -> Vec<String> {
        let tree = NamespaceSearchTree::build(["unused"], false);
        let mut strategy = DependencyStrategy::new(CheckKind::UsedBy, &tree);
        let walker = TypeCheckingContext::new(model, options);
        walker.check(model.resolve_definition(name).unwrap(), &mut strategy);
        let mut refs: Vec<String> = strategy.referenced().iter().cloned().collect();
        refs.sort();
        refs
    }

    fn verdict(model: &TypeModel, name: &str, kind: CheckKind, targets: &[&str]) -> (bool, Option<String>) {
        let tree = NamespaceSearchTree::build(targets, false);
        let mut strategy = DependencyStrategy::new(kind, &tree);
        TypeCheckingContext::new(model, CheckOptions::default())
            .check(model.resolve_definition(name).unwrap(), &mut strategy);
        (strategy.passes(), strategy.explanation())
    }

    #[test]
    fn collects_every_category() {
        let def = TypeDefinition::new("App", "Subject", crate::metadata::TypeKind::Class)
            .with_base(t("App.Base.Entity"))
            .with_attribute(Attribute {
                attribute_type: t("App.Attrs.MarkerAttribute"),
                type_arguments: vec![t("App.Attrs.Arg")],
            })
            .with_interface(t("App.Contracts.IThing`1<App.Model.Payload>"))
            .with_generic_parameter(GenericParameter {
                name: "T".into(),
                constraints: vec![t("App.Constraints.IConstraint")],
            })
            .with_field(FieldDefinition::new("items", t("App.Model.Item[]")))
            .with_property(PropertyDefinition::new("Owner", t("App.Model.Owner&")))
            .with_event(EventDefinition {
                name: "Changed".into(),
                event_type: t("App.Events.Handler"),
                attributes: vec![],
                accessors: vec![MethodDefinition::new("add_Changed")
                    .with_local(t("App.Events.Registry"))],
            })
            .with_method(
                MethodDefinition::new("Run")
                    .returning(t("App.Model.Result"))
                    .with_parameter("input", t("!T"))
                    .with_local(t("App.Locals.Buffer*"))
                    .with_instruction(Instruction::new(
                        "newobj",
                        Operand::Method {
                            declaring_type: t("App.Services.Worker"),
                            name: ".ctor".into(),
                            return_type: None,
                            parameters: vec![t("App.Services.Settings")],
                            generic_arguments: vec![],
                        },
                    )),
            );
        let model = TypeModel::new([def]);

        assert_eq!(
            used_by_refs(&model, "App.Subject", CheckOptions::default()),
            vec![
                "App.Attrs.Arg",
                "App.Attrs.MarkerAttribute",
                "App.Base.Entity",
                "App.Constraints.IConstraint",
                "App.Contracts.IThing`1",
                "App.Events.Handler",
                "App.Events.Registry",
                "App.Locals.Buffer",
                "App.Model.Item",
                "App.Model.Owner",
                "App.Model.Payload",
                "App.Model.Result",
                "App.Services.Settings",
                "App.Services.Worker",
            ]
        );
    }

    #[test]
    fn own_members_in_instructions_are_not_dependencies() {
        let def = TypeDefinition::new("App", "Counter", crate::metadata::TypeKind::Class).with_method(
            MethodDefinition::new("Increment").with_instruction(Instruction::new(
                "ldfld",
                Operand::Field {
                    declaring_type: t("App.Counter"),
                    name: "value".into(),
                    field_type: t("App.Secret.Hidden"),
                },
            )),
        );
        let model = TypeModel::new([def]);
        assert!(used_by_refs(&model, "App.Counter", CheckOptions::default()).is_empty());
    }

    #[test]
    fn string_constants_only_when_enabled() {
        let def = TypeDefinition::new("App", "Settings", crate::metadata::TypeKind::Class)
            .with_field(FieldDefinition::string_constant("Target", "App.Data.Repository"));
        let model = TypeModel::new([def]);

        let off = used_by_refs(&model, "App.Settings", CheckOptions::default());
        assert_eq!(off, vec!["System.String"]);

        let on = used_by_refs(
            &model,
            "App.Settings",
            CheckOptions::default().search_field_constants(true),
        );
        assert_eq!(on, vec!["App.Data.Repository", "System.String"]);
    }

    #[test]
    fn compiler_generated_nested_types_count_for_the_enclosing_type() {
        let outer = TypeDefinition::class("App", "Worker").with_nested("App.Worker/<>c");
        let closure = TypeDefinition::class("App", "Worker/<>c")
            .with_field(FieldDefinition::new("captured", t("App.Data.Repo")));
        let plain_nested = TypeDefinition::class("App", "Worker/Options")
            .with_field(FieldDefinition::new("other", t("App.Data.Other")));
        let model = TypeModel::new([
            outer.with_nested("App.Worker/Options"),
            closure,
            plain_nested,
        ]);

        let (passes, _) = verdict(&model, "App.Worker", CheckKind::AnyOf, &["App.Data.Repo"]);
        assert!(passes);
        let (passes, _) = verdict(&model, "App.Worker", CheckKind::AnyOf, &["App.Data.Other"]);
        assert!(!passes);
    }

    #[test]
    fn compiler_generated_references_are_exempt_from_outside_accounting() {
        let generated = TypeDefinition::class("App.Gen", "Helper")
            .with_attribute(Attribute::new(t(COMPILER_GENERATED_ATTRIBUTE)));
        let subject = TypeDefinition::new("App.Core", "Order", crate::metadata::TypeKind::Struct)
            .with_field(FieldDefinition::new("a", t("App.Core.Line")))
            .with_field(FieldDefinition::new("b", t("<>f__AnonymousType0")))
            .with_field(FieldDefinition::new("c", t("App.Gen.Helper")));
        let model = TypeModel::new([generated, subject]);

        let (passes, why) = verdict(&model, "App.Core.Order", CheckKind::OnlyAnyOrNone, &["App.Core"]);
        assert!(passes, "unexpected outside dependency: {why:?}");
    }

    #[test]
    fn early_exit_stops_before_instructions() {
        let def = TypeDefinition::class("App", "Early").with_method(
            MethodDefinition::new("Run").with_instruction(Instruction::new(
                "newobj",
                Operand::Type {
                    type_ref: t("App.Late.Thing"),
                },
            )),
        );
        let model = TypeModel::new([def]);
        let tree = NamespaceSearchTree::build(["System"], false);
        let mut strategy = DependencyStrategy::new(CheckKind::AnyOf, &tree);
        TypeCheckingContext::new(&model, CheckOptions::default())
            .check(model.resolve_definition("App.Early").unwrap(), &mut strategy);
        assert!(strategy.passes());
        assert_eq!(strategy.explanation().as_deref(), Some("has a dependency on System.Object"));
    }

    #[test]
    fn method_headers_are_searched_before_any_locals() {
        let def = TypeDefinition::class("App", "Passes")
            .with_method(MethodDefinition::new("A").with_local(t("X.Local")))
            .with_method(MethodDefinition::new("B").returning(t("X.Header")));
        let model = TypeModel::new([def]);
        let (passes, why) = verdict(&model, "App.Passes", CheckKind::AnyOf, &["X"]);
        assert!(passes);
        assert_eq!(why.as_deref(), Some("has a dependency on X.Header"));
    }

    #[test]
    fn method_locals_are_searched_before_any_instructions() {
        let def = TypeDefinition::class("App", "Passes")
            .with_method(MethodDefinition::new("A").with_instruction(Instruction::new(
                "newobj",
                Operand::Type {
                    type_ref: t("X.Body"),
                },
            )))
            .with_method(MethodDefinition::new("B").with_local(t("X.Local")));
        let model = TypeModel::new([def]);
        let (_, why) = verdict(&model, "App.Passes", CheckKind::AnyOf, &["X"]);
        assert_eq!(why.as_deref(), Some("has a dependency on X.Local"));
    }

    #[test]
    fn nested_type_cycles_terminate() {
        let json = r#"{ "types": [
            { "namespace": "App", "name": "W", "nested_types": ["App.W/<>c"] },
            { "namespace": "App", "name": "W/<>c", "nested_types": ["App.W/<>c", "App.W"],
              "fields": [{ "name": "f", "type": "App.Data.Repo" }] }
        ] }"#;
        let model = TypeModel::from_json(json).unwrap();

        let (passes, _) = verdict(&model, "App.W", CheckKind::AnyOf, &["X"]);
        assert!(!passes);
        let (passes, _) = verdict(&model, "App.W", CheckKind::AnyOf, &["App.Data"]);
        assert!(passes);
    }

    #[test]
    fn cyclic_references_terminate() {
        let a = TypeDefinition::class("App", "A").with_field(FieldDefinition::new("b", t("App.B")));
        let b = TypeDefinition::class("App", "B").with_field(FieldDefinition::new("a", t("App.A")));
        let model = TypeModel::new([a, b]);
        assert_eq!(
            used_by_refs(&model, "App.A", CheckOptions::default()),
            vec!["App.B", "System.Object"]
        );
    }

    #[test]
    fn unresolvable_nested_types_are_skipped() {
        let def = TypeDefinition::class("App", "Lonely").with_nested("App.Lonely/<>c");
        let model = TypeModel::new([def]);
        assert_eq!(
            used_by_refs(&model, "App.Lonely", CheckOptions::default()),
            vec!["System.Object"]
        );
    }
}
