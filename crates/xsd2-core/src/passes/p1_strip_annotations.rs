//! Pass 1: Annotation stripping
//!
//! Removes every annotation whose kind is in the configured set from all
//! types and members. Runs before identity recovery, so a stripped
//! name-bearing annotation no longer contributes to the recovered XML name.

use std::collections::BTreeSet;

use crate::annotation::{Annotation, AnnotationKind};
use crate::ir::SchemaIr;

use super::pass_result::PassResult;

/// Drop the annotations whose kind is in `kinds`.
pub fn strip_annotations(schema: &mut SchemaIr, kinds: &BTreeSet<AnnotationKind>) -> PassResult {
    if kinds.is_empty() {
        return PassResult::empty();
    }

    let mut removed = 0usize;
    let mut strip = |annotations: &mut Vec<Annotation>| {
        let before = annotations.len();
        annotations.retain(|a| !kinds.contains(&a.kind));
        removed += before - annotations.len();
    };

    for decl in &mut schema.types {
        strip(&mut decl.annotations);
        for member in &mut decl.members {
            strip(&mut member.annotations);
        }
    }

    tracing::debug!(removed, source = %schema.source, "stripped annotations");
    PassResult::empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::ArgumentValue;
    use crate::config::DEBUGGER_STEP_THROUGH;
    use crate::ir::{Member, TypeDeclaration, TypeReference};
    use pretty_assertions::assert_eq;

    fn debugger() -> Annotation {
        Annotation::new(AnnotationKind::Other(DEBUGGER_STEP_THROUGH.into()))
    }

    fn run(schema: &mut SchemaIr, names: &[&str]) {
        let kinds = names.iter().map(|n| AnnotationKind::from_name(n)).collect();
        strip_annotations(schema, &kinds);
    }

    // Test 1: markers on types and members are removed
    #[test]
    fn test_strips_types_and_members() {
        let mut schema = SchemaIr::new("a.xsd");
        schema.push(
            TypeDeclaration::class("Order")
                .with_annotation(debugger())
                .with_annotation(Annotation::new(AnnotationKind::Root))
                .with_member(
                    Member::element("id", TypeReference::scalar("int"))
                        .with_annotation(debugger())
                        .with_annotation(Annotation::new(AnnotationKind::Element)),
                ),
        );

        run(&mut schema, &[DEBUGGER_STEP_THROUGH]);

        let order = &schema.types[0];
        assert_eq!(order.annotations, vec![Annotation::new(AnnotationKind::Root)]);
        assert_eq!(
            order.members[0].annotations,
            vec![Annotation::new(AnnotationKind::Element)]
        );
    }

    // Test 2: short names resolve to serializer kinds
    #[test]
    fn test_strips_known_kind_by_short_name() {
        let mut schema = SchemaIr::new("a.xsd");
        schema.push(TypeDeclaration::class("Order").with_member(
            Member::element("secret", TypeReference::object("string"))
                .with_annotation(Annotation::new(AnnotationKind::Ignore)),
        ));

        run(&mut schema, &["XmlIgnoreAttribute"]);

        assert!(schema.types[0].members[0].annotations.is_empty());
    }

    // Test 3: a stripped name-bearing annotation stops naming the node
    #[test]
    fn test_stripped_name_is_not_recovered() {
        let mut schema = SchemaIr::new("a.xsd");
        schema.push(TypeDeclaration::class("Order").with_annotation(
            Annotation::new(AnnotationKind::Type).with_positional(ArgumentValue::string("order")),
        ));

        run(&mut schema, &["XmlType"]);
        crate::extract::recover_identities(&mut schema).unwrap();

        assert_eq!(schema.types[0].original_xml_name.as_deref(), Some("Order"));
    }

    // Test 4: empty set leaves everything in place
    #[test]
    fn test_empty_set_is_noop() {
        let mut schema = SchemaIr::new("a.xsd");
        schema.push(TypeDeclaration::class("Order").with_annotation(debugger()));
        let before = schema.clone();

        run(&mut schema, &[]);

        assert_eq!(schema, before);
    }
}
