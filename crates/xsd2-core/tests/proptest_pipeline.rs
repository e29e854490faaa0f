//! Property-based tests for the full pipeline.
//!
//! Generates schemas whose type and member names differ only in case, so
//! capitalization is forced to disambiguate. Types carry no XML annotations,
//! a type annotation (named or not, with or without a namespace) or a root
//! annotation. Invariants:
//! - sibling member names and type names are unique after transformation;
//! - every element/attribute member still maps to its original XML name;
//! - every type keeps its XML identity, and a type with XML annotations
//!   states it in those annotations.

use std::collections::HashSet;

use proptest::prelude::*;
use xsd2_core::annotation::args;
use xsd2_core::extract::{namespace, recover_identities, type_identity, xml_name};
use xsd2_core::{
    transform, Annotation, AnnotationKind, ArgumentValue, Member, MemberKind, SchemaIr,
    TransformOptions, TypeDeclaration, TypeReference, XmlIdentity,
};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

/// Short names that collide often once the first letter is uppercased.
fn arb_name() -> impl Strategy<Value = String> {
    "[aAbB][a-c]{0,2}"
}

fn arb_member() -> impl Strategy<Value = Member> {
    (arb_name(), any::<bool>(), 0u32..2, prop::option::of(1u32..3)).prop_map(
        |(name, attribute, min, max)| {
            let member = if attribute {
                Member::attribute(name, TypeReference::scalar("int"))
            } else {
                Member::element(name, TypeReference::object("string"))
            };
            member.with_occurs(min, max)
        },
    )
}

fn type_ns() -> Annotation {
    Annotation::new(AnnotationKind::Type)
        .with_named(args::NAMESPACE, ArgumentValue::string("urn:x"))
}

fn arb_type_annotations() -> impl Strategy<Value = Vec<Annotation>> {
    let named = |kind: AnnotationKind| {
        arb_name().prop_map(move |n| {
            vec![Annotation::new(kind.clone()).with_positional(ArgumentValue::string(n))]
        })
    };
    prop_oneof![
        Just(Vec::new()),
        Just(vec![Annotation::new(AnnotationKind::Type)]),
        Just(vec![type_ns()]),
        named(AnnotationKind::Type),
        Just(vec![Annotation::new(AnnotationKind::Root)]),
        named(AnnotationKind::Root),
        Just(vec![type_ns(), Annotation::new(AnnotationKind::Root)]),
    ]
}

fn arb_schema() -> impl Strategy<Value = SchemaIr> {
    let arb_type = (
        arb_name(),
        arb_type_annotations(),
        prop::collection::vec(arb_member(), 0..6),
    );
    prop::collection::vec(arb_type, 1..6).prop_map(
        |types| {
            let mut schema = SchemaIr::new("generated.xsd");
            let mut seen = HashSet::new();
            for (name, annotations, members) in types {
                // Importers never emit two types with one generated name.
                if !seen.insert(name.clone()) {
                    continue;
                }
                let mut member_names = HashSet::new();
                let mut decl = TypeDeclaration::class(name);
                decl.annotations = annotations;
                decl.is_mixed = members.len() % 2 == 1;
                for member in members {
                    if member_names.insert(member.name.clone()) {
                        decl.members.push(member);
                    }
                }
                schema.push(decl);
            }
            schema
        },
    )
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, ..Default::default() })]

    #[test]
    fn names_unique_and_xml_names_recoverable(schema in arb_schema()) {
        let expected_types: Vec<XmlIdentity> = {
            let mut copy = schema.clone();
            recover_identities(&mut copy).unwrap();
            copy.types.iter().map(|t| type_identity(t).unwrap()).collect()
        };
        let annotated: Vec<bool> =
            schema.types.iter().map(|t| !t.annotations.is_empty()).collect();
        let expected_members: Vec<Vec<String>> = schema
            .types
            .iter()
            .map(|t| t.members.iter().map(|m| m.name.clone()).collect())
            .collect();

        let result = transform(schema, &TransformOptions::all()).unwrap();

        let type_names: HashSet<&str> =
            result.schema.types.iter().map(|t| t.name.as_str()).collect();
        prop_assert_eq!(type_names.len(), result.schema.types.len());

        // Annotated types are read back from their annotations alone.
        let mut fresh = result.schema.clone();
        for (decl, annotated) in fresh.types.iter_mut().zip(&annotated) {
            if *annotated {
                decl.original_xml_name = None;
                decl.xml_namespace = None;
            }
        }
        recover_identities(&mut fresh).unwrap();
        for (decl, expected) in fresh.types.iter().zip(&expected_types) {
            prop_assert_eq!(&type_identity(decl).unwrap(), expected);
            prop_assert_eq!(&namespace(decl).unwrap(), &expected.namespace);
        }
        let output = result.schema.types.iter().zip(&expected_types).zip(&annotated);
        for ((decl, expected), _) in output.filter(|(_, annotated)| **annotated) {
            prop_assert_eq!(&xml_name(decl).unwrap(), &expected.name);
        }

        for (decl, expected_members) in result.schema.types.iter().zip(&expected_members) {
            let member_names: HashSet<&str> =
                decl.members.iter().map(|m| m.name.as_str()).collect();
            prop_assert_eq!(member_names.len(), decl.members.len());

            let xml_names: Vec<String> = decl
                .members
                .iter()
                .filter(|m| m.kind != MemberKind::Text)
                .map(|m| xml_name(m).unwrap())
                .collect();
            prop_assert_eq!(&xml_names, expected_members);
        }
    }
}
