//! Pass 4: Collection-shape selection
//!
//! Members that may occur more than once are given a single collection shape:
//! a growable `List` when `use_lists` is set, a fixed `Array` otherwise. An
//! existing collection is re-wrapped with its element type untouched; a plain
//! type is wrapped. Single-valued members keep whatever type they have, so a
//! `byte[]` payload stays an array.

use crate::config::TransformOptions;
use crate::ir::{SchemaIr, TypeReference};

use super::pass_result::PassResult;
use super::pass_utils::collection_of;

pub fn select_collection_shape(schema: &mut SchemaIr, config: &TransformOptions) -> PassResult {
    let mut reshaped = 0usize;

    for decl in &mut schema.types {
        for member in decl.members.iter_mut().filter(|m| m.is_multiple()) {
            let current =
                std::mem::replace(&mut member.declared_type, TypeReference::object("object"));
            let element = match current {
                TypeReference::List { element } | TypeReference::Array { element } => *element,
                other => other,
            };
            let shaped = collection_of(element, config.use_lists);
            member.declared_type = shaped;
            reshaped += 1;
        }
    }

    tracing::debug!(reshaped, use_lists = config.use_lists, "selected collection shapes");
    PassResult::empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{ChoiceAlternative, Member, TypeDeclaration};
    use pretty_assertions::assert_eq;

    fn schema() -> SchemaIr {
        let mut schema = SchemaIr::new("a.xsd");
        schema.push(
            TypeDeclaration::class("Order")
                .with_member(
                    Member::element("lines", TypeReference::array(TypeReference::declared("Line")))
                        .with_occurs(0, None),
                )
                .with_member(
                    Member::element("tags", TypeReference::object("string"))
                        .with_occurs(1, Some(5)),
                )
                .with_member(Member::element(
                    "payload",
                    TypeReference::array(TypeReference::scalar("byte")),
                ))
                .with_member(Member::items_choice(vec![
                    ChoiceAlternative::new("a", TypeReference::declared("A")),
                    ChoiceAlternative::new("b", TypeReference::declared("B")),
                ])),
        );
        schema
    }

    fn run(use_lists: bool) -> SchemaIr {
        let mut schema = schema();
        let config = TransformOptions {
            use_lists,
            ..TransformOptions::default()
        };
        select_collection_shape(&mut schema, &config);
        schema
    }

    // Test 1: lists
    #[test]
    fn test_lists() {
        let schema = run(true);
        let members = &schema.types[0].members;
        assert_eq!(
            members[0].declared_type,
            TypeReference::list(TypeReference::declared("Line"))
        );
        assert_eq!(
            members[1].declared_type,
            TypeReference::list(TypeReference::object("string"))
        );
        assert_eq!(
            members[3].declared_type,
            TypeReference::list(TypeReference::declared("A"))
        );
    }

    // Test 2: arrays
    #[test]
    fn test_arrays() {
        let schema = run(false);
        let members = &schema.types[0].members;
        assert_eq!(
            members[0].declared_type,
            TypeReference::array(TypeReference::declared("Line"))
        );
        assert_eq!(
            members[1].declared_type,
            TypeReference::array(TypeReference::object("string"))
        );
    }

    // Test 3: single-valued array payloads keep their type
    #[test]
    fn test_single_valued_payload_untouched() {
        for use_lists in [true, false] {
            let schema = run(use_lists);
            assert_eq!(
                schema.types[0].members[2].declared_type,
                TypeReference::array(TypeReference::scalar("byte"))
            );
        }
    }

    // Test 4: choice metadata is preserved
    #[test]
    fn test_choice_alternatives_preserved() {
        let before = schema();
        let after = run(true);
        assert_eq!(
            after.types[0].members[3].alternatives,
            before.types[0].members[3].alternatives
        );
        assert_eq!(
            after.types[0].members[3].annotations,
            before.types[0].members[3].annotations
        );
    }
}
