//! Pass 6: Element-order preservation
//!
//! Writes each element member's declaration position into the `Order`
//! argument of its element (or array wrapper) annotations, so the serializer
//! reproduces the sequence order of the schema. Positions are 1-based and
//! count element and choice members only; attributes and text carry no order.
//! An `Order` that is already present is kept. A member with neither gets one:
//! an array wrapper when it has array item annotations, else an element.

use crate::annotation::{args, Annotation, AnnotationKind, ArgumentValue};
use crate::config::TransformOptions;
use crate::ir::{Member, MemberKind, SchemaIr, TypeKind};

use super::pass_result::PassResult;
use super::pass_utils::is_array_wrapped;

pub fn preserve_order(schema: &mut SchemaIr, config: &TransformOptions) -> PassResult {
    if !config.preserve_order {
        return PassResult::empty();
    }

    for decl in schema.types.iter_mut().filter(|t| t.kind == TypeKind::Class) {
        let ordered = decl
            .members
            .iter_mut()
            .filter(|m| matches!(m.kind, MemberKind::Element | MemberKind::ItemsChoice));
        for (position, member) in (1i64..).zip(ordered) {
            set_order(member, position);
        }
    }

    PassResult::empty()
}

fn is_orderable(annotation: &Annotation) -> bool {
    matches!(annotation.kind, AnnotationKind::Element | AnnotationKind::Array)
}

fn set_order(member: &mut Member, position: i64) {
    if member.kind == MemberKind::Element && !member.annotations.iter().any(is_orderable) {
        let kind = if is_array_wrapped(&member.annotations) {
            AnnotationKind::Array
        } else {
            AnnotationKind::Element
        };
        member.annotations.push(Annotation::new(kind));
    }
    for annotation in member.annotations.iter_mut().filter(|a| is_orderable(a)) {
        if !annotation.has_named(args::ORDER) {
            annotation.set_named(args::ORDER, ArgumentValue::int(position));
        }
    }
}
