//! Pass 5: Mixed-content enablement
//!
//! A complex type declared `mixed` interleaves character data with its child
//! elements. The serializer only keeps that text when the class has a member
//! annotated as text, so every mixed class without one gets a synthesized
//! `Text` member: a string collection in the configured shape.
//!
//! When a sibling is already called `Text` the new member takes the lowest
//! free numeric suffix and the collision is reported as a diagnostic.

use std::collections::HashSet;

use crate::annotation::{Annotation, AnnotationKind};
use crate::config::TransformOptions;
use crate::error::TransformError;
use crate::ir::{Member, MemberKind, SchemaIr, TypeKind, TypeReference};
use crate::report::{Diagnostic, DiagnosticKind};

use super::pass_result::PassResult;
use super::pass_utils::{collection_of, unique_name};

/// Name given to a synthesized text member.
const TEXT_MEMBER_NAME: &str = "Text";

pub fn enable_mixed_content(
    schema: &mut SchemaIr,
    config: &TransformOptions,
) -> Result<PassResult, TransformError> {
    if !config.mixed_content {
        return Ok(PassResult::empty());
    }

    let mut diagnostics = Vec::new();
    for decl in schema.types.iter_mut().filter(|t| t.kind == TypeKind::Class && t.is_mixed) {
        if decl.members.iter().any(|m| m.kind == MemberKind::Text) {
            continue;
        }

        let taken: HashSet<String> = decl.members.iter().map(|m| m.name.clone()).collect();
        let Some(name) = unique_name(TEXT_MEMBER_NAME, &taken, config.disambiguation_limit) else {
            return Err(TransformError::UniquenessViolation {
                scope: decl.label(),
                names: vec![TEXT_MEMBER_NAME.to_string()],
            });
        };

        if name != TEXT_MEMBER_NAME {
            tracing::warn!(
                type_name = %decl.name,
                assigned = %name,
                "text member name already in use"
            );
            diagnostics.push(Diagnostic {
                subject: decl.label(),
                kind: DiagnosticKind::NameCollision {
                    requested: TEXT_MEMBER_NAME.to_string(),
                    assigned: name.clone(),
                },
                message: format!(
                    "a member named `{TEXT_MEMBER_NAME}` already exists; \
                     mixed text goes to `{name}`"
                ),
            });
        }

        let mut text = Member::new(
            name.clone(),
            MemberKind::Text,
            collection_of(TypeReference::object("string"), config.use_lists),
        )
        .with_occurs(0, None)
        .with_annotation(Annotation::new(AnnotationKind::Text));
        text.original_xml_name = Some(name);
        decl.members.push(text);
    }

    Ok(PassResult::with_diagnostics(diagnostics))
}
