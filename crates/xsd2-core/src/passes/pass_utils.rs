//! Helpers shared by the renaming and synthesizing passes.

use std::collections::{HashMap, HashSet};

use crate::annotation::{args, Annotation, AnnotationKind, Argument, ArgumentValue};
use crate::error::TransformError;
use crate::ir::TypeReference;

// ---------------------------------------------------------------------------
// Unique naming
// ---------------------------------------------------------------------------

/// One name wanted by a node inside a uniqueness scope.
#[derive(Debug, Clone)]
pub(crate) struct NameRequest {
    pub current: String,
    pub desired: String,
    /// Lower ranks claim names first.
    pub rank: u8,
}

impl NameRequest {
    pub fn new(current: impl Into<String>, desired: impl Into<String>) -> Self {
        Self {
            current: current.into(),
            desired: desired.into(),
            rank: 0,
        }
    }

    pub fn ranked(mut self, rank: u8) -> Self {
        self.rank = rank;
        self
    }
}

/// First free name among `base`, `base1`, ..., `base{limit}`.
pub(crate) fn unique_name(base: &str, taken: &HashSet<String>, limit: u32) -> Option<String> {
    if !taken.contains(base) {
        return Some(base.to_string());
    }
    (1..=limit)
        .map(|n| format!("{base}{n}"))
        .find(|candidate| !taken.contains(candidate))
}

/// Assign a unique name to every request in one scope.
///
/// Requests are served by rank, then nodes whose name does not change, then
/// declaration order; a node that keeps its name therefore never loses it to
/// a renamed sibling. A taken name gets the lowest free numeric suffix.
/// Returns the assigned names in request order.
pub(crate) fn assign_unique(
    requests: &[NameRequest],
    limit: u32,
    scope: &str,
) -> Result<Vec<String>, TransformError> {
    let mut order: Vec<usize> = (0..requests.len()).collect();
    order.sort_by_key(|&i| {
        let request = &requests[i];
        (request.rank, request.desired != request.current, i)
    });

    let mut taken = HashSet::with_capacity(requests.len());
    let mut assigned = vec![String::new(); requests.len()];
    for i in order {
        let request = &requests[i];
        let Some(name) = unique_name(&request.desired, &taken, limit) else {
            let names = requests
                .iter()
                .filter(|r| r.desired == request.desired)
                .map(|r| r.current.clone())
                .collect();
            return Err(TransformError::UniquenessViolation {
                scope: scope.to_string(),
                names,
            });
        };
        if name != request.desired {
            tracing::debug!(
                scope,
                requested = %request.desired,
                assigned = %name,
                "disambiguated name"
            );
        }
        taken.insert(name.clone());
        assigned[i] = name;
    }
    Ok(assigned)
}

/// Old-to-new map of the names that actually changed.
pub(crate) fn changed_names(
    requests: &[NameRequest],
    assigned: &[String],
) -> HashMap<String, String> {
    requests
        .iter()
        .zip(assigned)
        .filter(|(r, to)| &r.current != *to)
        .map(|(r, to)| (r.current.clone(), to.clone()))
        .collect()
}

// ---------------------------------------------------------------------------
// Name pinning
// ---------------------------------------------------------------------------

/// Named slot that carries the XML name for an annotation kind.
fn name_slot(kind: &AnnotationKind) -> &'static str {
    match kind {
        AnnotationKind::Type => args::TYPE_NAME,
        AnnotationKind::Attribute => args::ATTRIBUTE_NAME,
        AnnotationKind::Enum => args::NAME,
        _ => args::ELEMENT_NAME,
    }
}

/// Whether the annotation already states a name.
pub(crate) fn carries_name(annotation: &Annotation) -> bool {
    annotation.has_named(name_slot(&annotation.kind))
        || annotation.has_named(args::NAME)
        || annotation
            .arguments
            .first()
            .is_some_and(|a| a.is_positional() && a.value.is_string_literal())
}

/// Make `name` explicit on every annotation of `kind`, creating one when the
/// node has none. Annotations that already name the node are left alone.
///
/// Returns whether anything changed.
pub(crate) fn pin_name(
    annotations: &mut Vec<Annotation>,
    kind: AnnotationKind,
    name: &str,
) -> bool {
    let mut changed = false;
    let mut found = false;
    for annotation in annotations.iter_mut().filter(|a| a.kind == kind) {
        found = true;
        if !carries_name(annotation) {
            annotation
                .arguments
                .insert(0, Argument::positional(ArgumentValue::string(name)));
            changed = true;
        }
    }
    if !found {
        annotations.push(Annotation::new(kind).with_positional(ArgumentValue::string(name)));
        changed = true;
    }
    changed
}

// ---------------------------------------------------------------------------
// Shapes
// ---------------------------------------------------------------------------

/// Whether a member serializes as a wrapper element around its items.
pub(crate) fn is_array_wrapped(annotations: &[Annotation]) -> bool {
    annotations
        .iter()
        .any(|a| matches!(a.kind, AnnotationKind::Array | AnnotationKind::ArrayItem))
}

/// A collection of `element` in the configured shape.
pub(crate) fn collection_of(element: TypeReference, use_lists: bool) -> TypeReference {
    if use_lists {
        TypeReference::list(element)
    } else {
        TypeReference::array(element)
    }
}
