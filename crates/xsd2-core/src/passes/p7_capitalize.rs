//! Pass 7: Capitalization
//!
//! Applies the configured capitalizers to generated identifiers: type names,
//! then class member names, then enum literals. Each scope (all types of the
//! schema, the members of one type) must end up with distinct names, so a
//! collision takes the lowest free numeric suffix up to
//! `disambiguation_limit`; past that the run fails with
//! [`TransformError::UniquenessViolation`].
//!
//! Renaming must not change the XML the types serialize to. Before a node is
//! renamed, its XML name is written into its annotations unless one of them
//! already states it. Type renames are then propagated to every reference in
//! one step.

use std::collections::HashMap;

use crate::annotation::{args, Annotation, AnnotationKind, ArgumentValue};
use crate::capitalizer::Capitalizer;
use crate::config::TransformOptions;
use crate::error::TransformError;
use crate::extract::explicit_xml_name;
use crate::ir::{Member, MemberKind, SchemaIr, TypeDeclaration, TypeKind};
use crate::report::Rename;

use super::pass_result::PassResult;
use super::pass_utils::{assign_unique, changed_names, is_array_wrapped, pin_name, NameRequest};

pub fn capitalize(
    schema: &mut SchemaIr,
    config: &TransformOptions,
) -> Result<PassResult, TransformError> {
    let mut renames = Vec::new();

    if !config.type_capitalizer.is_identity() {
        renames.extend(rename_types(
            schema,
            &config.type_capitalizer,
            config.disambiguation_limit,
        )?);
    }
    if !config.property_capitalizer.is_identity() {
        for decl in schema.types.iter_mut().filter(|t| t.kind == TypeKind::Class) {
            renames.extend(rename_members(
                decl,
                &config.property_capitalizer,
                config.disambiguation_limit,
            )?);
        }
    }
    if !config.enum_capitalizer.is_identity() {
        for decl in schema.types.iter_mut().filter(|t| t.kind == TypeKind::Enum) {
            renames.extend(rename_members(
                decl,
                &config.enum_capitalizer,
                config.disambiguation_limit,
            )?);
        }
    }

    tracing::debug!(renamed = renames.len(), source = %schema.source, "capitalized identifiers");
    Ok(PassResult::with_renames(renames))
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

fn rename_types(
    schema: &mut SchemaIr,
    capitalizer: &Capitalizer,
    limit: u32,
) -> Result<Vec<Rename>, TransformError> {
    // Excluded types are not emitted, so they yield a contested name.
    let requests: Vec<NameRequest> = schema
        .types
        .iter()
        .map(|decl| {
            NameRequest::new(&decl.name, capitalizer.capitalize(&decl.name))
                .ranked(u8::from(decl.excluded))
        })
        .collect();
    let assigned = assign_unique(&requests, limit, &format!("schema `{}`", schema.source))?;
    let plan: HashMap<String, String> = changed_names(&requests, &assigned);
    if plan.is_empty() {
        return Ok(Vec::new());
    }

    let mut renames = Vec::new();
    for (decl, to) in schema.types.iter_mut().zip(assigned) {
        if decl.name == to {
            continue;
        }
        pin_type_name(decl)?;
        renames.push(Rename::Type {
            from: std::mem::replace(&mut decl.name, to.clone()),
            to,
        });
    }
    schema.rename_type_references(&plan);
    Ok(renames)
}

/// Keep the XML identity of a declaration that is about to be renamed.
///
/// An unnamed root annotation defaults to the generated name, so it is pinned
/// first. When no annotation names the type after that, the name goes into
/// the type annotation, which is only created when the namespace is known:
/// a new type annotation would turn an undetermined namespace into the
/// default one. A type left unpinned keeps its identity in
/// `original_xml_name` alone.
fn pin_type_name(decl: &mut TypeDeclaration) -> Result<(), TransformError> {
    let current = decl.name.clone();
    if decl.annotations.iter().any(|a| a.kind == AnnotationKind::Root) {
        pin_name(&mut decl.annotations, AnnotationKind::Root, &current);
    }
    if decl.is_anonymous || explicit_xml_name(decl)?.is_some() {
        return Ok(());
    }

    let has_type = decl.annotations.iter().any(|a| a.kind == AnnotationKind::Type);
    match (has_type, decl.xml_namespace.clone()) {
        (true, _) => {
            pin_name(&mut decl.annotations, AnnotationKind::Type, &current);
        }
        (false, Some(ns)) => {
            let mut annotation = Annotation::new(AnnotationKind::Type)
                .with_positional(ArgumentValue::string(&current));
            if !ns.is_empty() {
                annotation.set_named(args::NAMESPACE, ArgumentValue::string(ns));
            }
            decl.annotations.push(annotation);
        }
        (false, None) => {
            tracing::trace!(name = %current, "type without XML annotations renamed unpinned");
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Members and enum literals
// ---------------------------------------------------------------------------

fn rename_members(
    decl: &mut TypeDeclaration,
    capitalizer: &Capitalizer,
    limit: u32,
) -> Result<Vec<Rename>, TransformError> {
    let requests: Vec<NameRequest> = decl
        .members
        .iter()
        .map(|member| {
            let desired = if member.is_items_choice() {
                member.name.clone()
            } else {
                capitalizer.capitalize(&member.name)
            };
            NameRequest::new(&member.name, desired)
        })
        .collect();
    let assigned = assign_unique(&requests, limit, &decl.label())?;

    let mut renames = Vec::new();
    for (member, to) in decl.members.iter_mut().zip(assigned) {
        if member.name == to {
            continue;
        }
        pin_member_name(member);
        let from = std::mem::replace(&mut member.name, to.clone());
        renames.push(match member.kind {
            MemberKind::EnumValue => Rename::EnumValue {
                type_name: decl.name.clone(),
                from,
                to,
            },
            _ => Rename::Member {
                type_name: decl.name.clone(),
                from,
                to,
            },
        });
    }
    Ok(renames)
}

/// Keep the XML name of a member that is about to be renamed.
///
/// The wrapper of an array member defaults to the member name, so it is
/// pinned with the current name; item names live in the array item
/// annotations and do not depend on the member name.
fn pin_member_name(member: &mut Member) {
    let (kind, name) = match member.kind {
        MemberKind::Element if is_array_wrapped(&member.annotations) => {
            (AnnotationKind::Array, member.name.clone())
        }
        MemberKind::Element => (AnnotationKind::Element, member.xml_name().to_string()),
        MemberKind::Attribute => (AnnotationKind::Attribute, member.xml_name().to_string()),
        MemberKind::EnumValue => (AnnotationKind::Enum, member.xml_name().to_string()),
        MemberKind::Text | MemberKind::ItemsChoice => return,
    };
    pin_name(&mut member.annotations, kind, &name);
}
