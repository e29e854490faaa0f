//! Pass 2: Imported-type exclusion
//!
//! Types that came from an imported schema are usually generated elsewhere.
//! Two modes decide which of them to leave out of emission:
//!
//! - **Reference graph** (`exclude_imported_types`): an imported type is kept
//!   only when a local type reaches it, transitively, through member types,
//!   choice alternatives or `TypeOf` annotation arguments.
//! - **XML identity** (`exclude_imported_types_by_xml_identity`): every type
//!   whose recovered (name, namespace) matches an imported identity is
//!   excluded, referenced or not. This mode wins when both are set.
//!
//! Excluded types stay in the IR with `excluded = true`; references to them
//! are left as they are.

use std::collections::{BTreeSet, HashMap, VecDeque};

use crate::config::TransformOptions;
use crate::error::TransformError;
use crate::extract::type_identity;
use crate::identity::XmlIdentity;
use crate::ir::{SchemaIr, TypeDeclaration};

use super::pass_result::PassResult;

/// Mark imported types as excluded according to the configured mode.
///
/// `imported` holds identities defined by imported schemas; types the
/// importer flagged `imported` count as well.
pub fn exclude_imported_types(
    schema: &mut SchemaIr,
    imported: &BTreeSet<XmlIdentity>,
    config: &TransformOptions,
) -> Result<PassResult, TransformError> {
    if !config.exclude_imported_types && !config.exclude_imported_types_by_xml_identity {
        return Ok(PassResult::empty());
    }

    let identities = schema
        .types
        .iter()
        .map(type_identity)
        .collect::<Result<Vec<_>, _>>()?;

    let to_exclude: Vec<usize> = if config.exclude_imported_types_by_xml_identity {
        by_identity(schema, &identities, imported)
    } else {
        by_reference(schema, &identities, imported)
    };

    let mut excluded = Vec::with_capacity(to_exclude.len());
    for i in to_exclude {
        let decl = &mut schema.types[i];
        if decl.excluded {
            continue;
        }
        decl.excluded = true;
        tracing::debug!(
            type_name = %decl.name,
            identity = %identities[i],
            "excluded imported type"
        );
        excluded.push(identities[i].clone());
    }

    Ok(PassResult::with_excluded(excluded))
}

// ---------------------------------------------------------------------------
// Identity mode
// ---------------------------------------------------------------------------

fn by_identity(
    schema: &SchemaIr,
    identities: &[XmlIdentity],
    imported: &BTreeSet<XmlIdentity>,
) -> Vec<usize> {
    let flagged: BTreeSet<&XmlIdentity> = schema
        .types
        .iter()
        .zip(identities)
        .filter(|(decl, _)| decl.imported)
        .map(|(_, identity)| identity)
        .collect();

    identities
        .iter()
        .enumerate()
        .filter(|(_, identity)| imported.contains(*identity) || flagged.contains(identity))
        .map(|(i, _)| i)
        .collect()
}

// ---------------------------------------------------------------------------
// Reference-graph mode
// ---------------------------------------------------------------------------

fn by_reference(
    schema: &SchemaIr,
    identities: &[XmlIdentity],
    imported: &BTreeSet<XmlIdentity>,
) -> Vec<usize> {
    let is_imported: Vec<bool> = schema
        .types
        .iter()
        .zip(identities)
        .map(|(decl, identity)| decl.imported || imported.contains(identity))
        .collect();

    let mut by_name: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, decl) in schema.types.iter().enumerate() {
        by_name.entry(decl.name.as_str()).or_default().push(i);
    }

    let mut reached = vec![false; schema.types.len()];
    let mut queue: VecDeque<usize> = VecDeque::new();
    for (i, imported) in is_imported.iter().enumerate() {
        if !imported {
            reached[i] = true;
            queue.push_back(i);
        }
    }

    while let Some(i) = queue.pop_front() {
        for name in referenced_names(&schema.types[i]) {
            for &target in by_name.get(name).into_iter().flatten() {
                if !reached[target] {
                    reached[target] = true;
                    queue.push_back(target);
                }
            }
        }
    }

    (0..schema.types.len())
        .filter(|&i| is_imported[i] && !reached[i])
        .collect()
}

/// Generated type names a declaration depends on.
fn referenced_names(decl: &TypeDeclaration) -> Vec<&str> {
    let mut names: Vec<&str> = decl
        .annotations
        .iter()
        .flat_map(|a| a.type_arguments())
        .flat_map(|t| t.declared_names())
        .collect();

    for member in &decl.members {
        names.extend(member.declared_type.declared_names());
        for alternative in &member.alternatives {
            names.extend(alternative.type_ref.declared_names());
        }
        for annotation in &member.annotations {
            names.extend(annotation.type_arguments().flat_map(|t| t.declared_names()));
        }
    }
    names
}
