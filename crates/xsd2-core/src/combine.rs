//! Multi-schema combination.
//!
//! Several schema inputs often import the same common schema, so each of
//! their IRs carries its own copy of the shared types. [`combine`] unions the
//! transformed IRs into one output unit, keeping one declaration per XML
//! identity (name and namespace).
//!
//! - Inputs are visited in caller order, declarations in import order; the
//!   first copy of an identity wins.
//! - A later copy with a different member list is still dropped, and a
//!   `MergeConflict` diagnostic records it.
//! - A merged type stays excluded only if every copy was excluded.
//! - Distinct identities that share a generated name are disambiguated with
//!   numeric suffixes; references inside each input follow their own types.

use std::collections::{HashMap, HashSet};

use crate::config::TransformOptions;
use crate::error::TransformError;
use crate::extract::type_identity;
use crate::identity::XmlIdentity;
use crate::ir::{MemberKind, SchemaIr, TypeDeclaration};
use crate::passes::pass_utils::unique_name;
use crate::passes::PassResult;
use crate::report::{Diagnostic, DiagnosticKind, Rename};

/// Where each declaration of one input ends up.
enum Placement {
    /// New identity, moved into the output under this name.
    New(String),
    /// Duplicate of the output declaration at this index.
    Merged(usize),
}

/// Combine transformed IRs into a single unit named after
/// `output_namespace`.
pub fn combine(
    units: Vec<SchemaIr>,
    config: &TransformOptions,
) -> Result<(SchemaIr, PassResult), TransformError> {
    let mut output = SchemaIr::new(config.output_namespace.clone());
    let mut sources: Vec<String> = Vec::new();
    let mut by_identity: HashMap<XmlIdentity, usize> = HashMap::new();
    let mut taken: HashSet<String> = HashSet::new();
    let mut result = PassResult::empty();

    for mut unit in units {
        let identities = unit
            .types
            .iter()
            .map(|decl| {
                type_identity(decl).map_err(|e| e.within(&format!("input `{}`", unit.source)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        // Plan every declaration first so references can be rewritten at once.
        let mut placements = Vec::with_capacity(unit.types.len());
        let mut aliases: HashMap<String, String> = HashMap::new();
        let mut next_index = output.types.len();
        for (decl, identity) in unit.types.iter().zip(&identities) {
            let placement = match by_identity.get(identity) {
                Some(&index) => {
                    let kept_name = if index < output.types.len() {
                        output.types[index].name.clone()
                    } else {
                        planned_name(&placements, index - output.types.len())
                    };
                    if kept_name != decl.name {
                        aliases.insert(decl.name.clone(), kept_name);
                    }
                    Placement::Merged(index)
                }
                None => {
                    let Some(name) =
                        unique_name(&decl.name, &taken, config.disambiguation_limit)
                    else {
                        return Err(TransformError::UniquenessViolation {
                            scope: format!("namespace `{}`", config.output_namespace),
                            names: vec![decl.name.clone()],
                        });
                    };
                    taken.insert(name.clone());
                    by_identity.insert(identity.clone(), next_index);
                    next_index += 1;
                    if name != decl.name {
                        tracing::debug!(
                            type_name = %decl.name,
                            assigned = %name,
                            "renamed clashing type"
                        );
                        result.renames.push(Rename::Type {
                            from: decl.name.clone(),
                            to: name.clone(),
                        });
                        aliases.insert(decl.name.clone(), name.clone());
                    }
                    Placement::New(name)
                }
            };
            placements.push(placement);
        }

        unit.rename_type_references(&aliases);

        let planned = unit.types.into_iter().zip(identities).zip(placements);
        for ((mut decl, identity), placement) in planned {
            match placement {
                Placement::New(name) => {
                    decl.name = name;
                    output.types.push(decl);
                    sources.push(unit.source.clone());
                }
                Placement::Merged(index) => {
                    let kept = &mut output.types[index];
                    kept.excluded &= decl.excluded;
                    if signature(kept) != signature(&decl) {
                        tracing::warn!(
                            identity = %identity,
                            kept = %sources[index],
                            dropped = %unit.source,
                            "conflicting definitions of merged type"
                        );
                        result.diagnostics.push(Diagnostic {
                            subject: identity.to_string(),
                            kind: DiagnosticKind::MergeConflict {
                                kept_source: sources[index].clone(),
                                dropped_source: unit.source.clone(),
                            },
                            message: format!(
                                "`{identity}` differs between inputs; \
                                 keeping the definition from `{}`",
                                sources[index]
                            ),
                        });
                    }
                }
            }
        }
    }

    tracing::debug!(types = output.types.len(), namespace = %output.source, "combined inputs");
    Ok((output, result))
}

/// Name planned for the `offset`-th new declaration of the current input.
fn planned_name(placements: &[Placement], offset: usize) -> String {
    placements
        .iter()
        .filter_map(|p| match p {
            Placement::New(name) => Some(name),
            Placement::Merged(_) => None,
        })
        .nth(offset)
        .cloned()
        .unwrap_or_default()
}

/// Member list as XML sees it.
fn signature(decl: &TypeDeclaration) -> Vec<(&str, MemberKind)> {
    decl.members.iter().map(|m| (m.xml_name(), m.kind)).collect()
}
