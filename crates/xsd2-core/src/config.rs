//! Configuration for type-model transformation.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::annotation::AnnotationKind;
use crate::capitalizer::Capitalizer;
use crate::error::TransformError;

/// Marker emitted on every generated class by the serializer generator.
pub const DEBUGGER_STEP_THROUGH: &str = "System.Diagnostics.DebuggerStepThroughAttribute";
/// Markers unavailable on portable targets.
pub const PORTABLE_UNSUPPORTED: &[&str] = &[
    "System.SerializableAttribute",
    "System.ComponentModel.DesignerCategoryAttribute",
];

/// Options for type-model transformation.
///
/// ## Serialization Format
///
/// Fields are serialized in `kebab-case` (e.g., `use-lists`,
/// `attributes-to-strip`); capitalizers use their string form (`word:3`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct TransformOptions {
    /// Wrap optional scalar members in a nullable type.
    pub nullable_types: bool,
    /// Record element declaration order on element annotations.
    pub preserve_order: bool,
    /// Use list-shaped collections instead of fixed arrays.
    pub use_lists: bool,
    /// Give mixed-content types a text-carrying member.
    pub mixed_content: bool,
    /// Exclude imported types that no local type references.
    pub exclude_imported_types: bool,
    /// Exclude imported types by XML name and namespace, even when referenced.
    pub exclude_imported_types_by_xml_identity: bool,
    /// Annotation kinds removed from every node, by name.
    pub attributes_to_strip: BTreeSet<String>,
    pub property_capitalizer: Capitalizer,
    pub type_capitalizer: Capitalizer,
    pub enum_capitalizer: Capitalizer,
    /// Namespace of the generated output unit.
    pub output_namespace: String,
    /// Combine all inputs into a single output unit.
    pub combine_outputs: bool,
    /// Highest numeric suffix tried when disambiguating a name.
    /// `0` disables suffixes: any collision is fatal.
    pub disambiguation_limit: u32,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            nullable_types: false,
            preserve_order: false,
            use_lists: false,
            mixed_content: false,
            exclude_imported_types: false,
            exclude_imported_types_by_xml_identity: false,
            attributes_to_strip: BTreeSet::new(),
            property_capitalizer: Capitalizer::None,
            type_capitalizer: Capitalizer::None,
            enum_capitalizer: Capitalizer::None,
            output_namespace: "Xsd2".to_string(),
            combine_outputs: false,
            disambiguation_limit: 1000,
        }
    }
}

impl TransformOptions {
    /// The common set of flags: nullable types, lists, mixed content,
    /// imported-type exclusion, first-character capitalization everywhere and
    /// no debugger markers.
    pub fn all() -> Self {
        Self {
            nullable_types: true,
            use_lists: true,
            mixed_content: true,
            exclude_imported_types: true,
            property_capitalizer: Capitalizer::FirstCharacter,
            type_capitalizer: Capitalizer::FirstCharacter,
            enum_capitalizer: Capitalizer::FirstCharacter,
            ..Self::default()
        }
        .with_debug_attributes_stripped()
    }

    pub fn with_debug_attributes_stripped(mut self) -> Self {
        self.attributes_to_strip
            .insert(DEBUGGER_STEP_THROUGH.to_string());
        self
    }

    /// Strip the markers a portable class library cannot reference.
    pub fn with_portable_target(mut self) -> Self {
        self.attributes_to_strip
            .extend(PORTABLE_UNSUPPORTED.iter().map(|s| s.to_string()));
        self
    }

    /// Check option domains and resolve the strip set to annotation kinds.
    pub fn validate(&self) -> Result<BTreeSet<AnnotationKind>, TransformError> {
        if self.output_namespace.trim().is_empty() && self.combine_outputs {
            return Err(TransformError::invalid_option(
                "output-namespace",
                "a combined output needs a namespace",
            ));
        }

        self.attributes_to_strip
            .iter()
            .map(|name| {
                let name = name.trim();
                if name.is_empty() {
                    Err(TransformError::invalid_option(
                        "attributes-to-strip",
                        "annotation names must not be empty",
                    ))
                } else {
                    Ok(AnnotationKind::from_name(name))
                }
            })
            .collect()
    }
}
