//! Type-model transformation for XML Schema code generation.
//!
//! An importer turns an XML Schema into a [`SchemaIr`]: generated class and
//! enum declarations whose XML identity lives in serializer annotations. This
//! crate rewrites that model into what the emitter should produce (nullable
//! optionals, list or array collections, mixed-content text, element order,
//! capitalized identifiers, imported types left out) without changing the
//! XML the types serialize to.
//!
//! ```rust
//! use xsd2_core::{transform, Member, SchemaIr, TransformOptions, TypeDeclaration, TypeReference};
//!
//! let mut schema = SchemaIr::new("order.xsd");
//! schema.push(
//!     TypeDeclaration::class("order")
//!         .with_member(
//!             Member::element("id", TypeReference::scalar("int")).with_occurs(0, Some(1)),
//!         ),
//! );
//!
//! let result = transform(schema, &TransformOptions::all()).unwrap();
//! let order = &result.schema.types[0];
//! assert_eq!(order.name, "Order");
//! assert_eq!(order.members[0].name, "Id");
//! assert!(order.members[0].declared_type.is_nullable());
//! ```

pub mod annotation;
pub mod capitalizer;
pub mod combine;
pub mod config;
pub mod error;
pub mod extract;
pub mod identity;
pub mod ir;
pub mod passes;
pub mod report;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

pub use annotation::{Annotation, AnnotationKind, Argument, ArgumentValue, Literal};
pub use capitalizer::Capitalizer;
pub use combine::combine;
pub use config::TransformOptions;
pub use error::{ErrorCode, TransformError};
pub use identity::XmlIdentity;
pub use ir::{
    ChoiceAlternative, Member, MemberKind, SchemaIr, TypeDeclaration, TypeId, TypeKind,
    TypeReference,
};
pub use report::{Diagnostic, DiagnosticKind, Rename, TransformReport};

use passes::{
    p1_strip_annotations, p2_exclude_imports, p3_nullable, p4_collections, p5_mixed_content,
    p6_preserve_order, p7_capitalize,
};

/// A transformed IR and what the run changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformResult {
    pub schema: SchemaIr,
    pub report: TransformReport,
}

/// Run the transformation pipeline over one IR.
///
/// Consumes the IR: on error nothing partially rewritten is handed back.
pub fn transform(
    schema: SchemaIr,
    options: &TransformOptions,
) -> Result<TransformResult, TransformError> {
    transform_with_imports(schema, &BTreeSet::new(), options)
}

/// [`transform`], with identities of imported schemas for identity-mode
/// exclusion.
pub fn transform_with_imports(
    mut schema: SchemaIr,
    imported: &BTreeSet<XmlIdentity>,
    options: &TransformOptions,
) -> Result<TransformResult, TransformError> {
    let strip = options.validate()?;
    let mut report = TransformReport::new();
    tracing::debug!(source = %schema.source, types = schema.types.len(), "transforming schema");

    p1_strip_annotations::strip_annotations(&mut schema, &strip).merge_into_report(&mut report);
    extract::recover_identities(&mut schema)?;
    p2_exclude_imports::exclude_imported_types(&mut schema, imported, options)?
        .merge_into_report(&mut report);
    p3_nullable::wrap_nullable(&mut schema, options).merge_into_report(&mut report);
    p4_collections::select_collection_shape(&mut schema, options).merge_into_report(&mut report);
    p5_mixed_content::enable_mixed_content(&mut schema, options)?.merge_into_report(&mut report);
    p6_preserve_order::preserve_order(&mut schema, options).merge_into_report(&mut report);
    p7_capitalize::capitalize(&mut schema, options)?.merge_into_report(&mut report);

    Ok(TransformResult { schema, report })
}

/// Inputs of one generation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// IRs to transform and emit.
    pub inputs: Vec<SchemaIr>,
    /// IRs of imported schemas. Only read for the XML identities they define.
    #[serde(default)]
    pub imports: Vec<SchemaIr>,
}

/// Output units of one generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOutput {
    pub namespace: String,
    /// One unit per input, or a single unit when outputs are combined.
    pub units: Vec<SchemaIr>,
    pub report: TransformReport,
}

/// Transform every input and, when configured, combine the results.
pub fn generate(
    request: GenerationRequest,
    options: &TransformOptions,
) -> Result<GenerationOutput, TransformError> {
    let strip = options.validate()?;
    let imported = imported_identities(&request.imports, &strip)?;

    let mut report = TransformReport::new();
    let mut units = Vec::with_capacity(request.inputs.len());
    for input in request.inputs {
        let result = transform_with_imports(input, &imported, options)?;
        report.extend(result.report);
        units.push(result.schema);
    }

    if options.combine_outputs {
        let (combined, result) = combine(units, options)?;
        result.merge_into_report(&mut report);
        units = vec![combined];
    }

    Ok(GenerationOutput {
        namespace: options.output_namespace.clone(),
        units,
        report,
    })
}

/// XML identities defined by imported schemas, read the same way the inputs
/// are: after stripping the configured annotations.
pub fn imported_identities(
    imports: &[SchemaIr],
    strip: &BTreeSet<AnnotationKind>,
) -> Result<BTreeSet<XmlIdentity>, TransformError> {
    let mut identities = BTreeSet::new();
    for import in imports {
        let mut schema = import.clone();
        p1_strip_annotations::strip_annotations(&mut schema, strip);
        let label = format!("import `{}`", schema.source);
        extract::recover_identities(&mut schema).map_err(|e| e.within(&label))?;
        for decl in &schema.types {
            identities.insert(extract::type_identity(decl)?);
        }
    }
    tracing::debug!(
        imports = imports.len(),
        identities = identities.len(),
        "collected imported identities"
    );
    Ok(identities)
}
