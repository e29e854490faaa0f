//! Metadata extraction: recover XML identity from IR annotations.
//!
//! Every function here is pure. Missing metadata is never an error: each
//! lookup falls back as documented. The only failure is a
//! [`TransformError::ConfigurationOrSchemaMismatch`], raised when a slot that
//! must hold a literal holds a computed expression instead.
//!
//! [`recover_identities`] runs once per pipeline (right after annotation
//! stripping) and records the recovered values in the IR so later passes can
//! rename nodes freely.

use std::collections::BTreeSet;

use crate::annotation::{args, Annotation, AnnotationKind, ArgumentValue};
use crate::error::TransformError;
use crate::identity::{MemberMetadata, TypeMetadata, XmlIdentity};
use crate::ir::{
    ChoiceAlternative, Member, MemberKind, SchemaIr, TypeDeclaration, TypeReference,
    ITEMS_MEMBER_NAME,
};

/// An IR node carrying annotations.
pub trait Annotated {
    fn name(&self) -> &str;
    fn annotations(&self) -> &[Annotation];
    /// Identity of the node for error messages.
    fn label(&self) -> String;

    fn annotation(&self, kind: &AnnotationKind) -> Option<&Annotation> {
        self.annotations().iter().find(|a| &a.kind == kind)
    }
}

impl Annotated for TypeDeclaration {
    fn name(&self) -> &str {
        &self.name
    }

    fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    fn label(&self) -> String {
        TypeDeclaration::label(self)
    }
}

impl Annotated for Member {
    fn name(&self) -> &str {
        &self.name
    }

    fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    fn label(&self) -> String {
        format!("member `{}`", self.name)
    }
}

/// Lookup order of [`xml_name`]: annotation kind and its name slot.
const XML_NAME_SLOTS: [(AnnotationKind, &str); 4] = [
    (AnnotationKind::Type, args::TYPE_NAME),
    (AnnotationKind::Root, args::ELEMENT_NAME),
    (AnnotationKind::Element, args::ELEMENT_NAME),
    (AnnotationKind::Attribute, args::ATTRIBUTE_NAME),
];

// ---------------------------------------------------------------------------
// Names
// ---------------------------------------------------------------------------

/// The name a node had in the schema before any renaming.
///
/// A choice container keeps its reserved name. Otherwise the first
/// name-bearing annotation with a `Name` argument, or with a string literal
/// as its first positional argument, supplies the name. Falls back to the
/// node's current name.
pub fn original_name<N: Annotated + ?Sized>(node: &N) -> Result<String, TransformError> {
    if node.name() == ITEMS_MEMBER_NAME {
        return Ok(node.name().to_string());
    }

    for annotation in node.annotations().iter().filter(|a| a.kind.is_name_bearing()) {
        if let Some(value) = annotation.named(args::NAME) {
            return Ok(value.expect_str(&node.label(), args::NAME)?.to_string());
        }
        if let Some(value) = annotation
            .positional()
            .next()
            .filter(|v| v.is_string_literal())
        {
            return Ok(value.expect_str(&node.label(), "0")?.to_string());
        }
    }

    Ok(node.name().to_string())
}

/// The XML name of a node: type name, root element name, element name, then
/// attribute name; falls back to the node's current name.
pub fn xml_name<N: Annotated + ?Sized>(node: &N) -> Result<String, TransformError> {
    Ok(explicit_xml_name(node)?.unwrap_or_else(|| node.name().to_string()))
}

/// [`xml_name`] without the fallback.
pub fn explicit_xml_name<N: Annotated + ?Sized>(
    node: &N,
) -> Result<Option<String>, TransformError> {
    for (kind, slot) in &XML_NAME_SLOTS {
        if let Some(annotation) = node.annotation(kind) {
            if let Some(name) = annotation_name(annotation, slot, &node.label())? {
                return Ok(Some(name));
            }
        }
    }
    Ok(None)
}

/// Name held by one annotation: the named slot, else a leading positional
/// argument. A leading type reference is not a name.
fn annotation_name(
    annotation: &Annotation,
    slot: &str,
    node: &str,
) -> Result<Option<String>, TransformError> {
    if let Some(value) = annotation.named(slot) {
        return Ok(Some(value.expect_str(node, slot)?.to_string()));
    }

    match annotation.arguments.first() {
        Some(first) if first.is_positional() => match &first.value {
            ArgumentValue::TypeOf(_) => Ok(None),
            value => Ok(Some(value.expect_str(node, slot)?.to_string())),
        },
        _ => Ok(None),
    }
}

// ---------------------------------------------------------------------------
// Type-level flags
// ---------------------------------------------------------------------------

pub fn is_anonymous_type<N: Annotated + ?Sized>(node: &N) -> bool {
    node.annotation(&AnnotationKind::Type)
        .is_some_and(|a| a.has_named(args::ANONYMOUS_TYPE))
}

pub fn is_root_type<N: Annotated + ?Sized>(node: &N) -> bool {
    node.annotation(&AnnotationKind::Root).is_some()
}

/// True only when the type annotation explicitly says `IncludeInSchema = false`.
pub fn is_include_in_schema_false<N: Annotated + ?Sized>(
    node: &N,
) -> Result<bool, TransformError> {
    match node
        .annotation(&AnnotationKind::Type)
        .and_then(|a| a.named(args::INCLUDE_IN_SCHEMA))
    {
        Some(value) => Ok(!value.expect_bool(&node.label(), args::INCLUDE_IN_SCHEMA)?),
        None => Ok(false),
    }
}

/// Namespace from the type annotation.
///
/// `None` when there is no type annotation; `Some("")` when the annotation
/// exists without a `Namespace` argument (the default namespace).
pub fn namespace<N: Annotated + ?Sized>(node: &N) -> Result<Option<String>, TransformError> {
    let Some(annotation) = node.annotation(&AnnotationKind::Type) else {
        return Ok(None);
    };
    match annotation.named(args::NAMESPACE) {
        Some(value) => Ok(Some(value.expect_str(&node.label(), args::NAMESPACE)?.to_string())),
        None => Ok(Some(String::new())),
    }
}

// ---------------------------------------------------------------------------
// Member-level metadata
// ---------------------------------------------------------------------------

fn is_element_or_attribute(annotation: &Annotation) -> bool {
    matches!(
        annotation.kind,
        AnnotationKind::Element | AnnotationKind::Attribute
    )
}

/// Declared XML type carried by one element/attribute annotation.
///
/// An explicit `Type` argument wins; else the second positional argument
/// when it is a type; else a lone positional type argument.
fn annotation_type(
    annotation: &Annotation,
    node: &str,
) -> Result<Option<TypeReference>, TransformError> {
    if let Some(value) = annotation.named(args::TYPE) {
        return match value.as_type() {
            Some(type_ref) => Ok(Some(type_ref.clone())),
            None => Err(TransformError::mismatch(
                node,
                format!("argument `{}` must be a type reference, found {value}", args::TYPE),
            )),
        };
    }

    let positional: Vec<&ArgumentValue> = annotation.positional().collect();
    let candidate = match positional.as_slice() {
        [] => None,
        [only] => Some(*only),
        [_, second, ..] => Some(*second),
    };
    Ok(candidate.and_then(|v| v.as_type()).cloned())
}

/// Every declared XML type across the member's element/attribute annotations.
pub fn xml_types(member: &Member) -> Result<Vec<TypeReference>, TransformError> {
    let label = member.label();
    let mut types = Vec::new();
    for annotation in member.annotations.iter().filter(|a| is_element_or_attribute(a)) {
        if let Some(type_ref) = annotation_type(annotation, &label)? {
            types.push(type_ref);
        }
    }
    Ok(types)
}

/// `DataType` of the first element/attribute annotation.
pub fn xml_data_type(member: &Member) -> Result<Option<String>, TransformError> {
    let Some(annotation) = member.annotations.iter().find(|a| is_element_or_attribute(a)) else {
        return Ok(None);
    };
    annotation
        .named(args::DATA_TYPE)
        .map(|value| {
            value
                .expect_str(&member.label(), args::DATA_TYPE)
                .map(str::to_string)
        })
        .transpose()
}

/// Whether `type_ref` names `type_name` directly or as a collection element.
fn names_type(type_ref: &TypeReference, type_name: &str) -> bool {
    let direct =
        |t: &TypeReference| matches!(t, TypeReference::Declared { name } if name == type_name);
    direct(type_ref) || type_ref.collection_element().is_some_and(direct)
}

/// Element names under which `type_name` appears in any choice container.
///
/// Used to recover the XML names of a generated type that participates in a
/// choice.
pub fn names_from_items(schema: &SchemaIr, type_name: &str) -> Result<Vec<String>, TransformError> {
    let mut names = Vec::new();
    for decl in &schema.types {
        for member in decl.members.iter().filter(|m| m.name == ITEMS_MEMBER_NAME) {
            let label = format!("{}, {}", decl.label(), member.label());
            for annotation in member
                .annotations
                .iter()
                .filter(|a| a.kind == AnnotationKind::Element)
            {
                if !annotation.type_arguments().any(|t| names_type(t, type_name)) {
                    continue;
                }
                if let Some(name) = annotation_name(annotation, args::ELEMENT_NAME, &label)? {
                    names.push(name);
                }
            }
        }
    }
    Ok(names)
}

/// Choice alternatives declared by the element annotations of a container,
/// one per annotation, in annotation order.
pub fn choice_alternatives(member: &Member) -> Result<Vec<ChoiceAlternative>, TransformError> {
    let label = member.label();
    let fallback_type = member
        .declared_type
        .collection_element()
        .unwrap_or(&member.declared_type);

    let mut alternatives = Vec::new();
    for annotation in member
        .annotations
        .iter()
        .filter(|a| a.kind == AnnotationKind::Element)
    {
        let type_ref =
            annotation_type(annotation, &label)?.unwrap_or_else(|| fallback_type.clone());
        let element_name = match annotation_name(annotation, args::ELEMENT_NAME, &label)? {
            Some(name) => name,
            None => {
                tracing::debug!(
                    member = %member.name,
                    "choice alternative without element name, using type name"
                );
                type_ref.base_name().to_string()
            }
        };
        alternatives.push(ChoiceAlternative::new(element_name, type_ref));
    }
    Ok(alternatives)
}

// ---------------------------------------------------------------------------
// Annotation Model records
// ---------------------------------------------------------------------------

pub fn type_metadata(decl: &TypeDeclaration) -> Result<TypeMetadata, TransformError> {
    Ok(TypeMetadata {
        identity: XmlIdentity::new(xml_name(decl)?, namespace(decl)?),
        is_anonymous: is_anonymous_type(decl),
        is_root: is_root_type(decl),
        include_in_schema: !is_include_in_schema_false(decl)?,
    })
}

pub fn member_metadata(member: &Member) -> Result<MemberMetadata, TransformError> {
    Ok(MemberMetadata {
        xml_name: member_xml_name(member)?,
        data_type: xml_data_type(member)?,
        xml_types: xml_types(member)?,
        alternatives: if member.kind == MemberKind::ItemsChoice {
            choice_alternatives(member)?
        } else {
            Vec::new()
        },
    })
}

/// XML name of a member: the reserved container name, an explicit
/// element/attribute name, or the original name (enum literals).
fn member_xml_name(member: &Member) -> Result<String, TransformError> {
    if member.name == ITEMS_MEMBER_NAME {
        return Ok(member.name.clone());
    }
    match explicit_xml_name(member)? {
        Some(name) => Ok(name),
        None => original_name(member),
    }
}

/// XML identity of a declaration, preferring values already recovered.
pub fn type_identity(decl: &TypeDeclaration) -> Result<XmlIdentity, TransformError> {
    match &decl.original_xml_name {
        Some(name) => Ok(XmlIdentity::new(
            name.clone(),
            match &decl.xml_namespace {
                Some(ns) => Some(ns.clone()),
                None => namespace(decl)?,
            },
        )),
        None => Ok(type_metadata(decl)?.identity),
    }
}

// ---------------------------------------------------------------------------
// Identity recovery
// ---------------------------------------------------------------------------

struct Recovered {
    types: Vec<(TypeMetadata, Option<String>)>,
    members: Vec<Vec<MemberMetadata>>,
}

/// Record recovered XML metadata in the IR.
///
/// Values already present (from an earlier run or from the importer) are
/// kept, so `original_xml_name` is written at most once. Anonymous types
/// without an explicit name take the element name of the single choice
/// alternative that refers to them.
pub fn recover_identities(schema: &mut SchemaIr) -> Result<(), TransformError> {
    let recovered = collect(schema)?;

    for ((decl, (meta, choice_name)), members) in schema
        .types
        .iter_mut()
        .zip(recovered.types)
        .zip(recovered.members)
    {
        if decl.original_xml_name.is_none() {
            decl.original_xml_name = Some(choice_name.unwrap_or(meta.identity.name));
        }
        if decl.xml_namespace.is_none() {
            decl.xml_namespace = meta.identity.namespace;
        }
        decl.is_anonymous |= meta.is_anonymous;
        decl.is_root |= meta.is_root;
        decl.include_in_schema &= meta.include_in_schema;

        for (member, meta) in decl.members.iter_mut().zip(members) {
            if member.original_xml_name.is_none() {
                member.original_xml_name = Some(meta.xml_name);
            }
            if member.xml_data_type.is_none() {
                member.xml_data_type = meta.data_type;
            }
            if member.alternatives.is_empty() && member.kind == MemberKind::ItemsChoice {
                member.alternatives = meta.alternatives;
            }
        }
    }

    tracing::debug!(
        types = schema.types.len(),
        source = %schema.source,
        "recovered XML identities"
    );
    Ok(())
}

fn collect(schema: &SchemaIr) -> Result<Recovered, TransformError> {
    let mut types = Vec::with_capacity(schema.types.len());
    let mut members = Vec::with_capacity(schema.types.len());

    for decl in &schema.types {
        let meta = type_metadata(decl)?;
        let choice_name = if meta.is_anonymous && explicit_xml_name(decl)?.is_none() {
            let names: BTreeSet<String> =
                names_from_items(schema, &decl.name)?.into_iter().collect();
            (names.len() == 1).then(|| names.into_iter().next()).flatten()
        } else {
            None
        };
        types.push((meta, choice_name));

        let label = decl.label();
        members.push(
            decl.members
                .iter()
                .map(|m| member_metadata(m).map_err(|e| e.within(&label)))
                .collect::<Result<Vec<_>, _>>()?,
        );
    }

    Ok(Recovered { types, members })
}
