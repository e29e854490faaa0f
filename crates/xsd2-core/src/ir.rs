//! Intermediate representation of the types generated from one XML Schema.
//!
//! The schema importer builds a [`SchemaIr`] once; pipeline passes then mutate
//! its declarations in place by [`TypeId`] handle, and the emitter (or the
//! combiner) consumes the final state read-only.
//!
//! ## Serialization Format
//!
//! Fields are serialized in `snake_case`; enums carrying data are tagged with a
//! `kind` field. This is the exchange format between the importer, the engine
//! and the emitter.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::annotation::Annotation;

/// Reserved name of a choice-container member.
pub const ITEMS_MEMBER_NAME: &str = "Items";

/// Stable handle of a [`TypeDeclaration`] inside a [`SchemaIr`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub usize);

/// All type declarations produced from one schema input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaIr {
    /// Label of the input this IR was imported from (usually a file name).
    #[serde(default)]
    pub source: String,
    /// Declarations in importer order.
    #[serde(default)]
    pub types: Vec<TypeDeclaration>,
}

impl SchemaIr {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            types: Vec::new(),
        }
    }

    /// Append a declaration and return its handle.
    pub fn push(&mut self, decl: TypeDeclaration) -> TypeId {
        self.types.push(decl);
        TypeId(self.types.len() - 1)
    }

    pub fn get(&self, id: TypeId) -> &TypeDeclaration {
        &self.types[id.0]
    }

    pub fn get_mut(&mut self, id: TypeId) -> &mut TypeDeclaration {
        &mut self.types[id.0]
    }

    /// Find a declaration by its current generated name.
    pub fn find(&self, name: &str) -> Option<TypeId> {
        self.types.iter().position(|t| t.name == name).map(TypeId)
    }

    /// Whether `type_ref` is scalar-valued: a value builtin or an enum
    /// declared in this schema.
    pub fn is_scalar(&self, type_ref: &TypeReference) -> bool {
        match type_ref {
            TypeReference::Scalar { .. } => true,
            TypeReference::Declared { name } => self
                .find(name)
                .is_some_and(|id| self.get(id).kind == TypeKind::Enum),
            _ => false,
        }
    }

    /// Point every reference to a renamed generated type at its new name.
    ///
    /// All renames apply at once, so `a -> b` and `b -> c` never chain. Covers
    /// member types, choice alternatives and `TypeOf` annotation arguments on
    /// both types and members. Declaration names themselves are untouched.
    pub fn rename_type_references(&mut self, renames: &HashMap<String, String>) {
        if renames.is_empty() {
            return;
        }
        for decl in &mut self.types {
            for annotation in &mut decl.annotations {
                annotation.rename_type_references(renames);
            }
            for member in &mut decl.members {
                member.declared_type.rename(renames);
                for alternative in &mut member.alternatives {
                    alternative.type_ref.rename(renames);
                }
                for annotation in &mut member.annotations {
                    annotation.rename_type_references(renames);
                }
            }
        }
    }
}

/// Whether a declaration is a class-like type or an enumeration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    #[default]
    Class,
    Enum,
}

/// One generated class, struct or enum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDeclaration {
    /// Generated identifier. Rewritten by capitalization and merging.
    pub name: String,
    #[serde(default)]
    pub kind: TypeKind,
    /// XML name recovered from the annotations. Set once, never changed.
    #[serde(default)]
    pub original_xml_name: Option<String>,
    #[serde(default)]
    pub xml_namespace: Option<String>,
    #[serde(default)]
    pub is_anonymous: bool,
    #[serde(default)]
    pub is_root: bool,
    #[serde(default = "default_true")]
    pub include_in_schema: bool,
    /// The source complex type allows mixed text content.
    #[serde(default)]
    pub is_mixed: bool,
    /// The importer produced this type from an imported schema.
    #[serde(default)]
    pub imported: bool,
    /// Excluded types stay in the arena but are not emitted.
    #[serde(default)]
    pub excluded: bool,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

fn default_true() -> bool {
    true
}

impl TypeDeclaration {
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            original_xml_name: None,
            xml_namespace: None,
            is_anonymous: false,
            is_root: false,
            include_in_schema: true,
            is_mixed: false,
            imported: false,
            excluded: false,
            members: Vec::new(),
            annotations: Vec::new(),
        }
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Class)
    }

    pub fn enumeration(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Enum)
    }

    pub fn with_member(mut self, member: Member) -> Self {
        self.members.push(member);
        self
    }

    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// The XML name this declaration maps back to, falling back to the
    /// generated name before identity recovery has run.
    pub fn xml_name(&self) -> &str {
        self.original_xml_name.as_deref().unwrap_or(&self.name)
    }

    /// Human-readable identity used in error messages.
    pub fn label(&self) -> String {
        match self.xml_namespace.as_deref() {
            Some(ns) if !ns.is_empty() => {
                format!("type `{}` ({{{}}}{})", self.name, ns, self.xml_name())
            }
            _ => format!("type `{}` ({})", self.name, self.xml_name()),
        }
    }
}

/// Role a member plays in the XML serialization of its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    Element,
    Attribute,
    /// Carries the text nodes of a mixed-content type.
    Text,
    /// Synthetic "Items" container standing for a choice of elements.
    ItemsChoice,
    /// A literal of an enumeration type.
    EnumValue,
}

/// A field or property of a [`TypeDeclaration`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
    /// XML name recovered from the annotations. Set once, never changed.
    #[serde(default)]
    pub original_xml_name: Option<String>,
    pub kind: MemberKind,
    pub declared_type: TypeReference,
    #[serde(default = "default_one")]
    pub min_occurs: u32,
    /// `None` means unbounded.
    #[serde(default = "default_max_occurs")]
    pub max_occurs: Option<u32>,
    #[serde(default)]
    pub xml_data_type: Option<String>,
    /// Element alternatives of an `ItemsChoice` member, in source order.
    #[serde(default)]
    pub alternatives: Vec<ChoiceAlternative>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

fn default_one() -> u32 {
    1
}

fn default_max_occurs() -> Option<u32> {
    Some(1)
}

impl Member {
    pub fn new(name: impl Into<String>, kind: MemberKind, declared_type: TypeReference) -> Self {
        Self {
            name: name.into(),
            original_xml_name: None,
            kind,
            declared_type,
            min_occurs: 1,
            max_occurs: Some(1),
            xml_data_type: None,
            alternatives: Vec::new(),
            annotations: Vec::new(),
        }
    }

    pub fn element(name: impl Into<String>, declared_type: TypeReference) -> Self {
        Self::new(name, MemberKind::Element, declared_type)
    }

    pub fn attribute(name: impl Into<String>, declared_type: TypeReference) -> Self {
        Self::new(name, MemberKind::Attribute, declared_type)
    }

    pub fn enum_value(name: impl Into<String>) -> Self {
        Self::new(name, MemberKind::EnumValue, TypeReference::scalar("int"))
    }

    /// A choice container with one element annotation per alternative.
    ///
    /// Items are typed by the alternatives' common type, or `object` when
    /// the alternatives differ.
    pub fn items_choice(alternatives: Vec<ChoiceAlternative>) -> Self {
        let element = match alternatives.split_first() {
            Some((first, rest)) if rest.iter().all(|a| a.type_ref == first.type_ref) => {
                first.type_ref.clone()
            }
            _ => TypeReference::object("object"),
        };
        let annotations = alternatives
            .iter()
            .map(|a| Annotation::element_alternative(&a.element_name, a.type_ref.clone()))
            .collect();
        Self {
            max_occurs: None,
            alternatives,
            annotations,
            ..Self::new(
                ITEMS_MEMBER_NAME,
                MemberKind::ItemsChoice,
                TypeReference::array(element),
            )
        }
    }

    pub fn with_occurs(mut self, min_occurs: u32, max_occurs: Option<u32>) -> Self {
        self.min_occurs = min_occurs;
        self.max_occurs = max_occurs;
        self
    }

    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// The XML name this member maps back to, falling back to the generated
    /// name before identity recovery has run.
    pub fn xml_name(&self) -> &str {
        self.original_xml_name.as_deref().unwrap_or(&self.name)
    }

    /// More than one occurrence allowed.
    pub fn is_multiple(&self) -> bool {
        self.max_occurs.map_or(true, |max| max > 1)
    }

    pub fn is_items_choice(&self) -> bool {
        self.kind == MemberKind::ItemsChoice && self.name == ITEMS_MEMBER_NAME
    }
}

/// One element alternative of a choice container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceAlternative {
    pub element_name: String,
    pub type_ref: TypeReference,
}

impl ChoiceAlternative {
    pub fn new(element_name: impl Into<String>, type_ref: TypeReference) -> Self {
        Self {
            element_name: element_name.into(),
            type_ref,
        }
    }
}

/// Type of a member or annotation argument. Plain value semantics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeReference {
    /// Value-typed builtin (`int`, `bool`, `DateTime`, …).
    Scalar { name: String },
    /// Reference-typed builtin (`string`, `object`, `XmlElement`, …).
    Object { name: String },
    /// A generated type, by its current generated name.
    Declared { name: String },
    Nullable { inner: Box<TypeReference> },
    List { element: Box<TypeReference> },
    Array { element: Box<TypeReference> },
}

impl TypeReference {
    pub fn scalar(name: impl Into<String>) -> Self {
        Self::Scalar { name: name.into() }
    }

    pub fn object(name: impl Into<String>) -> Self {
        Self::Object { name: name.into() }
    }

    pub fn declared(name: impl Into<String>) -> Self {
        Self::Declared { name: name.into() }
    }

    pub fn nullable(inner: TypeReference) -> Self {
        Self::Nullable {
            inner: Box::new(inner),
        }
    }

    pub fn list(element: TypeReference) -> Self {
        Self::List {
            element: Box::new(element),
        }
    }

    pub fn array(element: TypeReference) -> Self {
        Self::Array {
            element: Box::new(element),
        }
    }

    /// Innermost type name, looking through every wrapper.
    pub fn base_name(&self) -> &str {
        match self {
            Self::Scalar { name } | Self::Object { name } | Self::Declared { name } => name,
            Self::Nullable { inner } => inner.base_name(),
            Self::List { element } | Self::Array { element } => element.base_name(),
        }
    }

    /// Element type of a list or array.
    pub fn collection_element(&self) -> Option<&TypeReference> {
        match self {
            Self::List { element } | Self::Array { element } => Some(element),
            _ => None,
        }
    }

    pub fn is_collection(&self) -> bool {
        self.collection_element().is_some()
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, Self::Nullable { .. })
    }

    /// Every generated type name this reference depends on.
    pub fn declared_names(&self) -> Vec<&str> {
        match self {
            Self::Declared { name } => vec![name.as_str()],
            Self::Nullable { inner } => inner.declared_names(),
            Self::List { element } | Self::Array { element } => element.declared_names(),
            Self::Scalar { .. } | Self::Object { .. } => Vec::new(),
        }
    }

    pub(crate) fn rename(&mut self, renames: &HashMap<String, String>) {
        match self {
            Self::Declared { name } => {
                if let Some(to) = renames.get(name.as_str()) {
                    *name = to.clone();
                }
            }
            Self::Nullable { inner } => inner.rename(renames),
            Self::List { element } | Self::Array { element } => element.rename(renames),
            Self::Scalar { .. } | Self::Object { .. } => {}
        }
    }
}
