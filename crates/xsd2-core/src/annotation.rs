//! Declarative metadata attached to IR nodes.
//!
//! The importer decides the [`AnnotationKind`] of every annotation once, when
//! it builds the IR. Everything downstream matches on the kind; argument slots
//! are either positional or named, and carry a literal, a type reference or an
//! opaque expression.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TransformError;
use crate::ir::TypeReference;

/// Named argument slots recognized by the extractor.
pub mod args {
    pub const NAME: &str = "Name";
    pub const TYPE_NAME: &str = "TypeName";
    pub const ELEMENT_NAME: &str = "ElementName";
    pub const ATTRIBUTE_NAME: &str = "AttributeName";
    pub const NAMESPACE: &str = "Namespace";
    pub const ANONYMOUS_TYPE: &str = "AnonymousType";
    pub const INCLUDE_IN_SCHEMA: &str = "IncludeInSchema";
    pub const TYPE: &str = "Type";
    pub const DATA_TYPE: &str = "DataType";
    pub const ORDER: &str = "Order";
}

/// Closed vocabulary of annotation kinds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationKind {
    Element,
    Attribute,
    /// Wrapper element of an array member.
    Array,
    ArrayItem,
    Enum,
    Root,
    Type,
    Text,
    Ignore,
    ChoiceIdentifier,
    /// Opaque to the engine; passed through untouched unless stripped.
    Other(String),
}

impl AnnotationKind {
    /// Kinds whose arguments may carry the node's XML name.
    ///
    /// An array wrapper names the wrapper element, not the member's items, so
    /// it is not one of them.
    pub fn is_name_bearing(&self) -> bool {
        matches!(
            self,
            Self::Element | Self::Attribute | Self::ArrayItem | Self::Enum | Self::Root | Self::Type
        )
    }

    /// Resolve a configured annotation name.
    ///
    /// Accepts the short form (`XmlElement`), the attribute-class form
    /// (`XmlElementAttribute`) and the fully qualified serializer form
    /// (`System.Xml.Serialization.XmlElementAttribute`). Anything else is an
    /// opaque kind compared by its full name.
    pub fn from_name(name: &str) -> Self {
        let short = name
            .strip_prefix("System.Xml.Serialization.")
            .unwrap_or(name);
        let short = short.strip_suffix("Attribute").unwrap_or(short);
        match short {
            "XmlElement" => Self::Element,
            "XmlAttribute" => Self::Attribute,
            "XmlArray" => Self::Array,
            "XmlArrayItem" => Self::ArrayItem,
            "XmlEnum" => Self::Enum,
            "XmlRoot" => Self::Root,
            "XmlType" => Self::Type,
            "XmlText" => Self::Text,
            "XmlIgnore" => Self::Ignore,
            "XmlChoiceIdentifier" => Self::ChoiceIdentifier,
            _ => Self::Other(name.to_string()),
        }
    }
}

impl fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Element => "XmlElement",
            Self::Attribute => "XmlAttribute",
            Self::Array => "XmlArray",
            Self::ArrayItem => "XmlArrayItem",
            Self::Enum => "XmlEnum",
            Self::Root => "XmlRoot",
            Self::Type => "XmlType",
            Self::Text => "XmlText",
            Self::Ignore => "XmlIgnore",
            Self::ChoiceIdentifier => "XmlChoiceIdentifier",
            Self::Other(name) => name,
        };
        f.write_str(name)
    }
}

/// A literal argument value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Bool(bool),
    Int(i64),
    String(String),
}

/// Value in an argument slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ArgumentValue {
    Literal(Literal),
    /// A `typeof(T)`-style type reference.
    TypeOf(TypeReference),
    /// Computed expression; its source text is kept for diagnostics only.
    Expression(String),
}

impl ArgumentValue {
    pub fn string(value: impl Into<String>) -> Self {
        Self::Literal(Literal::String(value.into()))
    }

    pub fn bool(value: bool) -> Self {
        Self::Literal(Literal::Bool(value))
    }

    pub fn int(value: i64) -> Self {
        Self::Literal(Literal::Int(value))
    }

    pub fn is_string_literal(&self) -> bool {
        matches!(self, Self::Literal(Literal::String(_)))
    }

    pub fn as_type(&self) -> Option<&TypeReference> {
        match self {
            Self::TypeOf(t) => Some(t),
            _ => None,
        }
    }

    /// Read a string literal; anything else is a caller contract violation.
    pub fn expect_str(&self, node: &str, slot: &str) -> Result<&str, TransformError> {
        match self {
            Self::Literal(Literal::String(s)) => Ok(s),
            other => Err(TransformError::mismatch(
                node,
                format!("argument `{slot}` must be a string literal, found {other}"),
            )),
        }
    }

    /// Read a boolean literal; anything else is a caller contract violation.
    pub fn expect_bool(&self, node: &str, slot: &str) -> Result<bool, TransformError> {
        match self {
            Self::Literal(Literal::Bool(b)) => Ok(*b),
            other => Err(TransformError::mismatch(
                node,
                format!("argument `{slot}` must be a boolean literal, found {other}"),
            )),
        }
    }
}

impl fmt::Display for ArgumentValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(Literal::String(s)) => write!(f, "string literal {s:?}"),
            Self::Literal(Literal::Bool(b)) => write!(f, "boolean literal {b}"),
            Self::Literal(Literal::Int(i)) => write!(f, "integer literal {i}"),
            Self::TypeOf(t) => write!(f, "type reference `{}`", t.base_name()),
            Self::Expression(e) => write!(f, "expression `{e}`"),
        }
    }
}

/// One argument slot: positional when `name` is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
    #[serde(default)]
    pub name: Option<String>,
    pub value: ArgumentValue,
}

impl Argument {
    pub fn positional(value: ArgumentValue) -> Self {
        Self { name: None, value }
    }

    pub fn named(name: impl Into<String>, value: ArgumentValue) -> Self {
        Self {
            name: Some(name.into()),
            value,
        }
    }

    pub fn is_positional(&self) -> bool {
        self.name.as_deref().map_or(true, str::is_empty)
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.name.as_deref() == Some(name)
    }
}

/// An annotation attached to a type or member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub kind: AnnotationKind,
    #[serde(default)]
    pub arguments: Vec<Argument>,
}

impl Annotation {
    pub fn new(kind: AnnotationKind) -> Self {
        Self {
            kind,
            arguments: Vec::new(),
        }
    }

    pub fn with_positional(mut self, value: ArgumentValue) -> Self {
        self.arguments.push(Argument::positional(value));
        self
    }

    pub fn with_named(mut self, name: &str, value: ArgumentValue) -> Self {
        self.arguments.push(Argument::named(name, value));
        self
    }

    /// `Element("name", typeof(T))`, the shape used for choice alternatives.
    pub fn element_alternative(element_name: &str, type_ref: TypeReference) -> Self {
        Self::new(AnnotationKind::Element)
            .with_positional(ArgumentValue::string(element_name))
            .with_positional(ArgumentValue::TypeOf(type_ref))
    }

    pub fn named(&self, name: &str) -> Option<&ArgumentValue> {
        self.arguments
            .iter()
            .find(|a| a.has_name(name))
            .map(|a| &a.value)
    }

    pub fn has_named(&self, name: &str) -> bool {
        self.named(name).is_some()
    }

    pub fn positional(&self) -> impl Iterator<Item = &ArgumentValue> {
        self.arguments
            .iter()
            .filter(|a| a.is_positional())
            .map(|a| &a.value)
    }

    /// Replace the named argument, or append it when absent.
    pub fn set_named(&mut self, name: &str, value: ArgumentValue) {
        match self.arguments.iter_mut().find(|a| a.has_name(name)) {
            Some(argument) => argument.value = value,
            None => self.arguments.push(Argument::named(name, value)),
        }
    }

    /// Every `TypeOf` argument, positional or named.
    pub fn type_arguments(&self) -> impl Iterator<Item = &TypeReference> {
        self.arguments.iter().filter_map(|a| a.value.as_type())
    }

    pub(crate) fn rename_type_references(&mut self, renames: &HashMap<String, String>) {
        for argument in &mut self.arguments {
            if let ArgumentValue::TypeOf(type_ref) = &mut argument.value {
                type_ref.rename(renames);
            }
        }
    }
}
