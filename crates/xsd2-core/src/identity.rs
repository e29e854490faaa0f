//! Read-only XML identity records recovered from IR annotations.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ir::{ChoiceAlternative, TypeReference};

/// XML name plus namespace; the deduplication key across schema inputs.
///
/// `namespace == None` means the namespace could not be determined, which is
/// distinct from `Some("")`, the explicit default namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct XmlIdentity {
    pub name: String,
    pub namespace: Option<String>,
}

impl XmlIdentity {
    pub fn new(name: impl Into<String>, namespace: Option<String>) -> Self {
        Self {
            name: name.into(),
            namespace,
        }
    }
}

impl fmt::Display for XmlIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.namespace.as_deref() {
            Some(ns) if !ns.is_empty() => write!(f, "{{{}}}{}", ns, self.name),
            _ => f.write_str(&self.name),
        }
    }
}

/// What the annotations of a type declaration say about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMetadata {
    pub identity: XmlIdentity,
    pub is_anonymous: bool,
    pub is_root: bool,
    pub include_in_schema: bool,
}

/// What the annotations of a member say about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberMetadata {
    pub xml_name: String,
    pub data_type: Option<String>,
    /// Declared XML types, one per element/attribute annotation carrying one.
    pub xml_types: Vec<TypeReference>,
    /// Element alternatives; only populated for choice containers.
    pub alternatives: Vec<ChoiceAlternative>,
}
