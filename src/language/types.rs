//! Descriptor type definitions
//!
//! Supported datatypes:
//! - Boolean
//! - Integer: 64-bit signed integer
//! - String: UTF-8 string
//! - Json: arbitrary JSON document
//! - Enumeration: one of a fixed, ordered set of literal keys
//!
//! Feature kinds and their declared types form one closed enum so a property can never
//! carry a classifier type and a link can never carry a datatype.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Built-in primitive datatypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
    Boolean,
    Integer,
    String,
    Json,
}

impl PrimitiveType {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Integer => "integer",
            PrimitiveType::String => "string",
            PrimitiveType::Json => "json",
        }
    }
}

/// Declared type of a property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DataType {
    /// One of the built-in primitives
    Primitive {
        primitive: PrimitiveType,
    },
    /// A language-defined enumeration, by key
    Enumeration {
        enumeration: String,
    },
}

impl DataType {
    pub fn primitive(primitive: PrimitiveType) -> Self {
        DataType::Primitive { primitive }
    }

    pub fn enumeration(key: impl Into<String>) -> Self {
        DataType::Enumeration {
            enumeration: key.into(),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Primitive { primitive } => write!(f, "{}", primitive.type_name()),
            DataType::Enumeration { enumeration } => write!(f, "enum {}", enumeration),
        }
    }
}

/// Whether a feature holds one value or a sequence, and whether it is mandatory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Multiplicity {
    OptionalSingle,
    RequiredSingle,
    OptionalMultiple,
    RequiredMultiple,
}

impl Multiplicity {
    pub fn is_multiple(&self) -> bool {
        matches!(self, Multiplicity::OptionalMultiple | Multiplicity::RequiredMultiple)
    }

    pub fn is_required(&self) -> bool {
        matches!(self, Multiplicity::RequiredSingle | Multiplicity::RequiredMultiple)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Multiplicity::OptionalSingle => "0..1",
            Multiplicity::RequiredSingle => "1",
            Multiplicity::OptionalMultiple => "0..*",
            Multiplicity::RequiredMultiple => "1..*",
        }
    }
}

/// Feature kind paired with its declared value type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FeatureKind {
    /// Scalar data
    Property {
        #[serde(rename = "datatype")]
        data_type: DataType,
    },
    /// Owned child or children of the given classifier
    Containment { classifier: String },
    /// Non-owning pointer(s) to nodes of the given classifier
    Reference { classifier: String },
}

impl FeatureKind {
    pub fn is_containment(&self) -> bool {
        matches!(self, FeatureKind::Containment { .. })
    }

    pub fn is_link(&self) -> bool {
        !matches!(self, FeatureKind::Property { .. })
    }

    /// Returns the classifier key for links
    pub fn link_target(&self) -> Option<&str> {
        match self {
            FeatureKind::Property { .. } => None,
            FeatureKind::Containment { classifier } | FeatureKind::Reference { classifier } => {
                Some(classifier)
            }
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            FeatureKind::Property { .. } => "property",
            FeatureKind::Containment { .. } => "containment",
            FeatureKind::Reference { .. } => "reference",
        }
    }
}

/// A named, typed slot on a classifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    /// Language-unique key
    pub key: String,
    pub name: String,
    #[serde(flatten)]
    pub kind: FeatureKind,
    pub multiplicity: Multiplicity,
}

impl Feature {
    pub fn property(
        key: impl Into<String>,
        data_type: DataType,
        multiplicity: Multiplicity,
    ) -> Self {
        let key = key.into();
        Self {
            name: key.clone(),
            key,
            kind: FeatureKind::Property { data_type },
            multiplicity,
        }
    }

    pub fn containment(
        key: impl Into<String>,
        classifier: impl Into<String>,
        multiplicity: Multiplicity,
    ) -> Self {
        let key = key.into();
        Self {
            name: key.clone(),
            key,
            kind: FeatureKind::Containment {
                classifier: classifier.into(),
            },
            multiplicity,
        }
    }

    pub fn reference(
        key: impl Into<String>,
        classifier: impl Into<String>,
        multiplicity: Multiplicity,
    ) -> Self {
        let key = key.into();
        Self {
            name: key.clone(),
            key,
            kind: FeatureKind::Reference {
                classifier: classifier.into(),
            },
            multiplicity,
        }
    }

    /// Overrides the display name (defaults to the key)
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn is_multiple(&self) -> bool {
        self.multiplicity.is_multiple()
    }

    pub fn is_required(&self) -> bool {
        self.multiplicity.is_required()
    }
}

impl AsRef<str> for Feature {
    fn as_ref(&self) -> &str {
        &self.key
    }
}

/// Schema-level kind of a classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ClassifierKind {
    Concept {
        #[serde(default, rename = "abstract")]
        is_abstract: bool,
        /// Instances are meant to be partition roots
        #[serde(default)]
        partition: bool,
    },
    Interface,
    Annotation,
}

/// Schema-level type of a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classifier {
    pub key: String,
    pub name: String,
    #[serde(flatten)]
    pub kind: ClassifierKind,
    /// Super concept (concepts only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    /// Implemented interfaces, or extended interfaces for an interface
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub implements: Vec<String>,
    /// Own features in declaration order
    #[serde(default)]
    pub features: Vec<Feature>,
}

impl Classifier {
    pub fn concept(key: impl Into<String>) -> Self {
        Self::with_kind(
            key,
            ClassifierKind::Concept {
                is_abstract: false,
                partition: false,
            },
        )
    }

    pub fn abstract_concept(key: impl Into<String>) -> Self {
        Self::with_kind(
            key,
            ClassifierKind::Concept {
                is_abstract: true,
                partition: false,
            },
        )
    }

    pub fn partition_concept(key: impl Into<String>) -> Self {
        Self::with_kind(
            key,
            ClassifierKind::Concept {
                is_abstract: false,
                partition: true,
            },
        )
    }

    pub fn interface(key: impl Into<String>) -> Self {
        Self::with_kind(key, ClassifierKind::Interface)
    }

    pub fn annotation(key: impl Into<String>) -> Self {
        Self::with_kind(key, ClassifierKind::Annotation)
    }

    fn with_kind(key: impl Into<String>, kind: ClassifierKind) -> Self {
        let key = key.into();
        Self {
            name: key.clone(),
            key,
            kind,
            extends: None,
            implements: Vec::new(),
            features: Vec::new(),
        }
    }

    pub fn extending(mut self, parent: impl Into<String>) -> Self {
        self.extends = Some(parent.into());
        self
    }

    pub fn implementing(mut self, interface: impl Into<String>) -> Self {
        self.implements.push(interface.into());
        self
    }

    pub fn with_feature(mut self, feature: Feature) -> Self {
        self.features.push(feature);
        self
    }

    /// Whether nodes of this classifier may be created directly
    pub fn is_instantiable(&self) -> bool {
        match self.kind {
            ClassifierKind::Concept { is_abstract, .. } => !is_abstract,
            ClassifierKind::Interface => false,
            ClassifierKind::Annotation => true,
        }
    }

    pub fn is_interface(&self) -> bool {
        matches!(self.kind, ClassifierKind::Interface)
    }
}

/// Language-defined enumeration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enumeration {
    pub key: String,
    pub name: String,
    /// Literal keys in declaration order
    pub literals: Vec<String>,
}

impl Enumeration {
    pub fn new<I, S>(key: impl Into<String>, literals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let key = key.into();
        Self {
            name: key.clone(),
            key,
            literals: literals.into_iter().map(Into::into).collect(),
        }
    }

    pub fn has_literal(&self, literal: &str) -> bool {
        self.literals.iter().any(|l| l == literal)
    }
}

/// Serialized form of a language, as read by the loader
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageDefinition {
    pub key: String,
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub classifiers: Vec<Classifier>,
    #[serde(default)]
    pub enumerations: Vec<Enumeration>,
}
