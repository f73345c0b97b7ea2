//! Descriptor layer
//!
//! Languages describe node shapes: classifiers, their features, and the datatypes
//! properties may hold. A `Language` is immutable once built and is shared by every
//! partition that uses it.
//!
//! # Design Principles
//!
//! - Feature kind and declared type form one closed enum
//! - Multiplicity is data, not a type hierarchy
//! - Inherited features are flattened most-general-first
//! - Structural problems are rejected when the language is built, never at mutation time

mod errors;
mod language;
mod loader;
mod types;

pub use errors::{LanguageError, LanguageErrorCode, LanguageResult, Severity};
pub use language::Language;
pub use loader::LanguageLoader;
pub use types::{
    Classifier, ClassifierKind, DataType, Enumeration, Feature, FeatureKind, LanguageDefinition,
    Multiplicity, PrimitiveType,
};
