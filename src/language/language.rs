//! Resolved, queryable language
//!
//! A `Language` is built once from a `LanguageDefinition`, checked for structural
//! soundness, and is immutable afterwards. Inherited features are flattened per
//! classifier in most-general-first order:
//!
//! 1. features of the super concept chain, root first
//! 2. features of implemented interfaces, depth first, in declaration order
//! 3. the classifier's own features
//!
//! A feature reachable along several paths appears once, at its first position.

use std::collections::{HashMap, HashSet};

use super::errors::{LanguageError, LanguageResult};
use super::types::{Classifier, DataType, Enumeration, Feature, FeatureKind, LanguageDefinition};

/// Immutable, queryable schema
#[derive(Debug, Clone)]
pub struct Language {
    key: String,
    name: String,
    version: String,
    classifiers: Vec<Classifier>,
    enumerations: Vec<Enumeration>,
    classifier_index: HashMap<String, usize>,
    enumeration_index: HashMap<String, usize>,
    /// Flattened features per classifier key
    all_features: HashMap<String, Vec<Feature>>,
    /// Reflexive, transitive super types per classifier key
    supertypes: HashMap<String, HashSet<String>>,
}

impl Language {
    /// Builds a language from its definition.
    ///
    /// # Errors
    ///
    /// Returns `LanguageError` if keys collide, references do not resolve, a property
    /// is declared multiple, or inheritance is cyclic.
    pub fn new(definition: LanguageDefinition) -> LanguageResult<Self> {
        let LanguageDefinition {
            key,
            name,
            version,
            classifiers,
            enumerations,
        } = definition;

        if key.trim().is_empty() {
            return Err(LanguageError::malformed("<language>", "key must not be empty"));
        }

        let mut classifier_index = HashMap::new();
        for (i, classifier) in classifiers.iter().enumerate() {
            if classifier_index.insert(classifier.key.clone(), i).is_some() {
                return Err(LanguageError::duplicate(&classifier.key));
            }
        }

        let mut enumeration_index = HashMap::new();
        for (i, enumeration) in enumerations.iter().enumerate() {
            if classifier_index.contains_key(&enumeration.key)
                || enumeration_index.insert(enumeration.key.clone(), i).is_some()
            {
                return Err(LanguageError::duplicate(&enumeration.key));
            }
            let mut seen = HashSet::new();
            for literal in &enumeration.literals {
                if !seen.insert(literal.as_str()) {
                    return Err(LanguageError::duplicate(format!(
                        "{}.{}",
                        enumeration.key, literal
                    )));
                }
            }
        }

        let mut language = Self {
            key,
            name,
            version,
            classifiers,
            enumerations,
            classifier_index,
            enumeration_index,
            all_features: HashMap::new(),
            supertypes: HashMap::new(),
        };

        language.check_structure()?;
        language.check_acyclic()?;

        let mut all_features = HashMap::new();
        let mut supertypes = HashMap::new();
        for classifier in &language.classifiers {
            let mut features = Vec::new();
            language.collect_features(
                &classifier.key,
                &mut HashSet::new(),
                &mut features,
                &mut HashSet::new(),
            );
            all_features.insert(classifier.key.clone(), features);

            let mut supers = HashSet::new();
            language.collect_supertypes(&classifier.key, &mut supers);
            supertypes.insert(classifier.key.clone(), supers);
        }
        language.all_features = all_features;
        language.supertypes = supertypes;

        Ok(language)
    }

    fn check_structure(&self) -> LanguageResult<()> {
        let mut feature_keys = HashSet::new();

        for classifier in &self.classifiers {
            if let Some(parent) = &classifier.extends {
                if classifier.is_interface() {
                    return Err(LanguageError::malformed(
                        &classifier.key,
                        "interfaces extend other interfaces through 'implements'",
                    ));
                }
                match self.classifier(parent) {
                    Some(p) if !p.is_interface() => {}
                    Some(_) => {
                        return Err(LanguageError::malformed(
                            &classifier.key,
                            format!("cannot extend interface '{}'", parent),
                        ))
                    }
                    None => return Err(LanguageError::unresolved(&classifier.key, parent)),
                }
            }

            for interface in &classifier.implements {
                match self.classifier(interface) {
                    Some(i) if i.is_interface() => {}
                    Some(_) => {
                        return Err(LanguageError::malformed(
                            &classifier.key,
                            format!("'{}' is not an interface", interface),
                        ))
                    }
                    None => return Err(LanguageError::unresolved(&classifier.key, interface)),
                }
            }

            for feature in &classifier.features {
                if !feature_keys.insert(feature.key.as_str()) {
                    return Err(LanguageError::duplicate(&feature.key));
                }
                match &feature.kind {
                    FeatureKind::Property { data_type } => {
                        if feature.is_multiple() {
                            return Err(LanguageError::malformed(
                                &feature.key,
                                "properties must be single-valued",
                            ));
                        }
                        if let DataType::Enumeration { enumeration } = data_type {
                            if self.enumeration(enumeration).is_none() {
                                return Err(LanguageError::unresolved(&feature.key, enumeration));
                            }
                        }
                    }
                    FeatureKind::Containment { classifier: target }
                    | FeatureKind::Reference { classifier: target } => {
                        if self.classifier(target).is_none() {
                            return Err(LanguageError::unresolved(&feature.key, target));
                        }
                    }
                }
            }
        }

        Ok(())
    }

    fn check_acyclic(&self) -> LanguageResult<()> {
        // 0 = unvisited, 1 = on stack, 2 = done
        let mut state: HashMap<&str, u8> = HashMap::new();

        fn visit<'a>(
            language: &'a Language,
            key: &'a str,
            state: &mut HashMap<&'a str, u8>,
        ) -> LanguageResult<()> {
            match state.get(key) {
                Some(1) => return Err(LanguageError::cycle(key)),
                Some(2) => return Ok(()),
                _ => {}
            }
            state.insert(key, 1);
            if let Some(classifier) = language.classifier(key) {
                for parent in language.direct_supertypes(classifier) {
                    visit(language, parent, state)?;
                }
            }
            state.insert(key, 2);
            Ok(())
        }

        for classifier in &self.classifiers {
            visit(self, &classifier.key, &mut state)?;
        }
        Ok(())
    }

    fn direct_supertypes<'a>(&self, classifier: &'a Classifier) -> impl Iterator<Item = &'a str> {
        classifier
            .extends
            .iter()
            .chain(classifier.implements.iter())
            .map(String::as_str)
    }

    fn collect_features(
        &self,
        key: &str,
        visited: &mut HashSet<String>,
        out: &mut Vec<Feature>,
        seen: &mut HashSet<String>,
    ) {
        if !visited.insert(key.to_string()) {
            return;
        }
        let Some(classifier) = self.classifier(key) else {
            return;
        };
        for parent in self.direct_supertypes(classifier) {
            self.collect_features(parent, visited, out, seen);
        }
        for feature in &classifier.features {
            if seen.insert(feature.key.clone()) {
                out.push(feature.clone());
            }
        }
    }

    fn collect_supertypes(&self, key: &str, out: &mut HashSet<String>) {
        if !out.insert(key.to_string()) {
            return;
        }
        if let Some(classifier) = self.classifier(key) {
            for parent in self.direct_supertypes(classifier) {
                self.collect_supertypes(parent, out);
            }
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn classifier(&self, key: &str) -> Option<&Classifier> {
        self.classifier_index.get(key).map(|&i| &self.classifiers[i])
    }

    pub fn classifiers(&self) -> impl Iterator<Item = &Classifier> {
        self.classifiers.iter()
    }

    pub fn enumeration(&self, key: &str) -> Option<&Enumeration> {
        self.enumeration_index.get(key).map(|&i| &self.enumerations[i])
    }

    /// Own and inherited features of a classifier, most general first.
    ///
    /// Unknown classifiers have no features.
    pub fn all_features(&self, classifier: &str) -> &[Feature] {
        self.all_features
            .get(classifier)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Looks up a feature applicable to the given classifier
    pub fn feature_of(&self, classifier: &str, feature_key: &str) -> Option<&Feature> {
        self.all_features(classifier)
            .iter()
            .find(|f| f.key == feature_key)
    }

    /// Looks up a feature anywhere in the language
    pub fn feature(&self, feature_key: &str) -> Option<&Feature> {
        self.classifiers
            .iter()
            .flat_map(|c| c.features.iter())
            .find(|f| f.key == feature_key)
    }

    /// Reflexive, transitive subtype check over extends and implements
    pub fn is_subtype(&self, sub: &str, sup: &str) -> bool {
        self.supertypes
            .get(sub)
            .map(|s| s.contains(sup))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::errors::LanguageErrorCode;
    use crate::language::types::{Multiplicity, PrimitiveType};

    fn definition(classifiers: Vec<Classifier>) -> LanguageDefinition {
        LanguageDefinition {
            key: "shapes".into(),
            name: "Shapes".into(),
            version: "1".into(),
            classifiers,
            enumerations: vec![Enumeration::new("Color", ["red", "green"])],
        }
    }

    fn string_prop(key: &str, multiplicity: Multiplicity) -> Feature {
        Feature::property(key, DataType::primitive(PrimitiveType::String), multiplicity)
    }

    fn sample() -> Language {
        Language::new(definition(vec![
            Classifier::interface("INamed").with_feature(string_prop("name", Multiplicity::OptionalSingle)),
            Classifier::interface("IKeyed")
                .implementing("INamed")
                .with_feature(string_prop("uuid", Multiplicity::RequiredSingle)),
            Classifier::abstract_concept("Shape")
                .implementing("IKeyed")
                .with_feature(Feature::property(
                    "color",
                    DataType::enumeration("Color"),
                    Multiplicity::OptionalSingle,
                )),
            Classifier::concept("Circle")
                .extending("Shape")
                .implementing("INamed")
                .with_feature(Feature::property(
                    "r",
                    DataType::primitive(PrimitiveType::Integer),
                    Multiplicity::RequiredSingle,
                )),
        ]))
        .unwrap()
    }

    #[test]
    fn test_features_most_general_first() {
        let language = sample();
        let keys: Vec<_> = language
            .all_features("Circle")
            .iter()
            .map(|f| f.key.as_str())
            .collect();
        assert_eq!(keys, vec!["name", "uuid", "color", "r"]);
    }

    #[test]
    fn test_subtype_is_reflexive_and_transitive() {
        let language = sample();
        assert!(language.is_subtype("Circle", "Circle"));
        assert!(language.is_subtype("Circle", "Shape"));
        assert!(language.is_subtype("Circle", "INamed"));
        assert!(language.is_subtype("Shape", "INamed"));
        assert!(!language.is_subtype("Shape", "Circle"));
        assert!(!language.is_subtype("Unknown", "Shape"));
    }

    #[test]
    fn test_feature_lookup() {
        let language = sample();
        assert!(language.feature_of("Circle", "uuid").is_some());
        assert!(language.feature_of("Shape", "r").is_none());
        assert_eq!(language.feature("r").map(|f| f.is_required()), Some(true));
        assert!(language.all_features("Nope").is_empty());
    }

    #[test]
    fn test_duplicate_classifier_rejected() {
        let err = Language::new(definition(vec![
            Classifier::concept("A"),
            Classifier::concept("A"),
        ]))
        .unwrap_err();
        assert_eq!(err.code(), LanguageErrorCode::MetaLanguageDuplicate);
    }

    #[test]
    fn test_duplicate_feature_key_rejected() {
        let err = Language::new(definition(vec![
            Classifier::concept("A").with_feature(string_prop("x", Multiplicity::OptionalSingle)),
            Classifier::concept("B").with_feature(string_prop("x", Multiplicity::OptionalSingle)),
        ]))
        .unwrap_err();
        assert_eq!(err.code(), LanguageErrorCode::MetaLanguageDuplicate);
    }

    #[test]
    fn test_unresolved_target_rejected() {
        let err = Language::new(definition(vec![Classifier::concept("A").with_feature(
            Feature::containment("kids", "Missing", Multiplicity::OptionalMultiple),
        )]))
        .unwrap_err();
        assert_eq!(err.code(), LanguageErrorCode::MetaLanguageUnresolved);
    }

    #[test]
    fn test_multiple_property_rejected() {
        let err = Language::new(definition(vec![
            Classifier::concept("A").with_feature(string_prop("tags", Multiplicity::OptionalMultiple)),
        ]))
        .unwrap_err();
        assert_eq!(err.code(), LanguageErrorCode::MetaLanguageMalformed);
    }

    #[test]
    fn test_inheritance_cycle_rejected() {
        let err = Language::new(definition(vec![
            Classifier::concept("A").extending("B"),
            Classifier::concept("B").extending("A"),
        ]))
        .unwrap_err();
        assert_eq!(err.code(), LanguageErrorCode::MetaLanguageCycle);
    }

    #[test]
    fn test_concept_cannot_extend_interface() {
        let err = Language::new(definition(vec![
            Classifier::interface("I"),
            Classifier::concept("A").extending("I"),
        ]))
        .unwrap_err();
        assert_eq!(err.code(), LanguageErrorCode::MetaLanguageMalformed);
    }
}
