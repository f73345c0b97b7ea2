//! Language loader
//!
//! - One JSON file per language version, `*.json` in the language directory
//! - Non-JSON files are skipped
//! - A registered (key, version) pair is immutable

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::errors::{LanguageError, LanguageResult};
use super::language::Language;
use super::types::LanguageDefinition;
use crate::observability::{log_event, Event, Logger};

/// Reads language definitions from disk and keeps an in-memory registry.
pub struct LanguageLoader {
    language_dir: PathBuf,
    languages: HashMap<(String, String), Arc<Language>>,
    logger: Logger,
}

impl LanguageLoader {
    pub fn new(language_dir: &Path) -> Self {
        Self {
            language_dir: language_dir.to_path_buf(),
            languages: HashMap::new(),
            logger: Logger::default(),
        }
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    pub fn language_dir(&self) -> &Path {
        &self.language_dir
    }

    /// Loads every language file in the directory.
    ///
    /// A missing directory is not an error; it simply holds no languages.
    pub fn load_all(&mut self) -> LanguageResult<usize> {
        if !self.language_dir.exists() {
            return Ok(0);
        }

        let entries = fs::read_dir(&self.language_dir).map_err(|e| {
            LanguageError::io(self.language_dir.display().to_string(), e.to_string())
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                LanguageError::io(self.language_dir.display().to_string(), e.to_string())
            })?;
            let path = entry.path();
            if path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }
            paths.push(path);
        }
        // Directory order is platform-dependent
        paths.sort();

        for path in &paths {
            self.load_file(path)?;
        }

        Ok(paths.len())
    }

    /// Loads a single language file and registers it.
    pub fn load_file(&mut self, path: &Path) -> LanguageResult<Arc<Language>> {
        let content = fs::read_to_string(path)
            .map_err(|e| LanguageError::io(path.display().to_string(), e.to_string()))?;

        let definition: LanguageDefinition = serde_json::from_str(&content).map_err(|e| {
            LanguageError::malformed(path.display().to_string(), format!("Invalid JSON: {}", e))
        })?;

        let language = self.register(Language::new(definition)?)?;

        let path_str = path.display().to_string();
        log_event(
            &self.logger,
            Event::LanguageLoaded,
            &[
                ("language", language.key()),
                ("path", path_str.as_str()),
                ("version", language.version()),
            ],
        );

        Ok(language)
    }

    /// Registers an already-built language.
    pub fn register(&mut self, language: Language) -> LanguageResult<Arc<Language>> {
        let key = (language.key().to_string(), language.version().to_string());
        if self.languages.contains_key(&key) {
            return Err(LanguageError::duplicate(format!("{}@{}", key.0, key.1)));
        }

        let language = Arc::new(language);
        self.languages.insert(key, Arc::clone(&language));
        log_event(
            &self.logger,
            Event::LanguageRegistered,
            &[("language", language.key()), ("version", language.version())],
        );
        Ok(language)
    }

    pub fn get(&self, key: &str, version: &str) -> Option<Arc<Language>> {
        self.languages
            .get(&(key.to_string(), version.to_string()))
            .cloned()
    }

    pub fn exists(&self, key: &str, version: &str) -> bool {
        self.get(key, version).is_some()
    }

    /// All registered versions of a language key, sorted
    pub fn versions(&self, key: &str) -> Vec<&str> {
        let mut versions: Vec<&str> = self
            .languages
            .keys()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect();
        versions.sort();
        versions
    }

    pub fn len(&self) -> usize {
        self.languages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }
}
