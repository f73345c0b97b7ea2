//! Language error types
//!
//! Error codes:
//! - META_LANGUAGE_MALFORMED (REJECT)
//! - META_LANGUAGE_UNRESOLVED (REJECT)
//! - META_LANGUAGE_DUPLICATE (REJECT)
//! - META_LANGUAGE_CYCLE (REJECT)
//! - META_LANGUAGE_IO (FATAL)

use std::fmt;

/// Severity levels for language errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Definition rejected, nothing registered
    Reject,
    /// Loader cannot continue
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Language-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageErrorCode {
    /// Structurally invalid definition
    MetaLanguageMalformed,
    /// A type or super type reference does not resolve
    MetaLanguageUnresolved,
    /// Two elements share a key
    MetaLanguageDuplicate,
    /// Inheritance cycle
    MetaLanguageCycle,
    /// Definition file could not be read
    MetaLanguageIo,
}

impl LanguageErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            LanguageErrorCode::MetaLanguageMalformed => "META_LANGUAGE_MALFORMED",
            LanguageErrorCode::MetaLanguageUnresolved => "META_LANGUAGE_UNRESOLVED",
            LanguageErrorCode::MetaLanguageDuplicate => "META_LANGUAGE_DUPLICATE",
            LanguageErrorCode::MetaLanguageCycle => "META_LANGUAGE_CYCLE",
            LanguageErrorCode::MetaLanguageIo => "META_LANGUAGE_IO",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            LanguageErrorCode::MetaLanguageIo => Severity::Fatal,
            _ => Severity::Reject,
        }
    }
}

impl fmt::Display for LanguageErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Language error with full context
#[derive(Debug)]
pub struct LanguageError {
    code: LanguageErrorCode,
    message: String,
    /// Key of the offending element, if any
    element: Option<String>,
}

impl LanguageError {
    pub fn malformed(element: impl Into<String>, reason: impl Into<String>) -> Self {
        let element = element.into();
        Self {
            code: LanguageErrorCode::MetaLanguageMalformed,
            message: format!("'{}': {}", element, reason.into()),
            element: Some(element),
        }
    }

    pub fn unresolved(element: impl Into<String>, target: impl Into<String>) -> Self {
        let element = element.into();
        Self {
            code: LanguageErrorCode::MetaLanguageUnresolved,
            message: format!("'{}' refers to unknown '{}'", element, target.into()),
            element: Some(element),
        }
    }

    pub fn duplicate(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            code: LanguageErrorCode::MetaLanguageDuplicate,
            message: format!("Key '{}' is declared more than once", key),
            element: Some(key),
        }
    }

    pub fn cycle(classifier: impl Into<String>) -> Self {
        let classifier = classifier.into();
        Self {
            code: LanguageErrorCode::MetaLanguageCycle,
            message: format!("Classifier '{}' inherits from itself", classifier),
            element: Some(classifier),
        }
    }

    pub fn io(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            code: LanguageErrorCode::MetaLanguageIo,
            message: format!("Cannot read language file '{}': {}", path.into(), reason.into()),
            element: None,
        }
    }

    pub fn code(&self) -> LanguageErrorCode {
        self.code
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn element(&self) -> Option<&str> {
        self.element.as_deref()
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for LanguageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code.code(), self.message)
    }
}

impl std::error::Error for LanguageError {}

/// Result type for language operations
pub type LanguageResult<T> = Result<T, LanguageError>;
