use std::fmt::{Display, Formatter};

use thiserror::Error;

use crate::common::error::AllocConfError::GenericError;

#[derive(Debug, Error)]
pub enum AllocConfError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error("Deserialization error: {0}")]
    DeserializationError(String),
    #[error(transparent)]
    MalformedValue(#[from] MalformedValue),
    #[error("Invalid resource types: {0}")]
    RegistryError(String),
    #[error("Error: {0}")]
    GenericError(String),
}

impl AllocConfError {
    /// Returns the malformed value description if this error was caused by one.
    pub fn as_malformed(&self) -> Option<&MalformedValue> {
        match self {
            AllocConfError::MalformedValue(value) => Some(value),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for AllocConfError {
    fn from(error: toml::de::Error) -> Self {
        Self::DeserializationError(error.to_string())
    }
}

impl From<anyhow::Error> for AllocConfError {
    fn from(error: anyhow::Error) -> Self {
        Self::GenericError(error.to_string())
    }
}

impl From<String> for AllocConfError {
    fn from(e: String) -> Self {
        GenericError(e)
    }
}

/// Reason why a configuration value was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedKind {
    /// The value does not follow the grammar expected in its context.
    Syntax(String),
    /// One of the mandatory resources is not present.
    MissingRequiredUnit(String),
    /// A term uses a unit or resource name that is not recognized.
    UnknownUnit(String),
    /// The same unit or resource name is used by more than one term.
    DuplicateUnit(String),
    /// Percentage and absolute terms are combined in a single value.
    MixedTerms,
    /// A term of a multi-term percentage does not name its resource.
    UnnamedTerm,
    /// The value cannot be expressed in the canonical unit of its resource.
    Conversion(String),
}

impl Display for MalformedKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MalformedKind::Syntax(message) => f.write_str(message),
            MalformedKind::MissingRequiredUnit(unit) => write!(f, "Missing resource: {unit}"),
            MalformedKind::UnknownUnit(unit) => write!(f, "Unknown unit or resource `{unit}`"),
            MalformedKind::DuplicateUnit(unit) => {
                write!(f, "Resource `{unit}` is specified more than once")
            }
            MalformedKind::MixedTerms => {
                f.write_str("Percentage and absolute amounts cannot be combined")
            }
            MalformedKind::UnnamedTerm => {
                f.write_str("Each percentage has to name its resource when multiple are given")
            }
            MalformedKind::Conversion(message) => f.write_str(message),
        }
    }
}

/// A configuration value that does not match the grammar required by its context.
///
/// Carries the offending property key (when known) and the raw value, so that the
/// caller can surface the message verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedValue {
    pub key: Option<String>,
    pub value: String,
    pub kind: MalformedKind,
}

impl MalformedValue {
    pub fn new(value: &str, kind: MalformedKind) -> Self {
        MalformedValue {
            key: None,
            value: value.to_string(),
            kind,
        }
    }

    pub fn for_key(key: &str, value: &str, kind: MalformedKind) -> Self {
        MalformedValue {
            key: Some(key.to_string()),
            value: value.to_string(),
            kind,
        }
    }
}

impl Display for MalformedValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.key {
            Some(key) => write!(
                f,
                "Property {key} has an invalid value \"{}\": {}",
                self.value, self.kind
            ),
            None => write!(
                f,
                "Invalid resource value \"{}\": {}",
                self.value, self.kind
            ),
        }
    }
}

impl std::error::Error for MalformedValue {}
