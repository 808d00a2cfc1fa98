use std::fmt::{Display, Formatter};
use std::sync::Mutex;

use serde::Serialize;

/// Non-fatal problem found while reading the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ConfigWarning {
    /// Both the generic and the legacy property of a resource are set, the generic one wins.
    PrecedenceConflict {
        resource: String,
        key: String,
        value: String,
        overridden_key: String,
        overridden_value: String,
    },
}

impl Display for ConfigWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigWarning::PrecedenceConflict {
                key,
                value,
                overridden_key,
                overridden_value,
                ..
            } => write!(
                f,
                "Configuration {key}={value} is overriding the {overridden_key}={overridden_value} property"
            ),
        }
    }
}

pub trait DiagnosticSink: Send + Sync {
    fn warn(&self, warning: ConfigWarning);
}

/// Forwards warnings to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn warn(&self, warning: ConfigWarning) {
        log::warn!("{warning}");
    }
}

/// Keeps warnings in memory so that they can be reported together with the result.
#[derive(Debug, Default)]
pub struct CollectingSink {
    warnings: Mutex<Vec<ConfigWarning>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn warnings(&self) -> Vec<ConfigWarning> {
        self.warnings
            .lock()
            .unwrap_or_else(|error| error.into_inner())
            .clone()
    }

    pub fn into_warnings(self) -> Vec<ConfigWarning> {
        self.warnings
            .into_inner()
            .unwrap_or_else(|error| error.into_inner())
    }
}

impl DiagnosticSink for CollectingSink {
    fn warn(&self, warning: ConfigWarning) {
        self.warnings
            .lock()
            .unwrap_or_else(|error| error.into_inner())
            .push(warning);
    }
}
