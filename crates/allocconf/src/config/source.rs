use std::collections::BTreeMap;
use std::path::Path;

use crate::config::ConfigSource;

/// Flat key/value configuration store.
///
/// Values are stored trimmed. Nested TOML tables are flattened into dotted keys,
/// so `[yarn.scheduler] increment-allocation-mb = 512` becomes
/// `yarn.scheduler.increment-allocation-mb = "512"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Configuration {
    values: BTreeMap<String, String>,
}

impl Configuration {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn from_toml(text: &str) -> crate::Result<Self> {
        let table: toml::Table = toml::from_str(text)?;
        let mut configuration = Configuration::new();
        for (key, value) in &table {
            flatten_value(key, value, &mut configuration.values);
        }
        Ok(configuration)
    }

    pub fn load(path: &Path) -> crate::Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|error| {
            std::io::Error::new(
                error.kind(),
                format!("Cannot read configuration file {}: {error}", path.display()),
            )
        })?;
        Self::from_toml(&text)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl AsRef<str>) {
        self.values
            .insert(key.into(), value.as_ref().trim().to_string());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl AsRef<str>) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

impl ConfigSource for Configuration {
    fn lookup(&self, key: &str) -> Option<&str> {
        self.get(key)
    }
}

fn flatten_value(key: &str, value: &toml::Value, values: &mut BTreeMap<String, String>) {
    match value {
        toml::Value::Table(table) => {
            for (name, value) in table {
                flatten_value(&format!("{key}.{name}"), value, values);
            }
        }
        toml::Value::Array(items) => {
            let joined = items.iter().map(scalar_to_string).collect::<Vec<_>>();
            values.insert(key.to_string(), joined.join(","));
        }
        value => {
            values.insert(key.to_string(), scalar_to_string(value));
        }
    }
}

fn scalar_to_string(value: &toml::Value) -> String {
    match value {
        toml::Value::String(value) => value.trim().to_string(),
        toml::Value::Integer(value) => value.to_string(),
        toml::Value::Float(value) => value.to_string(),
        toml::Value::Boolean(value) => value.to_string(),
        toml::Value::Datetime(value) => value.to_string(),
        value => value.to_string(),
    }
}
