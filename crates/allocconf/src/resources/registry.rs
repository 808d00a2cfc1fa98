use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::common::error::AllocConfError;
use crate::common::parser2::{is_valid_identifier_char, is_valid_starting_identifier_char};
use crate::config::ConfigSource;
use crate::config::schema::ConfigSchema;
use crate::resources::units::UnitConverter;
use crate::resources::{
    MEMORY_DEFAULT_UNIT, MEMORY_RESOURCE_NAME, VCORES_DEFAULT_UNIT, VCORES_RESOURCE_NAME,
};

const BUILTIN_TYPE_COUNT: usize = 2;

/// Tokens of the resource value grammar that cannot be used as resource type names.
const RESERVED_NAMES: &[&str] = &[MEMORY_RESOURCE_NAME, VCORES_RESOURCE_NAME, "mb", "cpu"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceTypeInfo {
    pub name: String,
    /// Canonical unit symbol, empty for countable resources
    pub unit: String,
}

impl ResourceTypeInfo {
    pub fn new(name: impl Into<String>, unit: impl Into<String>) -> Self {
        ResourceTypeInfo {
            name: name.into(),
            unit: unit.into(),
        }
    }
}

/// Ordered list of resource types known to the cluster.
///
/// Memory and compute cores always occupy the first two positions, extension types
/// follow in the order in which they were declared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceTypeRegistry {
    types: Vec<ResourceTypeInfo>,
}

impl Default for ResourceTypeRegistry {
    fn default() -> Self {
        ResourceTypeRegistry {
            types: builtin_types(),
        }
    }
}

fn builtin_types() -> Vec<ResourceTypeInfo> {
    vec![
        ResourceTypeInfo::new(MEMORY_RESOURCE_NAME, MEMORY_DEFAULT_UNIT),
        ResourceTypeInfo::new(VCORES_RESOURCE_NAME, VCORES_DEFAULT_UNIT),
    ]
}

fn validate_name(name: &str) -> crate::Result<()> {
    let mut chars = name.chars();
    let valid = chars.next().is_some_and(is_valid_starting_identifier_char)
        && chars.all(is_valid_identifier_char);
    if !valid {
        return Err(AllocConfError::RegistryError(format!(
            "`{name}` is not a valid resource name"
        )));
    }
    let lowercase = name.to_lowercase();
    if RESERVED_NAMES.contains(&lowercase.as_str()) {
        return Err(AllocConfError::RegistryError(format!(
            "`{name}` is a reserved resource name"
        )));
    }
    Ok(())
}

impl ResourceTypeRegistry {
    /// Creates a registry with the built-in types followed by `extensions`.
    pub fn with_extensions(
        extensions: Vec<ResourceTypeInfo>,
        converter: &dyn UnitConverter,
    ) -> crate::Result<Self> {
        let mut seen = HashSet::new();
        for info in &extensions {
            validate_name(&info.name)?;
            if !seen.insert(info.name.to_lowercase()) {
                return Err(AllocConfError::RegistryError(format!(
                    "Resource `{}` is defined more than once",
                    info.name
                )));
            }
            if !converter.is_known(&info.unit) {
                return Err(AllocConfError::RegistryError(format!(
                    "Resource `{}` uses unknown unit `{}`",
                    info.name, info.unit
                )));
            }
        }

        let mut types = builtin_types();
        types.extend(extensions);
        Ok(ResourceTypeRegistry { types })
    }

    /// Reads extension types from the comma separated list stored under
    /// [`ConfigSchema::resource_types_key`]. The unit of each type is read from
    /// its `.units` property and defaults to the empty unit.
    pub fn from_config(
        config: &dyn ConfigSource,
        schema: &ConfigSchema,
        converter: &dyn UnitConverter,
    ) -> crate::Result<Self> {
        let extensions = config
            .lookup(schema.resource_types_key())
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(|name| {
                        let unit = config
                            .lookup(&schema.units_key(name))
                            .map(str::trim)
                            .unwrap_or_default();
                        ResourceTypeInfo::new(name, unit)
                    })
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        let registry = Self::with_extensions(extensions, converter)?;
        log::debug!("Registered resource types: {:?}", registry.types);
        Ok(registry)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceTypeInfo> {
        self.types.iter()
    }

    pub fn get(&self, index: usize) -> Option<&ResourceTypeInfo> {
        self.types.get(index)
    }

    pub fn extensions(&self) -> &[ResourceTypeInfo] {
        &self.types[BUILTIN_TYPE_COUNT..]
    }

    /// Finds an extension type by its name, ignoring case.
    pub fn find_extension(&self, name: &str) -> Option<(usize, &ResourceTypeInfo)> {
        self.types
            .iter()
            .enumerate()
            .skip(BUILTIN_TYPE_COUNT)
            .find(|(_, info)| info.name.eq_ignore_ascii_case(name))
    }
}
