use derive_builder::Builder;

use crate::resources::{
    MEMORY_RESOURCE_NAME, ResourceAmount, ResourceTypeRegistry, VCORES_RESOURCE_NAME,
};

pub const INCREMENT_ALLOCATION_SUFFIX: &str = ".increment-allocation";
pub const UNITS_SUFFIX: &str = ".units";

pub const DEFAULT_MEMORY_INCREMENT_MB: ResourceAmount = 1024;
pub const DEFAULT_VCORES_INCREMENT: ResourceAmount = 1;

/// Names of the configuration properties read by the resolvers.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
#[builder(default)]
pub struct ConfigSchema {
    /// Comma separated list of extension resource types
    #[builder(setter(into))]
    resource_types_key: String,
    /// Prepended to `<name>.increment-allocation` and `<name>.units`
    #[builder(setter(into))]
    resource_type_prefix: String,
    #[builder(setter(into))]
    legacy_memory_increment_key: String,
    #[builder(setter(into))]
    legacy_vcores_increment_key: String,
    default_memory_increment: ResourceAmount,
    default_vcores_increment: ResourceAmount,
}

impl Default for ConfigSchema {
    fn default() -> Self {
        ConfigSchema {
            resource_types_key: "resource-types".to_string(),
            resource_type_prefix: String::new(),
            legacy_memory_increment_key: "increment-allocation-mb".to_string(),
            legacy_vcores_increment_key: "increment-allocation-vcores".to_string(),
            default_memory_increment: DEFAULT_MEMORY_INCREMENT_MB,
            default_vcores_increment: DEFAULT_VCORES_INCREMENT,
        }
    }
}

/// Legacy per-resource property that is consulted when the generic one is not set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyAlias {
    pub key: String,
    pub default: ResourceAmount,
}

/// Properties that configure the increment allocation of a single resource type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncrementOption {
    pub resource: String,
    /// Canonical unit of the resource
    pub unit: String,
    pub generic_key: String,
    pub legacy: Option<LegacyAlias>,
}

impl ConfigSchema {
    pub fn builder() -> ConfigSchemaBuilder {
        ConfigSchemaBuilder::default()
    }

    /// Property names used by YARN deployments.
    pub fn yarn() -> Self {
        ConfigSchema {
            resource_types_key: "yarn.resource-types".to_string(),
            resource_type_prefix: "yarn.resource-types.".to_string(),
            legacy_memory_increment_key: "yarn.scheduler.increment-allocation-mb".to_string(),
            legacy_vcores_increment_key: "yarn.scheduler.increment-allocation-vcores".to_string(),
            ..Default::default()
        }
    }

    pub fn resource_types_key(&self) -> &str {
        &self.resource_types_key
    }

    pub fn legacy_memory_increment_key(&self) -> &str {
        &self.legacy_memory_increment_key
    }

    pub fn legacy_vcores_increment_key(&self) -> &str {
        &self.legacy_vcores_increment_key
    }

    pub fn generic_increment_key(&self, resource: &str) -> String {
        format!(
            "{}{resource}{INCREMENT_ALLOCATION_SUFFIX}",
            self.resource_type_prefix
        )
    }

    pub fn units_key(&self, resource: &str) -> String {
        format!("{}{resource}{UNITS_SUFFIX}", self.resource_type_prefix)
    }

    /// Lists the increment properties of every registered type, in registry order.
    pub fn increment_options(&self, registry: &ResourceTypeRegistry) -> Vec<IncrementOption> {
        registry
            .iter()
            .map(|info| {
                let legacy = match info.name.as_str() {
                    MEMORY_RESOURCE_NAME => Some(LegacyAlias {
                        key: self.legacy_memory_increment_key.clone(),
                        default: self.default_memory_increment,
                    }),
                    VCORES_RESOURCE_NAME => Some(LegacyAlias {
                        key: self.legacy_vcores_increment_key.clone(),
                        default: self.default_vcores_increment,
                    }),
                    _ => None,
                };
                IncrementOption {
                    resource: info.name.clone(),
                    unit: info.unit.clone(),
                    generic_key: self.generic_increment_key(&info.name),
                    legacy,
                }
            })
            .collect()
    }
}
