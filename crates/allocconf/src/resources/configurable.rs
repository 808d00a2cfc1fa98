use std::fmt::{Display, Formatter};

use serde::Serialize;

use crate::resources::{
    MEMORY_INDEX, ResourceAmount, ResourceQuantity, ResourceTypeRegistry, VCORES_INDEX,
};

/// Fraction of the cluster capacity for each resource type, indexed by registry position.
///
/// Fractions are stored as they were written divided by 100, so `50%` is `0.5`.
/// Values above `1.0` are kept.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResourcePercentage(Vec<f64>);

impl ResourcePercentage {
    pub fn uniform(fraction: f64, count: usize) -> Self {
        ResourcePercentage(vec![fraction; count])
    }

    pub fn from_fractions(fractions: Vec<f64>) -> Self {
        ResourcePercentage(fractions)
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }

    pub fn memory(&self) -> f64 {
        self.get(MEMORY_INDEX).unwrap_or_default()
    }

    pub fn vcores(&self) -> f64 {
        self.get(VCORES_INDEX).unwrap_or_default()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

impl Display for ResourcePercentage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (index, fraction) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}%", fraction * 100.0)?;
        }
        Ok(())
    }
}

/// Result of parsing a resource configuration value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigurableResource {
    Absolute(ResourceQuantity),
    Percentage(ResourcePercentage),
}

impl ConfigurableResource {
    pub fn as_absolute(&self) -> Option<&ResourceQuantity> {
        match self {
            ConfigurableResource::Absolute(quantity) => Some(quantity),
            ConfigurableResource::Percentage(_) => None,
        }
    }

    pub fn as_percentage(&self) -> Option<&ResourcePercentage> {
        match self {
            ConfigurableResource::Absolute(_) => None,
            ConfigurableResource::Percentage(percentage) => Some(percentage),
        }
    }

    /// Computes the absolute amount against the total capacity of a cluster.
    /// Percentages are rounded down, types missing from `cluster` are skipped.
    pub fn resolve(
        &self,
        cluster: &ResourceQuantity,
        registry: &ResourceTypeRegistry,
    ) -> ResourceQuantity {
        match self {
            ConfigurableResource::Absolute(quantity) => quantity.clone(),
            ConfigurableResource::Percentage(percentage) => {
                let mut result = ResourceQuantity::default();
                for (index, info) in registry.iter().enumerate() {
                    let Some(capacity) = cluster.get(&info.name) else {
                        continue;
                    };
                    let fraction = percentage.get(index).unwrap_or_default();
                    let amount = (capacity as f64 * fraction).floor() as ResourceAmount;
                    result.set(&info.name, amount);
                }
                result
            }
        }
    }
}

impl Display for ConfigurableResource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigurableResource::Absolute(quantity) => write!(f, "{quantity}"),
            ConfigurableResource::Percentage(percentage) => write!(f, "{percentage}"),
        }
    }
}
