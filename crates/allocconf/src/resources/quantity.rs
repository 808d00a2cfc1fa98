use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::resources::{MEMORY_RESOURCE_NAME, ResourceAmount, VCORES_RESOURCE_NAME};

/// Absolute amount of every resource type.
///
/// Memory is expressed in mebibytes, extension types in their canonical unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceQuantity {
    memory: ResourceAmount,
    vcores: ResourceAmount,
    #[serde(flatten)]
    others: BTreeMap<String, ResourceAmount>,
}

impl ResourceQuantity {
    pub fn new(memory: ResourceAmount, vcores: ResourceAmount) -> Self {
        ResourceQuantity {
            memory,
            vcores,
            others: Default::default(),
        }
    }

    pub fn with_extension(mut self, name: impl Into<String>, amount: ResourceAmount) -> Self {
        self.others.insert(name.into(), amount);
        self
    }

    pub fn memory(&self) -> ResourceAmount {
        self.memory
    }

    pub fn vcores(&self) -> ResourceAmount {
        self.vcores
    }

    pub fn get(&self, name: &str) -> Option<ResourceAmount> {
        match name {
            MEMORY_RESOURCE_NAME => Some(self.memory),
            VCORES_RESOURCE_NAME => Some(self.vcores),
            _ => self.others.get(name).copied(),
        }
    }

    pub fn set(&mut self, name: &str, amount: ResourceAmount) {
        match name {
            MEMORY_RESOURCE_NAME => self.memory = amount,
            VCORES_RESOURCE_NAME => self.vcores = amount,
            _ => {
                self.others.insert(name.to_string(), amount);
            }
        }
    }

    pub fn extensions(&self) -> &BTreeMap<String, ResourceAmount> {
        &self.others
    }

    /// Iterates over memory, compute cores and then extension types sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, ResourceAmount)> {
        [
            (MEMORY_RESOURCE_NAME, self.memory),
            (VCORES_RESOURCE_NAME, self.vcores),
        ]
        .into_iter()
        .chain(
            self.others
                .iter()
                .map(|(name, amount)| (name.as_str(), *amount)),
        )
    }
}

impl Display for ResourceQuantity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (name, amount) in self.iter() {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            write!(f, "{name}={amount}")?;
        }
        Ok(())
    }
}
