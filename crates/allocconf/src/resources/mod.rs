pub mod configurable;
pub mod parser;
pub mod quantity;
pub mod registry;
pub mod units;

pub use configurable::{ConfigurableResource, ResourcePercentage};
pub use quantity::ResourceQuantity;
pub use registry::{ResourceTypeInfo, ResourceTypeRegistry};

pub type ResourceAmount = u64;

pub const MEMORY_RESOURCE_NAME: &str = "memory";
pub const VCORES_RESOURCE_NAME: &str = "vcores";

/// Canonical unit of memory (mebibytes)
pub const MEMORY_DEFAULT_UNIT: &str = "Mi";
/// Compute cores are counted without a unit
pub const VCORES_DEFAULT_UNIT: &str = "";

pub const MEMORY_INDEX: usize = 0;
pub const VCORES_INDEX: usize = 1;
