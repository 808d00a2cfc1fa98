use crate::config::diagnostics::ConfigWarning;
use crate::resources::{ConfigurableResource, ResourceQuantity, ResourceTypeRegistry};

#[derive(clap::ValueEnum, Clone)]
pub enum Outputs {
    CLI,
    JSON,
    Quiet,
}

pub trait Output {
    /// `resolved` is present when the value was evaluated against a cluster capacity.
    fn print_resource_value(
        &self,
        registry: &ResourceTypeRegistry,
        raw: &str,
        resource: &ConfigurableResource,
        resolved: Option<&ResourceQuantity>,
    );

    fn print_increment_allocation(
        &self,
        registry: &ResourceTypeRegistry,
        increment: &ResourceQuantity,
        warnings: &[ConfigWarning],
    );

    fn print_resource_types(&self, registry: &ResourceTypeRegistry);

    fn print_error(&self, error: anyhow::Error);
}
