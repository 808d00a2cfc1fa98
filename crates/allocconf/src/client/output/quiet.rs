use crate::client::output::outputs::Output;
use crate::config::diagnostics::ConfigWarning;
use crate::resources::{ConfigurableResource, ResourceQuantity, ResourceTypeRegistry};

/// Prints bare values, one per line, for use in scripts.
#[derive(Default)]
pub struct Quiet;

impl Output for Quiet {
    fn print_resource_value(
        &self,
        _registry: &ResourceTypeRegistry,
        _raw: &str,
        resource: &ConfigurableResource,
        resolved: Option<&ResourceQuantity>,
    ) {
        match resolved {
            Some(resolved) => println!("{resolved}"),
            None => println!("{resource}"),
        }
    }

    fn print_increment_allocation(
        &self,
        _registry: &ResourceTypeRegistry,
        increment: &ResourceQuantity,
        _warnings: &[ConfigWarning],
    ) {
        println!("{increment}");
    }

    fn print_resource_types(&self, registry: &ResourceTypeRegistry) {
        for info in registry.iter() {
            println!("{}", info.name);
        }
    }

    fn print_error(&self, error: anyhow::Error) {
        eprintln!("{error:?}");
    }
}
