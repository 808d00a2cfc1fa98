pub mod client;
pub mod common;
pub mod config;
pub mod resources;

#[cfg(test)]
pub(crate) mod tests;

pub type Error = crate::common::error::AllocConfError;
pub type Result<T> = std::result::Result<T, Error>;

// Reexports
pub use config::increment::{IncrementResolver, resolve_increment_allocation};
pub use config::{ConfigSource, Configuration};
pub use resources::parser::{ResourceValueParser, parse_resource_config_value};
pub use resources::{
    ConfigurableResource, ResourcePercentage, ResourceQuantity, ResourceTypeInfo,
    ResourceTypeRegistry,
};

pub const ALLOCCONF_VERSION: &str = {
    match option_env!("ALLOCCONF_BUILD_VERSION") {
        Some(version) => version,
        None => const_format::concatcp!(env!("CARGO_PKG_VERSION"), "-dev"),
    }
};
