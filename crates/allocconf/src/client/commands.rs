use crate::client::globalsettings::GlobalSettings;
use crate::common::cli::{ParseOpts, SourceOpts};
use crate::common::error::AllocConfError;
use crate::config::Configuration;
use crate::config::diagnostics::CollectingSink;
use crate::config::increment::IncrementResolver;
use crate::config::schema::ConfigSchema;
use crate::resources::parser::ResourceValueParser;
use crate::resources::units::StandardUnits;
use crate::resources::{ConfigurableResource, ResourceQuantity, ResourceTypeRegistry};

struct LoadedConfig {
    configuration: Configuration,
    schema: ConfigSchema,
    registry: ResourceTypeRegistry,
}

fn load_config(opts: &SourceOpts) -> crate::Result<LoadedConfig> {
    let configuration = opts.load_configuration()?;
    let schema = opts.schema();
    let registry = ResourceTypeRegistry::from_config(&configuration, &schema, &StandardUnits)?;
    Ok(LoadedConfig {
        configuration,
        schema,
        registry,
    })
}

/// Parses `value` and optionally computes its absolute amount against `capacity`.
fn evaluate_value(
    registry: &ResourceTypeRegistry,
    value: &str,
    capacity: Option<&str>,
) -> crate::Result<(ConfigurableResource, Option<ResourceQuantity>)> {
    let parser = ResourceValueParser::new(registry);
    let resource = parser.parse(value)?;
    let resolved = match capacity {
        Some(capacity) => match parser.parse(capacity)? {
            ConfigurableResource::Absolute(cluster) => Some(resource.resolve(&cluster, registry)),
            ConfigurableResource::Percentage(_) => {
                return Err(AllocConfError::GenericError(format!(
                    "Cluster capacity `{capacity}` has to be an absolute amount"
                )));
            }
        },
        None => None,
    };
    Ok((resource, resolved))
}

pub fn command_parse(gsettings: &GlobalSettings, opts: ParseOpts) -> anyhow::Result<()> {
    let LoadedConfig { registry, .. } = load_config(&opts.source)?;
    let (resource, resolved) = evaluate_value(&registry, &opts.value, opts.capacity.as_deref())?;
    gsettings
        .printer()
        .print_resource_value(&registry, &opts.value, &resource, resolved.as_ref());
    Ok(())
}

pub fn command_increment(gsettings: &GlobalSettings, opts: SourceOpts) -> anyhow::Result<()> {
    let LoadedConfig {
        configuration,
        schema,
        registry,
    } = load_config(&opts)?;

    let sink = CollectingSink::new();
    let increment =
        IncrementResolver::new(&schema, &registry, &StandardUnits).resolve(&configuration, &sink)?;
    gsettings
        .printer()
        .print_increment_allocation(&registry, &increment, &sink.into_warnings());
    Ok(())
}

pub fn command_types(gsettings: &GlobalSettings, opts: SourceOpts) -> anyhow::Result<()> {
    let LoadedConfig { registry, .. } = load_config(&opts)?;
    gsettings.printer().print_resource_types(&registry);
    Ok(())
}
