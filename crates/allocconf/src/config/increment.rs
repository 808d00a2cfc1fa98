use chumsky::Parser;
use chumsky::text::TextParser;

use crate::common::error::{MalformedKind, MalformedValue};
use crate::common::parser2::{CharParser, all_consuming, parse_u64, parse_unit_symbol};
use crate::config::ConfigSource;
use crate::config::diagnostics::{ConfigWarning, DiagnosticSink, LogSink};
use crate::config::schema::{ConfigSchema, IncrementOption};
use crate::resources::units::{StandardUnits, UnitConverter, UnitError};
use crate::resources::{ResourceAmount, ResourceQuantity, ResourceTypeRegistry};

/// Value = integer [unit], e.g. `512`, `2 Gi` or `2Gi`
fn parse_amount_with_unit() -> impl CharParser<(ResourceAmount, String)> {
    all_consuming(parse_u64().padded().then(parse_unit_symbol()).padded())
}

fn parse_plain_amount() -> impl CharParser<ResourceAmount> {
    all_consuming(parse_u64().padded())
}

/// Determines the minimum allocation step of every resource type.
///
/// Each type is configured by its generic `<name>.increment-allocation` property.
/// Memory and compute cores additionally accept their legacy properties, which are
/// used only when the generic one is not set.
pub struct IncrementResolver<'a> {
    schema: &'a ConfigSchema,
    registry: &'a ResourceTypeRegistry,
    converter: &'a dyn UnitConverter,
}

impl<'a> IncrementResolver<'a> {
    pub fn new(
        schema: &'a ConfigSchema,
        registry: &'a ResourceTypeRegistry,
        converter: &'a dyn UnitConverter,
    ) -> Self {
        IncrementResolver {
            schema,
            registry,
            converter,
        }
    }

    pub fn resolve(
        &self,
        config: &dyn ConfigSource,
        sink: &dyn DiagnosticSink,
    ) -> crate::Result<ResourceQuantity> {
        let options = self.schema.increment_options(self.registry);

        // All generic values are validated before any of them is applied
        let generic = options
            .iter()
            .map(|option| {
                config
                    .lookup(&option.generic_key)
                    .map(|raw| {
                        self.parse_generic_value(option, raw)
                            .map(|amount| (amount, raw))
                    })
                    .transpose()
            })
            .collect::<crate::Result<Vec<_>>>()?;

        let mut increment = ResourceQuantity::default();
        for (option, generic) in options.iter().zip(generic) {
            let amount = match (generic, &option.legacy) {
                (Some((amount, raw)), legacy) => {
                    if let Some(legacy) = legacy {
                        if let Some(legacy_raw) = config.lookup(&legacy.key) {
                            sink.warn(ConfigWarning::PrecedenceConflict {
                                resource: option.resource.clone(),
                                key: option.generic_key.clone(),
                                value: raw.to_string(),
                                overridden_key: legacy.key.clone(),
                                overridden_value: legacy_raw.to_string(),
                            });
                        }
                    }
                    amount
                }
                (None, Some(legacy)) => match config.lookup(&legacy.key) {
                    Some(raw) => parse_plain_amount().parse_text(raw).map_err(|error| {
                        MalformedValue::for_key(
                            &legacy.key,
                            raw,
                            MalformedKind::Syntax(error.to_string()),
                        )
                    })?,
                    None => legacy.default,
                },
                (None, None) => continue,
            };
            log::debug!(
                "Increment allocation of {} is {amount}{}",
                option.resource,
                option.unit
            );
            increment.set(&option.resource, amount);
        }
        Ok(increment)
    }

    fn parse_generic_value(&self, option: &IncrementOption, raw: &str) -> crate::Result<u64> {
        let malformed = |kind| MalformedValue::for_key(&option.generic_key, raw, kind);

        let (amount, unit) = parse_amount_with_unit()
            .parse_text(raw)
            .map_err(|error| malformed(MalformedKind::Syntax(error.to_string())))?;
        if unit.is_empty() {
            return Ok(amount);
        }
        self.converter
            .convert(amount, &unit, &option.unit)
            .map_err(|error| {
                malformed(match error {
                    UnitError::UnknownUnit(unit) => MalformedKind::UnknownUnit(unit),
                    error => MalformedKind::Conversion(error.to_string()),
                })
                .into()
            })
    }
}

/// Resolves increment allocations using the default property names and unit table,
/// reporting warnings through the `log` facade.
pub fn resolve_increment_allocation(
    config: &dyn ConfigSource,
    registry: &ResourceTypeRegistry,
) -> crate::Result<ResourceQuantity> {
    let schema = ConfigSchema::default();
    IncrementResolver::new(&schema, registry, &StandardUnits).resolve(config, &LogSink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Configuration;
    use crate::config::diagnostics::CollectingSink;
    use crate::resources::ResourceTypeInfo;
    use crate::tests::utils::{expect_malformed, gpu_registry};

    fn resolve_with(
        config: &Configuration,
        registry: &ResourceTypeRegistry,
    ) -> (crate::Result<ResourceQuantity>, Vec<ConfigWarning>) {
        let schema = ConfigSchema::yarn();
        let sink = CollectingSink::new();
        let result = IncrementResolver::new(&schema, registry, &StandardUnits).resolve(config, &sink);
        (result, sink.into_warnings())
    }

    fn resolve(config: &Configuration) -> (ResourceQuantity, Vec<ConfigWarning>) {
        let (result, warnings) = resolve_with(config, &ResourceTypeRegistry::default());
        (result.unwrap(), warnings)
    }

    #[test]
    fn test_defaults() {
        let (increment, warnings) = resolve(&Configuration::new());
        assert_eq!(increment, ResourceQuantity::new(1024, 1));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_legacy_values() {
        let config = Configuration::new()
            .with("yarn.scheduler.increment-allocation-mb", "512")
            .with("yarn.scheduler.increment-allocation-vcores", " 2 ");
        let (increment, warnings) = resolve(&config);
        assert_eq!(increment, ResourceQuantity::new(512, 2));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_generic_values() {
        let config = Configuration::new()
            .with("yarn.resource-types.memory.increment-allocation", "2048")
            .with("yarn.resource-types.vcores.increment-allocation", "3");
        let (increment, warnings) = resolve(&config);
        assert_eq!(increment, ResourceQuantity::new(2048, 3));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_generic_overrides_legacy() {
        let config = Configuration::new()
            .with("yarn.resource-types.memory.increment-allocation", "2048")
            .with("yarn.scheduler.increment-allocation-mb", "512");
        let (increment, warnings) = resolve(&config);
        assert_eq!(increment, ResourceQuantity::new(2048, 1));
        assert_eq!(warnings.len(), 1);
        insta::assert_snapshot!(warnings[0].to_string(), @"Configuration yarn.resource-types.memory.increment-allocation=2048 is overriding the yarn.scheduler.increment-allocation-mb=512 property");
    }

    #[test]
    fn test_generic_overrides_both_legacy_values() {
        let config = Configuration::new()
            .with("yarn.resource-types.memory.increment-allocation", "2048")
            .with("yarn.scheduler.increment-allocation-mb", "512")
            .with("yarn.resource-types.vcores.increment-allocation", "4")
            .with("yarn.scheduler.increment-allocation-vcores", "2");
        let (increment, warnings) = resolve(&config);
        assert_eq!(increment, ResourceQuantity::new(2048, 4));
        let resources: Vec<_> = warnings
            .iter()
            .map(|warning| match warning {
                ConfigWarning::PrecedenceConflict { resource, .. } => resource.as_str(),
            })
            .collect();
        assert_eq!(resources, ["memory", "vcores"]);
    }

    #[test]
    fn test_generic_value_units() {
        let config = Configuration::new()
            .with("yarn.resource-types.memory.increment-allocation", "1 Gi");
        assert_eq!(resolve(&config).0.memory(), 1024);

        let config =
            Configuration::new().with("yarn.resource-types.memory.increment-allocation", "2Gi");
        assert_eq!(resolve(&config).0.memory(), 2048);

        let config =
            Configuration::new().with("yarn.resource-types.memory.increment-allocation", "256 Mi");
        assert_eq!(resolve(&config).0.memory(), 256);

        let config =
            Configuration::new().with("yarn.resource-types.vcores.increment-allocation", "2k");
        assert_eq!(resolve(&config).0.vcores(), 2000);
    }

    #[test]
    fn test_malformed_generic_value() {
        for raw in ["1.5 Gi", "abc", "-1", "10 Gi extra", "Gi"] {
            let config = Configuration::new()
                .with("yarn.resource-types.memory.increment-allocation", raw);
            let error = expect_malformed(resolve_with(&config, &ResourceTypeRegistry::default()).0);
            assert_eq!(
                error.key.as_deref(),
                Some("yarn.resource-types.memory.increment-allocation")
            );
            assert!(matches!(error.kind, MalformedKind::Syntax(_)), "{raw}");
        }
    }

    #[test]
    fn test_unknown_unit() {
        let config = Configuration::new()
            .with("yarn.resource-types.memory.increment-allocation", "10 xb")
            .with("yarn.scheduler.increment-allocation-mb", "512");
        let (result, warnings) = resolve_with(&config, &ResourceTypeRegistry::default());
        let error = expect_malformed(result);
        insta::assert_snapshot!(error.to_string(), @r#"Property yarn.resource-types.memory.increment-allocation has an invalid value "10 xb": Unknown unit or resource `xb`"#);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_conversion_overflow() {
        let config = Configuration::new().with(
            "yarn.resource-types.memory.increment-allocation",
            "18446744073709551615 Pi",
        );
        let error = expect_malformed(resolve_with(&config, &ResourceTypeRegistry::default()).0);
        assert!(matches!(error.kind, MalformedKind::Conversion(_)));
    }

    #[test]
    fn test_malformed_legacy_value() {
        let config =
            Configuration::new().with("yarn.scheduler.increment-allocation-vcores", "two");
        let error = expect_malformed(resolve_with(&config, &ResourceTypeRegistry::default()).0);
        assert_eq!(
            error.key.as_deref(),
            Some("yarn.scheduler.increment-allocation-vcores")
        );
    }

    #[test]
    fn test_malformed_extension_fails_before_warnings() {
        let config = Configuration::new()
            .with("yarn.resource-types.memory.increment-allocation", "2048")
            .with("yarn.scheduler.increment-allocation-mb", "512")
            .with("yarn.resource-types.gpu.increment-allocation", "x");
        let (result, warnings) = resolve_with(&config, &gpu_registry());
        assert_eq!(
            expect_malformed(result).key.as_deref(),
            Some("yarn.resource-types.gpu.increment-allocation")
        );
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_extension_types() {
        let registry = ResourceTypeRegistry::with_extensions(
            vec![
                ResourceTypeInfo::new("gpu", ""),
                ResourceTypeInfo::new("disk", "Gi"),
            ],
            &StandardUnits,
        )
        .unwrap();
        let config = Configuration::new()
            .with("yarn.resource-types.disk.increment-allocation", "2048 Mi");
        let (result, warnings) = resolve_with(&config, &registry);
        let increment = result.unwrap();
        assert_eq!(increment.get("disk"), Some(2));
        // Extension types without a configured increment are left out
        assert_eq!(increment.get("gpu"), None);
        assert_eq!(increment.memory(), 1024);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let config = Configuration::new()
            .with("yarn.resource-types.memory.increment-allocation", "2 Gi")
            .with("yarn.scheduler.increment-allocation-mb", "512")
            .with("yarn.resource-types.gpu.increment-allocation", "1");
        let first = resolve_with(&config, &gpu_registry());
        let second = resolve_with(&config, &gpu_registry());
        assert_eq!(first.0.unwrap(), second.0.unwrap());
        assert_eq!(first.1, second.1);
    }

    #[test]
    fn test_default_schema_entry_point() {
        let config = Configuration::new()
            .with("increment-allocation-mb", "256")
            .with("vcores.increment-allocation", "2");
        assert_eq!(
            resolve_increment_allocation(&config, &ResourceTypeRegistry::default()).unwrap(),
            ResourceQuantity::new(256, 2)
        );
    }

    #[test]
    fn test_plain_map_source() {
        let mut config = std::collections::HashMap::new();
        config.insert("increment-allocation-mb".to_string(), "128".to_string());
        assert_eq!(
            resolve_increment_allocation(&config, &ResourceTypeRegistry::default())
                .unwrap()
                .memory(),
            128
        );
    }
}
