use std::collections::BTreeMap;

use chumsky::Parser;
use chumsky::primitive::just;
use chumsky::text::TextParser;

use crate::common::error::{MalformedKind, MalformedValue};
use crate::common::parser2::{
    CharParser, Decimal, all_consuming, parse_decimal, parse_identifier,
};
use crate::resources::{
    ConfigurableResource, MEMORY_INDEX, MEMORY_RESOURCE_NAME, ResourceAmount,
    ResourcePercentage, ResourceQuantity, ResourceTypeRegistry, VCORES_INDEX,
    VCORES_RESOURCE_NAME,
};

/// Unit of the memory term in the absolute form
const MEMORY_TOKEN: &str = "mb";
/// Name of the compute cores term in the percentage form
const CPU_TOKEN: &str = "cpu";

#[derive(Debug, Clone, PartialEq)]
struct ResourceTerm {
    amount: Decimal,
    percentage: bool,
    unit: Option<String>,
}

/// Term = number [%] [unit]
fn parse_term() -> impl CharParser<ResourceTerm> {
    parse_decimal()
        .padded()
        .then(just('%').padded().or_not())
        .then(parse_identifier().padded().or_not())
        .map(|((amount, percentage), unit)| ResourceTerm {
            amount,
            percentage: percentage.is_some(),
            unit,
        })
}

/// Terms are separated by commas or whitespace.
fn parse_terms() -> impl CharParser<Vec<ResourceTerm>> {
    all_consuming(
        parse_term()
            .separated_by(just(',').padded().or_not())
            .at_least(1),
    )
}

/// Parses resource values such as `1024 mb, 2 vcores`, `50%` or
/// `40% memory, 60% cpu, 10% gpu`.
///
/// The whole value is matched case-insensitively. Extension types known to the registry
/// can be addressed by their name in both forms. Terms naming a resource that is not
/// registered are ignored.
pub struct ResourceValueParser<'a> {
    registry: &'a ResourceTypeRegistry,
}

impl<'a> ResourceValueParser<'a> {
    pub fn new(registry: &'a ResourceTypeRegistry) -> Self {
        ResourceValueParser { registry }
    }

    pub fn parse(&self, raw: &str) -> crate::Result<ConfigurableResource> {
        let value = raw.to_lowercase();
        let terms = parse_terms().parse_text(&value).map_err(|error| {
            MalformedValue::new(raw, MalformedKind::Syntax(error.to_string()))
        })?;

        let resource = if value.contains('%') {
            self.build_percentage(&terms)
                .map(ConfigurableResource::Percentage)
        } else {
            self.build_absolute(&terms)
                .map(ConfigurableResource::Absolute)
        };
        let resource = resource.map_err(|kind| MalformedValue::new(raw, kind))?;
        log::debug!("Parsed resource value `{raw}` as {resource:?}");
        Ok(resource)
    }

    fn build_absolute(&self, terms: &[ResourceTerm]) -> Result<ResourceQuantity, MalformedKind> {
        let mut memory = None;
        let mut vcores = None;
        let mut extensions = BTreeMap::new();

        for term in terms {
            let unit = term.unit.as_deref().unwrap_or(MEMORY_TOKEN);
            match unit {
                MEMORY_TOKEN => assign(&mut memory, unit, integer_amount(term, unit)?)?,
                VCORES_RESOURCE_NAME => assign(&mut vcores, unit, integer_amount(term, unit)?)?,
                name => match self.registry.find_extension(name) {
                    Some((_, info)) => {
                        let amount = integer_amount(term, name)?;
                        if extensions.insert(info.name.clone(), amount).is_some() {
                            return Err(MalformedKind::DuplicateUnit(name.to_string()));
                        }
                    }
                    None => log::debug!("Ignoring amount of unknown resource `{name}`"),
                },
            }
        }

        let memory =
            memory.ok_or_else(|| MalformedKind::MissingRequiredUnit(MEMORY_TOKEN.to_string()))?;
        let vcores = vcores
            .ok_or_else(|| MalformedKind::MissingRequiredUnit(VCORES_RESOURCE_NAME.to_string()))?;

        let mut quantity = ResourceQuantity::new(memory, vcores);
        for (name, amount) in extensions {
            quantity.set(&name, amount);
        }
        Ok(quantity)
    }

    fn build_percentage(
        &self,
        terms: &[ResourceTerm],
    ) -> Result<ResourcePercentage, MalformedKind> {
        if terms.iter().any(|term| !term.percentage) {
            return Err(MalformedKind::MixedTerms);
        }
        // A lone percentage applies to every resource, whatever it names
        if let [term] = terms {
            return Ok(ResourcePercentage::uniform(
                term.amount.value / 100.0,
                self.registry.len(),
            ));
        }

        let mut fractions = vec![0.0; self.registry.len()];
        let mut seen = vec![false; self.registry.len()];
        for term in terms {
            let name = term.unit.as_deref().ok_or(MalformedKind::UnnamedTerm)?;
            let index = match name {
                MEMORY_RESOURCE_NAME => MEMORY_INDEX,
                CPU_TOKEN => VCORES_INDEX,
                name => match self.registry.find_extension(name) {
                    Some((index, _)) => index,
                    None => {
                        log::debug!("Ignoring percentage of unknown resource `{name}`");
                        continue;
                    }
                },
            };
            if seen[index] {
                return Err(MalformedKind::DuplicateUnit(name.to_string()));
            }
            seen[index] = true;
            fractions[index] = term.amount.value / 100.0;
        }

        if !seen[MEMORY_INDEX] {
            return Err(MalformedKind::MissingRequiredUnit(
                MEMORY_RESOURCE_NAME.to_string(),
            ));
        }
        if !seen[VCORES_INDEX] {
            return Err(MalformedKind::MissingRequiredUnit(CPU_TOKEN.to_string()));
        }
        Ok(ResourcePercentage::from_fractions(fractions))
    }
}

fn integer_amount(term: &ResourceTerm, unit: &str) -> Result<ResourceAmount, MalformedKind> {
    term.amount.integer.ok_or_else(|| {
        MalformedKind::Conversion(format!(
            "Amount of `{unit}` does not fit into 8-byte unsigned integer"
        ))
    })
}

fn assign(
    slot: &mut Option<ResourceAmount>,
    unit: &str,
    amount: ResourceAmount,
) -> Result<(), MalformedKind> {
    if slot.replace(amount).is_some() {
        return Err(MalformedKind::DuplicateUnit(unit.to_string()));
    }
    Ok(())
}

/// Parses a resource configuration value, see [`ResourceValueParser`].
pub fn parse_resource_config_value(
    raw: &str,
    registry: &ResourceTypeRegistry,
) -> crate::Result<ConfigurableResource> {
    ResourceValueParser::new(registry).parse(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::utils::{expect_malformed, gpu_registry};

    fn parse(raw: &str) -> ConfigurableResource {
        parse_resource_config_value(raw, &ResourceTypeRegistry::default()).unwrap()
    }

    fn fractions(raw: &str, registry: &ResourceTypeRegistry) -> Vec<f64> {
        parse_resource_config_value(raw, registry)
            .unwrap()
            .as_percentage()
            .unwrap()
            .as_slice()
            .to_vec()
    }

    #[test]
    fn test_absolute() {
        assert_eq!(
            parse("1024 mb, 2 vcores"),
            ConfigurableResource::Absolute(ResourceQuantity::new(1024, 2))
        );
    }

    #[test]
    fn test_absolute_order_and_case() {
        let expected = ConfigurableResource::Absolute(ResourceQuantity::new(1024, 2));
        assert_eq!(parse("2 vcores, 1024 mb"), expected);
        assert_eq!(parse("1024 MB, 2 VCores"), expected);
        assert_eq!(parse("1024mb,2vcores"), expected);
        assert_eq!(parse("  1024 mb ,  2 vcores  "), expected);
    }

    #[test]
    fn test_absolute_truncates_fraction() {
        assert_eq!(
            parse("1024.9 mb, 2.5 vcores"),
            ConfigurableResource::Absolute(ResourceQuantity::new(1024, 2))
        );
    }

    #[test]
    fn test_absolute_unitless_term_is_memory() {
        assert_eq!(
            parse("512, 3 vcores"),
            ConfigurableResource::Absolute(ResourceQuantity::new(512, 3))
        );
    }

    #[test]
    fn test_absolute_missing_vcores() {
        let registry = ResourceTypeRegistry::default();
        assert_eq!(
            expect_malformed(parse_resource_config_value("1024", &registry)).kind,
            MalformedKind::MissingRequiredUnit("vcores".to_string())
        );
        let error = expect_malformed(parse_resource_config_value("1024 mb", &registry));
        insta::assert_snapshot!(error.to_string(), @r#"Invalid resource value "1024 mb": Missing resource: vcores"#);
    }

    #[test]
    fn test_absolute_missing_memory() {
        let error = expect_malformed(parse_resource_config_value(
            "2 vcores",
            &ResourceTypeRegistry::default(),
        ));
        assert_eq!(error.value, "2 vcores");
        assert_eq!(
            error.kind,
            MalformedKind::MissingRequiredUnit("mb".to_string())
        );
    }

    #[test]
    fn test_absolute_duplicate_unit() {
        let error = expect_malformed(parse_resource_config_value(
            "1 mb, 2 mb, 1 vcores",
            &ResourceTypeRegistry::default(),
        ));
        assert_eq!(error.kind, MalformedKind::DuplicateUnit("mb".to_string()));
    }

    #[test]
    fn test_absolute_ignores_unknown_resource() {
        let expected = ConfigurableResource::Absolute(ResourceQuantity::new(1024, 2));
        assert_eq!(parse("1024 mb, 2 vcores, 1 gpu"), expected);
        assert_eq!(parse("1 gpu, 1024 mb, 2 vcores"), expected);
    }

    #[test]
    fn test_absolute_whitespace_separated() {
        let expected = ConfigurableResource::Absolute(ResourceQuantity::new(1024, 2));
        assert_eq!(parse("1024 mb 2 vcores"), expected);
        assert_eq!(parse("1024 2 vcores"), expected);
    }

    #[test]
    fn test_absolute_unknown_unit_only() {
        let error = expect_malformed(parse_resource_config_value(
            "1024 zz",
            &ResourceTypeRegistry::default(),
        ));
        assert_eq!(
            error.kind,
            MalformedKind::MissingRequiredUnit("mb".to_string())
        );
    }

    #[test]
    fn test_absolute_amount_overflow() {
        let registry = ResourceTypeRegistry::default();
        let error = expect_malformed(parse_resource_config_value(
            "18446744073709551616 mb, 1 vcores",
            &registry,
        ));
        assert!(matches!(error.kind, MalformedKind::Conversion(_)));
        assert_eq!(
            parse("18446744073709551615 mb, 1 vcores"),
            ConfigurableResource::Absolute(ResourceQuantity::new(u64::MAX, 1))
        );
        // Unknown terms are not converted at all
        assert_eq!(
            parse("1 mb, 1 vcores, 18446744073709551616 gpu"),
            ConfigurableResource::Absolute(ResourceQuantity::new(1, 1))
        );
    }

    #[test]
    fn test_absolute_extension() {
        let resource =
            parse_resource_config_value("1024 mb, 2 vcores, 3 GPU", &gpu_registry()).unwrap();
        assert_eq!(
            resource,
            ConfigurableResource::Absolute(ResourceQuantity::new(1024, 2).with_extension("gpu", 3))
        );
    }

    #[test]
    fn test_absolute_extension_is_optional() {
        let resource = parse_resource_config_value("1024 mb, 2 vcores", &gpu_registry()).unwrap();
        assert_eq!(resource.as_absolute().unwrap().get("gpu"), None);
    }

    #[test]
    fn test_percentage_uniform() {
        let registry = gpu_registry();
        assert_eq!(fractions("50%", &registry), [0.5, 0.5, 0.5]);
        assert_eq!(fractions(" 12.5 % ", &registry), [0.125, 0.125, 0.125]);
        assert_eq!(
            fractions("100%", &ResourceTypeRegistry::default()),
            [1.0, 1.0]
        );
    }

    #[test]
    fn test_percentage_single_named_term() {
        assert_eq!(
            fractions("50% memory", &ResourceTypeRegistry::default()),
            [0.5, 0.5]
        );
        assert_eq!(fractions("10% gpu", &gpu_registry()), [0.1, 0.1, 0.1]);
    }

    #[test]
    fn test_percentage_huge() {
        assert_eq!(
            fractions("18446744073709551616%", &ResourceTypeRegistry::default()),
            [184467440737095516.16, 184467440737095516.16]
        );
    }

    #[test]
    fn test_percentage_above_hundred() {
        assert_eq!(
            fractions("150%", &ResourceTypeRegistry::default()),
            [1.5, 1.5]
        );
    }

    #[test]
    fn test_percentage_per_resource() {
        assert_eq!(
            fractions(
                "50% memory, 25% cpu",
                &ResourceTypeRegistry::default()
            ),
            [0.5, 0.25]
        );
        assert_eq!(
            fractions("25% CPU, 50% Memory", &ResourceTypeRegistry::default()),
            [0.5, 0.25]
        );
    }

    #[test]
    fn test_percentage_extensions() {
        let registry = gpu_registry();
        assert_eq!(
            fractions("50% memory, 25% cpu, 10% gpu", &registry),
            [0.5, 0.25, 0.1]
        );
        // Unmentioned extensions get nothing
        assert_eq!(
            fractions("50% memory, 25% cpu", &registry),
            [0.5, 0.25, 0.0]
        );
    }

    #[test]
    fn test_percentage_missing_cpu() {
        let registry = ResourceTypeRegistry::default();
        let error = expect_malformed(parse_resource_config_value(
            "50% memory, 10% gpu",
            &registry,
        ));
        assert_eq!(
            error.kind,
            MalformedKind::MissingRequiredUnit("cpu".to_string())
        );
        let error = expect_malformed(parse_resource_config_value("50% cpu, 10% gpu", &registry));
        assert_eq!(
            error.kind,
            MalformedKind::MissingRequiredUnit("memory".to_string())
        );
    }

    #[test]
    fn test_percentage_unnamed_term() {
        let error = expect_malformed(parse_resource_config_value(
            "50%, 20% cpu",
            &ResourceTypeRegistry::default(),
        ));
        assert_eq!(error.kind, MalformedKind::UnnamedTerm);
    }

    #[test]
    fn test_percentage_duplicate() {
        let error = expect_malformed(parse_resource_config_value(
            "50% memory, 20% cpu, 10% memory",
            &ResourceTypeRegistry::default(),
        ));
        assert_eq!(
            error.kind,
            MalformedKind::DuplicateUnit("memory".to_string())
        );
    }

    #[test]
    fn test_percentage_ignores_unknown_resource() {
        assert_eq!(
            fractions(
                "10% memory, 20% cpu, 5% gpu",
                &ResourceTypeRegistry::default()
            ),
            [0.1, 0.2]
        );
        assert_eq!(
            fractions("50% memory, 20% cpu, 10% disk", &gpu_registry()),
            [0.5, 0.2, 0.0]
        );
        assert_eq!(
            fractions("10% memory 20% cpu", &ResourceTypeRegistry::default()),
            [0.1, 0.2]
        );
    }

    #[test]
    fn test_mixed_terms() {
        let error = expect_malformed(parse_resource_config_value(
            "50% memory, 2 vcores",
            &ResourceTypeRegistry::default(),
        ));
        insta::assert_snapshot!(error.to_string(), @r#"Invalid resource value "50% memory, 2 vcores": Percentage and absolute amounts cannot be combined"#);
    }

    #[test]
    fn test_syntax_errors() {
        let registry = ResourceTypeRegistry::default();
        for raw in [
            "",
            "   ",
            "abc",
            "mb 1024",
            "1024 mb,",
            "1024 mb,, 2 vcores",
            "-5 mb, 1 vcores",
            "1 mb; 1 vcores",
        ] {
            let error = expect_malformed(parse_resource_config_value(raw, &registry));
            assert!(
                matches!(error.kind, MalformedKind::Syntax(_)),
                "{raw} was parsed as {error:?}"
            );
            assert_eq!(error.value, raw);
        }
    }

    #[test]
    fn test_syntax_error_message() {
        let error = expect_malformed(parse_resource_config_value(
            "1024 mb; 2 vcores",
            &ResourceTypeRegistry::default(),
        ));
        let MalformedKind::Syntax(message) = error.kind else {
            panic!("Expected a syntax error");
        };
        assert!(message.contains("Unexpected token"));
        assert!(message.contains("1024 mb; 2 vcores"));
    }

    #[test]
    fn test_parse_is_deterministic() {
        let registry = gpu_registry();
        for raw in ["1024 mb, 2 vcores, 1 gpu", "10% memory, 20% cpu", "33%"] {
            assert_eq!(
                parse_resource_config_value(raw, &registry).unwrap(),
                parse_resource_config_value(raw, &registry).unwrap()
            );
        }
    }
}
