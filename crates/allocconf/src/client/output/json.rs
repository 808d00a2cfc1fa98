use serde_json::{Value, json};

use crate::client::output::outputs::Output;
use crate::config::diagnostics::ConfigWarning;
use crate::resources::{ConfigurableResource, ResourceQuantity, ResourceTypeRegistry};

#[derive(Default)]
pub struct JsonOutput;

impl JsonOutput {
    fn print(&self, data: Value) {
        match serde_json::to_string_pretty(&data) {
            Ok(text) => println!("{text}"),
            Err(e) => log::error!("Cannot serialize output to JSON: {e:?}"),
        }
    }
}

fn resource_value_json(
    registry: &ResourceTypeRegistry,
    raw: &str,
    resource: &ConfigurableResource,
    resolved: Option<&ResourceQuantity>,
) -> Value {
    let mut data = json!({
        "value": raw,
        "resource": resource,
    });
    if let ConfigurableResource::Percentage(percentage) = resource {
        // Name the fractions so that the consumer does not need the registry order
        let fractions: serde_json::Map<String, Value> = registry
            .iter()
            .enumerate()
            .map(|(index, info)| {
                (
                    info.name.clone(),
                    json!(percentage.get(index).unwrap_or_default()),
                )
            })
            .collect();
        data["fractions"] = Value::Object(fractions);
    }
    if let Some(resolved) = resolved {
        data["resolved"] = json!(resolved);
    }
    data
}

impl Output for JsonOutput {
    fn print_resource_value(
        &self,
        registry: &ResourceTypeRegistry,
        raw: &str,
        resource: &ConfigurableResource,
        resolved: Option<&ResourceQuantity>,
    ) {
        self.print(resource_value_json(registry, raw, resource, resolved));
    }

    fn print_increment_allocation(
        &self,
        _registry: &ResourceTypeRegistry,
        increment: &ResourceQuantity,
        warnings: &[ConfigWarning],
    ) {
        self.print(json!({
            "increment": increment,
            "warnings": warnings,
        }));
    }

    fn print_resource_types(&self, registry: &ResourceTypeRegistry) {
        let types: Vec<_> = registry.iter().collect();
        self.print(json!(types));
    }

    fn print_error(&self, error: anyhow::Error) {
        self.print(json!({
            "error": format!("{error:?}"),
        }));
    }
}
