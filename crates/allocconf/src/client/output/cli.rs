use cli_table::format::{Justify, Separator};
use cli_table::{Cell, CellStruct, ColorChoice, Style, Table, TableStruct, print_stdout};

use crate::client::output::outputs::Output;
use crate::config::diagnostics::ConfigWarning;
use crate::resources::{
    ConfigurableResource, ResourceAmount, ResourceQuantity, ResourceTypeInfo,
    ResourceTypeRegistry,
};

pub struct CliOutput {
    color_policy: ColorChoice,
}

impl CliOutput {
    pub fn new(color_policy: ColorChoice) -> CliOutput {
        CliOutput { color_policy }
    }

    fn print_horizontal_table(&self, rows: Vec<Vec<CellStruct>>, header: Vec<CellStruct>) {
        let table = rows
            .table()
            .separator(
                Separator::builder()
                    .title(Some(Default::default()))
                    .column(Some(Default::default()))
                    .build(),
            )
            .title(header);
        self.print_table(table);
    }

    fn print_table(&self, table: TableStruct) {
        let table = table.color_choice(self.color_policy);
        if let Err(e) = print_stdout(table) {
            log::error!("Cannot print table to stdout: {:?}", e);
        }
    }
}

fn format_amount(amount: ResourceAmount, info: &ResourceTypeInfo) -> String {
    if info.unit.is_empty() {
        amount.to_string()
    } else {
        format!("{amount} {}", info.unit)
    }
}

fn format_optional_amount(quantity: &ResourceQuantity, info: &ResourceTypeInfo) -> String {
    quantity
        .get(&info.name)
        .map(|amount| format_amount(amount, info))
        .unwrap_or_else(|| "-".to_string())
}

impl Output for CliOutput {
    fn print_resource_value(
        &self,
        registry: &ResourceTypeRegistry,
        raw: &str,
        resource: &ConfigurableResource,
        resolved: Option<&ResourceQuantity>,
    ) {
        let kind = match resource {
            ConfigurableResource::Absolute(_) => "absolute",
            ConfigurableResource::Percentage(_) => "percentage",
        };
        println!("Parsed `{raw}` as {kind} amount");

        let rows = registry
            .iter()
            .enumerate()
            .map(|(index, info)| {
                let value = match resource {
                    ConfigurableResource::Absolute(quantity) => {
                        format_optional_amount(quantity, info)
                    }
                    ConfigurableResource::Percentage(percentage) => {
                        format!("{}%", percentage.get(index).unwrap_or_default() * 100.0)
                    }
                };
                let mut row = vec![
                    info.name.as_str().cell().bold(true),
                    value.cell().justify(Justify::Right),
                ];
                if let Some(resolved) = resolved {
                    row.push(
                        format_optional_amount(resolved, info)
                            .cell()
                            .justify(Justify::Right),
                    );
                }
                row
            })
            .collect();

        let mut header = vec!["Resource".cell().bold(true), "Value".cell().bold(true)];
        if resolved.is_some() {
            header.push("Resolved".cell().bold(true));
        }
        self.print_horizontal_table(rows, header);
    }

    fn print_increment_allocation(
        &self,
        registry: &ResourceTypeRegistry,
        increment: &ResourceQuantity,
        warnings: &[ConfigWarning],
    ) {
        for warning in warnings {
            log::warn!("{warning}");
        }

        let rows = registry
            .iter()
            .map(|info| {
                let value = increment
                    .get(&info.name)
                    .map(|amount| format_amount(amount, info))
                    .unwrap_or_else(|| "not configured".to_string());
                vec![
                    info.name.as_str().cell().bold(true),
                    value.cell().justify(Justify::Right),
                ]
            })
            .collect();
        let header = vec!["Resource".cell().bold(true), "Increment".cell().bold(true)];
        self.print_horizontal_table(rows, header);
    }

    fn print_resource_types(&self, registry: &ResourceTypeRegistry) {
        let rows = registry
            .iter()
            .enumerate()
            .map(|(index, info)| {
                let unit = if info.unit.is_empty() {
                    "<none>"
                } else {
                    info.unit.as_str()
                };
                vec![
                    index.cell(),
                    info.name.as_str().cell().bold(true),
                    unit.cell(),
                ]
            })
            .collect();
        let header = vec![
            "Index".cell().bold(true),
            "Name".cell().bold(true),
            "Unit".cell().bold(true),
        ];
        self.print_horizontal_table(rows, header);
    }

    fn print_error(&self, error: anyhow::Error) {
        eprintln!("{error:?}");
    }
}
