use std::path::PathBuf;

use clap::Parser;

use crate::client::output::outputs::Outputs;
use crate::config::Configuration;
use crate::config::schema::ConfigSchema;

#[derive(clap::ValueEnum, Clone)]
pub enum ColorPolicy {
    /// Use colors if the stdout is detected to be a terminal.
    Auto,
    /// Always use colors.
    Always,
    /// Never use colors.
    Never,
}

// Common CLI options
#[derive(Parser)]
pub struct CommonOpts {
    /// Sets console color policy
    #[arg(
        long,
        default_value_t = ColorPolicy::Auto,
        value_enum,
        global = true,
        help_heading("GLOBAL OPTIONS"),
        hide_short_help(true)
    )]
    pub colors: ColorPolicy,

    /// Sets output formatting
    #[arg(
        long,
        env = "ALLOCCONF_OUTPUT_MODE",
        default_value_t = Outputs::CLI,
        value_enum,
        global = true,
        help_heading("GLOBAL OPTIONS"),
        hide_short_help(true)
    )]
    pub output_mode: Outputs,

    /// Enables more detailed log output
    #[arg(
        long,
        env = "ALLOCCONF_DEBUG",
        global = true,
        help_heading("GLOBAL OPTIONS"),
        hide_short_help(true)
    )]
    pub debug: bool,
}

// Root CLI options
#[derive(Parser)]
#[command(
    author,
    about,
    version(crate::ALLOCCONF_VERSION),
    disable_help_subcommand(true),
    help_expected(true)
)]
pub struct RootOptions {
    #[clap(flatten)]
    pub common: CommonOpts,

    #[clap(subcommand)]
    pub subcmd: SubCommand,
}

#[derive(Parser)]
pub enum SubCommand {
    /// Parse a resource value such as "1024 mb, 2 vcores" or "50%"
    Parse(ParseOpts),
    /// Resolve the increment allocation of all resource types
    Increment(SourceOpts),
    /// Display known resource types and their canonical units
    Types(SourceOpts),
}

/// Where the configuration is read from
#[derive(Parser)]
pub struct SourceOpts {
    /// Path to a TOML configuration file
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Use the `yarn.`-prefixed property names
    #[arg(long)]
    pub yarn: bool,

    /// Set a configuration property, overriding the file (KEY=VALUE)
    #[arg(long = "set", value_parser = parse_key_value)]
    pub overrides: Vec<(String, String)>,
}

impl SourceOpts {
    pub fn schema(&self) -> ConfigSchema {
        if self.yarn {
            ConfigSchema::yarn()
        } else {
            ConfigSchema::default()
        }
    }

    pub fn load_configuration(&self) -> crate::Result<Configuration> {
        let mut configuration = match &self.config {
            Some(path) => {
                log::debug!("Loading configuration from {}", path.display());
                Configuration::load(path)?
            }
            None => Configuration::new(),
        };
        for (key, value) in &self.overrides {
            configuration.set(key.as_str(), value.as_str());
        }
        Ok(configuration)
    }
}

#[derive(Parser)]
pub struct ParseOpts {
    /// Resource value to parse
    pub value: String,

    /// Total cluster capacity (e.g. "8192 mb, 16 vcores") used to compute the absolute
    /// amount of percentage values
    #[arg(long)]
    pub capacity: Option<String>,

    #[clap(flatten)]
    pub source: SourceOpts,
}

fn parse_key_value(value: &str) -> anyhow::Result<(String, String)> {
    match value.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(anyhow::anyhow!("Expected KEY=VALUE, got `{value}`")),
    }
}
