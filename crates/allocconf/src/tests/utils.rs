use std::fmt::Debug;

use crate::common::error::MalformedValue;
use crate::common::parser2::CharParser;
use crate::resources::units::StandardUnits;
use crate::resources::{ResourceTypeInfo, ResourceTypeRegistry};

pub fn expect_parser_error<T: Debug>(parser: impl CharParser<T>, input: &str) -> String {
    parser.parse_text(input).unwrap_err().to_string()
}

pub fn expect_malformed<T: Debug>(result: crate::Result<T>) -> MalformedValue {
    match result {
        Err(error) => error
            .as_malformed()
            .cloned()
            .unwrap_or_else(|| panic!("Expected a malformed value, got {error:?}")),
        Ok(value) => panic!("Expected an error, got {value:?}"),
    }
}

/// Built-in types followed by a countable `gpu` type
pub fn gpu_registry() -> ResourceTypeRegistry {
    ResourceTypeRegistry::with_extensions(vec![ResourceTypeInfo::new("gpu", "")], &StandardUnits)
        .unwrap()
}
