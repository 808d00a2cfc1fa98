pub mod cli;
pub mod json;
pub mod outputs;
pub mod quiet;
