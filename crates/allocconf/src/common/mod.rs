pub mod cli;
pub mod error;
pub mod parser2;
pub mod setup;
