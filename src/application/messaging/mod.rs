//! Message handling - Command parsing

pub mod parser;

pub use parser::{Addressing, CommandParser};
