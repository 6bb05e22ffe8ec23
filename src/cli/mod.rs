pub mod commands;
pub mod error;
pub mod output;
pub mod parser;

pub use commands::*;
pub use error::*;
pub use parser::*;
