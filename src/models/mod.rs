// Core data models for DeltaTask
// These structs represent the domain entities

pub mod tag;
pub mod todo;

pub use tag::*;
pub use todo::*;
