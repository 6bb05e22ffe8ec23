pub mod tag;
pub mod todo;

pub use tag::*;
pub use todo::*;
