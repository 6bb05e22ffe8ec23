pub mod date;
pub mod fuzzy;

pub use date::{parse_date_expr, parse_date_expr_from};
