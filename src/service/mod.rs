pub mod dividend;

pub use dividend::{fetch_dividend, get_dividend};
