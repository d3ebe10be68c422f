//! Report export to JSON and CSV.

mod report;

pub use report::*;
