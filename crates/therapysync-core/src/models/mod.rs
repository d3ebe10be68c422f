//! Domain models for the accounting core.

mod period;
mod staff;
mod summary;
mod visit;

pub use period::*;
pub use staff::*;
pub use summary::*;
pub use visit::*;
