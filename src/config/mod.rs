//! Configuration types, loading and schema generation.
pub mod logging;
pub mod store;
pub mod types;

pub use logging::*;
pub use store::*;
pub use types::*;
