//! The application state machine and job engagement operations. The two
//! never call each other; routes compose them.

pub mod applications;
pub mod engagements;

pub use applications::Applications;
pub use engagements::Engagements;
