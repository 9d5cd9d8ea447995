pub mod credentials;
pub mod gate;
pub mod resolver;

// Re-export so we can do "use crate::auth::{Auth, authorize};"
pub use credentials::{CredentialError, Credentials};
pub use gate::authorize;
pub use resolver::Auth;
