use serde::{Deserialize, Serialize};

/// Claims carried by an issued bearer token. Only the subject is trusted;
/// roles are always re-read from the store.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Claims {
    /// The user id.
    pub sub: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}
