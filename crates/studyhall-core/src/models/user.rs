use serde::{Deserialize, Serialize};

/// An authenticated principal as reported by the identity service.
///
/// Held only as a read-only snapshot; the session manager discards it
/// entirely on signout or when a stored credential fails to resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    /// Opaque unique identifier assigned by the identity service.
    pub id: String,
    /// Email address, unique per account.
    pub email: String,
}
