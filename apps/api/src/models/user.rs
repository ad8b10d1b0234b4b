use serde::{Deserialize, Serialize};

/// The identity of the signed-in client, as exposed to callers.
/// Passwords never appear here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub is_guest: bool,
}
