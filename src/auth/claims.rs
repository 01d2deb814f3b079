use serde::{Deserialize, Serialize};

/// Session token payload. Kept minimal: the admin flag is read from the store per request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    pub id: i64,       // user ID
    pub email: String, // user email
    pub name: String,  // display name
    pub iat: usize,    // issued at (unix timestamp)
    pub exp: usize,    // expires at (unix timestamp)
}
