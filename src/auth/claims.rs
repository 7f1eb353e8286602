use serde::{Deserialize, Serialize};

/// Claims carried by the platform's user token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UserTokenClaims {
    pub sub: String, // platform user ID
    pub aud: String, // app ID
    pub iss: String, // token issuer
    pub exp: usize,  // expiration time
}
