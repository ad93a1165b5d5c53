//! Access token generation for API keys

use rand::Rng;

use crate::domain::api_key::ACCESS_TOKEN_PREFIX;

/// Generate a new access token: prefix followed by 32 random bytes in hex.
pub fn generate_access_token() -> String {
    let random_bytes: [u8; 32] = rand::thread_rng().gen();
    format!("{}{}", ACCESS_TOKEN_PREFIX, hex::encode(random_bytes))
}
