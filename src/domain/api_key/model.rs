use chrono::{DateTime, Utc};

/// Prefix carried by every generated access token.
pub const ACCESS_TOKEN_PREFIX: &str = "ak_";

/// A persisted API key owned by a user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiKey {
    pub id: i32,
    pub user_id: i32,
    pub access_token: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted by the repository when creating a key.
/// The identifier and timestamps are assigned by storage.
#[derive(Clone, Debug)]
pub struct NewApiKey {
    pub user_id: i32,
    pub access_token: String,
}

/// Whether `token` has the shape of an access token rather than a JWT.
pub fn looks_like_access_token(token: &str) -> bool {
    token.starts_with(ACCESS_TOKEN_PREFIX) && token.len() > ACCESS_TOKEN_PREFIX.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_token_shape() {
        assert!(looks_like_access_token("ak_0123abcd"));
        assert!(!looks_like_access_token("ak_"));
        assert!(!looks_like_access_token("eyJhbGciOiJIUzI1NiJ9.e30.sig"));
    }
}
