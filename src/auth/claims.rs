use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT payload for access tokens.
///
/// `sub` doubles the email because the email is the username; `jti` is
/// random per token so two tokens for the same user never compare equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub jti: String,
    pub email: String,
    pub uid: Uuid,
    pub roles: Vec<String>,
    pub iat: usize,
    pub exp: usize,
    pub iss: String,
    pub aud: String,
}
