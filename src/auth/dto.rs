use serde::{Deserialize, Serialize};

/// Registration request body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiUserDto {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// Login request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginDto {
    pub email: String,
    pub password: String,
}

/// Returned by login and refresh; also the refresh request body, so a client
/// can send back exactly what it was handed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponseDto {
    pub token: String,
    pub user_id: String,
    pub refresh_token: String,
}

/// One registration validation failure, identity-store style.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityError {
    pub code: String,
    pub description: String,
}

impl IdentityError {
    pub fn new(code: &str, description: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_response_wire_shape() {
        let resp = AuthResponseDto {
            token: "t".into(),
            user_id: "u".into(),
            refresh_token: "r".into(),
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"token\""));
        assert!(json.contains("\"userId\""));
        assert!(json.contains("\"refreshToken\""));
    }

    #[test]
    fn identity_error_wire_shape() {
        let err = IdentityError::new("DuplicateEmail", "Email 'a@b.com' is already taken.");
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("\"code\""));
        assert!(json.contains("\"description\""));
    }
}
