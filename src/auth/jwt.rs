use std::time::Duration;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::auth::claims::Claims;
use crate::auth::manager::ROLE_ADMINISTRATOR;
use crate::auth::repo::User;
use crate::config::JwtConfig;
use crate::error::AppError;
use crate::state::AppState;

/// JWT signing and verification keys plus issuer/audience/lifetime config.
#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
    pub access_ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let JwtConfig {
            secret,
            issuer,
            audience,
            ttl_minutes,
        } = state.config.jwt.clone();
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            audience,
            access_ttl: Duration::from_secs((ttl_minutes as u64) * 60),
        }
    }
}

impl JwtKeys {
    /// Signs an access token for `user`: subject and email claims carry the
    /// email, `uid` the user id, `jti` a fresh random id, plus one role
    /// claim per assigned role. HS256, expiry = configured minutes from now.
    pub fn sign(&self, user: &User, roles: &[String]) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.access_ttl.as_secs() as i64);
        let claims = Claims {
            sub: user.email.clone(),
            jti: Uuid::new_v4().to_string(),
            email: user.email.clone(),
            uid: user.id,
            roles: roles.to_vec(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user.id, "jwt signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(user_id = %data.claims.uid, "jwt verified");
        Ok(data.claims)
    }

    /// Claims extraction with signature and lifetime checks disabled.
    ///
    /// Only the refresh flow uses this: the presented access token is usually
    /// expired, and the real proof is the stored refresh token it is checked
    /// against afterwards.
    pub fn decode_unverified(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::default();
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        Ok(data.claims)
    }
}

/// Extracts and verifies the bearer token, yielding its claims.
pub struct AuthUser(pub Claims);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("Invalid Authorization header".into()))?;

        match keys.verify(token) {
            Ok(claims) => Ok(AuthUser(claims)),
            Err(_) => {
                warn!("invalid or expired token");
                Err(AppError::Unauthorized("Invalid or expired token".into()))
            }
        }
    }
}

/// Like [`AuthUser`] but requires the Administrator role.
pub struct AdminUser(pub Claims);

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(claims) = AuthUser::from_request_parts(parts, state).await?;
        if !claims.roles.iter().any(|r| r == ROLE_ADMINISTRATOR) {
            warn!(user_id = %claims.uid, "administrator role required");
            return Err(AppError::Forbidden("Administrator role required".into()));
        }
        Ok(AdminUser(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys() -> JwtKeys {
        let state = AppState::fake();
        JwtKeys::from_ref(&state)
    }

    fn make_user(email: &str) -> User {
        User {
            id: Uuid::new_v4(),
            email: email.into(),
            first_name: "Test".into(),
            last_name: "User".into(),
            password_hash: "irrelevant".into(),
            security_stamp: Uuid::new_v4(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[tokio::test]
    async fn sign_and_verify_round_trip() {
        let keys = make_keys();
        let user = make_user("a@b.com");
        let roles = vec!["User".to_string()];

        let token = keys.sign(&user, &roles).expect("sign");
        assert_eq!(token.split('.').count(), 3);

        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, "a@b.com");
        assert_eq!(claims.email, "a@b.com");
        assert_eq!(claims.uid, user.id);
        assert_eq!(claims.roles, roles);
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.aud, "test-aud");
    }

    #[tokio::test]
    async fn each_token_gets_a_fresh_jti() {
        let keys = make_keys();
        let user = make_user("a@b.com");
        let roles = vec!["User".to_string()];

        let first = keys.sign(&user, &roles).expect("sign");
        let second = keys.sign(&user, &roles).expect("sign");
        assert_ne!(first, second);

        let first = keys.decode_unverified(&first).expect("decode");
        let second = keys.decode_unverified(&second).expect("decode");
        assert_ne!(first.jti, second.jti);
    }

    #[tokio::test]
    async fn verify_rejects_wrong_issuer() {
        let keys = make_keys();
        let mut other = make_keys();
        other.issuer = "someone-else".into();

        let token = keys.sign(&make_user("a@b.com"), &[]).expect("sign");
        assert!(other.verify(&token).is_err());
    }

    #[tokio::test]
    async fn decode_unverified_reads_expired_and_foreign_tokens() {
        let keys = make_keys();
        let user = make_user("expired@b.com");

        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            sub: user.email.clone(),
            jti: Uuid::new_v4().to_string(),
            email: user.email.clone(),
            uid: user.id,
            roles: vec![],
            iat: (now - TimeDuration::hours(2)).unix_timestamp() as usize,
            exp: (now - TimeDuration::hours(1)).unix_timestamp() as usize,
            iss: keys.issuer.clone(),
            aud: keys.audience.clone(),
        };
        let expired = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"a-different-secret"),
        )
        .expect("encode");

        // Full verification refuses it, the refresh-path decode does not.
        assert!(keys.verify(&expired).is_err());
        let decoded = keys.decode_unverified(&expired).expect("decode");
        assert_eq!(decoded.email, "expired@b.com");
    }
}
