use lazy_static::lazy_static;
use rand::{distributions::Alphanumeric, Rng};
use regex::Regex;
use sqlx::PgPool;
use tracing::warn;

use crate::auth::dto::{ApiUserDto, AuthResponseDto, IdentityError, LoginDto};
use crate::auth::jwt::JwtKeys;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::repo::User;

pub const ROLE_USER: &str = "User";
pub const ROLE_ADMINISTRATOR: &str = "Administrator";

/// Identity token-table coordinates of the refresh token.
const REFRESH_TOKEN_PROVIDER: &str = "HotelListingApi";
const REFRESH_TOKEN_PURPOSE: &str = "RefreshToken";
const REFRESH_TOKEN_LEN: usize = 64;

const PASSWORD_MIN_LEN: usize = 6;
const PASSWORD_MAX_LEN: usize = 15;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Field-level checks applied before touching the store. An empty result
/// means the DTO is acceptable.
pub fn validate_registration(dto: &ApiUserDto) -> Vec<IdentityError> {
    let mut errors = Vec::new();

    if dto.first_name.trim().is_empty() {
        errors.push(IdentityError::new(
            "FirstNameRequired",
            "The FirstName field is required.",
        ));
    }
    if dto.last_name.trim().is_empty() {
        errors.push(IdentityError::new(
            "LastNameRequired",
            "The LastName field is required.",
        ));
    }
    if !is_valid_email(&dto.email) {
        errors.push(IdentityError::new(
            "InvalidEmail",
            format!("Email '{}' is invalid.", dto.email),
        ));
    }

    let password = &dto.password;
    if password.chars().count() < PASSWORD_MIN_LEN {
        errors.push(IdentityError::new(
            "PasswordTooShort",
            format!("Passwords must be at least {PASSWORD_MIN_LEN} characters."),
        ));
    }
    if password.chars().count() > PASSWORD_MAX_LEN {
        errors.push(IdentityError::new(
            "PasswordTooLong",
            format!("Passwords must be at most {PASSWORD_MAX_LEN} characters."),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push(IdentityError::new(
            "PasswordRequiresDigit",
            "Passwords must have at least one digit ('0'-'9').",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push(IdentityError::new(
            "PasswordRequiresUpper",
            "Passwords must have at least one uppercase ('A'-'Z').",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        errors.push(IdentityError::new(
            "PasswordRequiresLower",
            "Passwords must have at least one lowercase ('a'-'z').",
        ));
    }

    errors
}

/// Creates a user keyed by email and assigns the default role. Returns the
/// validation-error list; empty means success. Does not log the user in.
pub async fn register(db: &PgPool, dto: &ApiUserDto) -> anyhow::Result<Vec<IdentityError>> {
    let email = dto.email.trim().to_lowercase();

    let mut errors = validate_registration(dto);
    if !errors.is_empty() {
        return Ok(errors);
    }

    if User::find_by_email(db, &email).await?.is_some() {
        warn!(email = %email, "email already registered");
        errors.push(IdentityError::new(
            "DuplicateEmail",
            format!("Email '{email}' is already taken."),
        ));
        return Ok(errors);
    }

    let hash = hash_password(&dto.password)?;
    User::create(db, &email, &dto.first_name, &dto.last_name, &hash, ROLE_USER).await?;

    Ok(Vec::new())
}

/// `None` for an unknown email or a wrong password; the caller cannot tell
/// which check failed.
pub async fn login(
    db: &PgPool,
    keys: &JwtKeys,
    dto: &LoginDto,
) -> anyhow::Result<Option<AuthResponseDto>> {
    let email = dto.email.trim().to_lowercase();

    let Some(user) = User::find_by_email(db, &email).await? else {
        return Ok(None);
    };
    if !verify_password(&dto.password, &user.password_hash)? {
        return Ok(None);
    }

    issue(db, keys, &user).await.map(Some)
}

/// Signs a fresh access token and rotates the refresh token.
async fn issue(db: &PgPool, keys: &JwtKeys, user: &User) -> anyhow::Result<AuthResponseDto> {
    let roles = User::roles(db, user.id).await?;
    let token = keys.sign(user, &roles)?;
    let refresh_token = create_refresh_token(db, user).await?;
    Ok(AuthResponseDto {
        token,
        user_id: user.id.to_string(),
        refresh_token,
    })
}

/// Replaces the stored refresh token with a new opaque value; earlier tokens
/// are implicitly invalidated.
pub async fn create_refresh_token(db: &PgPool, user: &User) -> anyhow::Result<String> {
    let token: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(REFRESH_TOKEN_LEN)
        .map(char::from)
        .collect();

    User::replace_token(
        db,
        user.id,
        REFRESH_TOKEN_PROVIDER,
        REFRESH_TOKEN_PURPOSE,
        &token,
    )
    .await?;

    Ok(token)
}

/// Exchanges a (possibly expired) access token + refresh token for a fresh
/// pair. On a refresh-token mismatch the user's security stamp is rotated
/// before returning `None`, so a replayed token buys nothing.
pub async fn verify_refresh_token(
    db: &PgPool,
    keys: &JwtKeys,
    request: &AuthResponseDto,
) -> anyhow::Result<Option<AuthResponseDto>> {
    let Ok(claims) = keys.decode_unverified(&request.token) else {
        return Ok(None);
    };

    let Some(user) = User::find_by_email(db, &claims.email).await? else {
        return Ok(None);
    };
    if user.id.to_string() != request.user_id {
        warn!(user_id = %user.id, "refresh token user id mismatch");
        return Ok(None);
    }

    let stored = User::get_token(db, user.id, REFRESH_TOKEN_PROVIDER, REFRESH_TOKEN_PURPOSE).await?;
    if stored.as_deref() == Some(request.refresh_token.as_str()) {
        return issue(db, keys, &user).await.map(Some);
    }

    warn!(user_id = %user.id, "refresh token mismatch, invalidating security stamp");
    User::rotate_security_stamp(db, user.id).await?;
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dto(email: &str, password: &str) -> ApiUserDto {
        ApiUserDto {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn accepts_the_reference_credentials() {
        let errors = validate_registration(&dto("a@b.com", "Secret1"));
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    }

    #[test]
    fn rejects_short_password_with_coded_errors() {
        let errors = validate_registration(&dto("a@b.com", "abc"));
        let codes: Vec<&str> = errors.iter().map(|e| e.code.as_str()).collect();
        assert!(codes.contains(&"PasswordTooShort"));
        assert!(codes.contains(&"PasswordRequiresDigit"));
        assert!(codes.contains(&"PasswordRequiresUpper"));
    }

    #[test]
    fn rejects_overlong_password() {
        let errors = validate_registration(&dto("a@b.com", "Abcdefghij12345678"));
        assert!(errors.iter().any(|e| e.code == "PasswordTooLong"));
    }

    #[test]
    fn rejects_malformed_email() {
        let errors = validate_registration(&dto("not-an-email", "Secret1"));
        assert!(errors.iter().any(|e| e.code == "InvalidEmail"));
    }

    #[test]
    fn rejects_blank_names() {
        let mut bad = dto("a@b.com", "Secret1");
        bad.first_name = "  ".into();
        bad.last_name = String::new();
        let errors = validate_registration(&bad);
        let codes: Vec<&str> = errors.iter().map(|e| e.code.as_str()).collect();
        assert!(codes.contains(&"FirstNameRequired"));
        assert!(codes.contains(&"LastNameRequired"));
    }

    #[test]
    fn email_validation() {
        assert!(is_valid_email("user@example.com"));
        assert!(!is_valid_email("user@example"));
        assert!(!is_valid_email("user example.com"));
        assert!(!is_valid_email(""));
    }
}
