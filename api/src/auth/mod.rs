pub mod claims;
pub mod extractors;
pub mod guards;
pub mod middleware;

pub use claims::{AuthUser, Claims};

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

/// Generates a session JWT and its expiry timestamp for a given user.
pub fn generate_session_jwt(user_id: i64) -> (String, String) {
    let secret = common::config::session_secret();
    let duration_hours = common::config::session_duration_hours();

    let expiry = Utc::now() + Duration::hours(duration_hours);
    let claims = Claims {
        sub: user_id,
        exp: expiry.timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("Token encoding failed");

    (token, expiry.to_rfc3339())
}

/// Verifies a session JWT and returns its claims.
pub fn decode_session_jwt(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let secret = common::config::session_secret();
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::{decode_session_jwt, generate_session_jwt};
    use serial_test::serial;

    #[test]
    #[serial]
    fn session_token_round_trips() {
        common::config::AppConfig::reset();
        let (token, _expiry) = generate_session_jwt(42);
        let claims = decode_session_jwt(&token).unwrap();
        assert_eq!(claims.sub, 42);
    }

    #[test]
    #[serial]
    fn tampered_token_is_rejected() {
        common::config::AppConfig::reset();
        let (token, _) = generate_session_jwt(42);
        let mut tampered = token.clone();
        tampered.push('x');
        assert!(decode_session_jwt(&tampered).is_err());
    }
}
