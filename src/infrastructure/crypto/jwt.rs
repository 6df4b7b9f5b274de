//! JWT verification
//!
//! Tokens are minted by the organisation's identity provider. This service
//! only checks the signature, issuer and expiry, then trusts `sub` as the
//! member's e-mail address.

use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::config::SecurityConfig;

#[derive(Clone)]
pub struct JwtConfig {
    /// Shared HMAC secret
    pub secret: String,
    /// Expected `iss` claim
    pub issuer: String,
}

impl JwtConfig {
    pub fn from_settings(settings: &SecurityConfig) -> Self {
        Self {
            secret: settings.jwt_secret.clone(),
            issuer: settings.jwt_issuer.clone(),
        }
    }
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"***")
            .field("issuer", &self.issuer)
            .finish()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MemberClaims {
    /// Member e-mail
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    pub iss: String,
}

/// Verify and decode a bearer token
pub fn verify_token(
    token: &str,
    config: &JwtConfig,
) -> Result<MemberClaims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.set_issuer(&[&config.issuer]);

    let token_data = decode::<MemberClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;

    Ok(token_data.claims)
}

/// Mint a token the way the identity provider would.
#[cfg(test)]
pub(crate) fn sign_token(email: &str, config: &JwtConfig, ttl: chrono::Duration) -> String {
    use jsonwebtoken::{encode, EncodingKey, Header};

    let now = chrono::Utc::now();
    let claims = MemberClaims {
        sub: email.to_string(),
        exp: (now + ttl).timestamp(),
        iat: now.timestamp(),
        iss: config.issuer.clone(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret".into(),
            issuer: "meetbook".into(),
        }
    }

    #[test]
    fn valid_token_yields_email() {
        let token = sign_token("ann@example.com", &config(), Duration::hours(1));
        let claims = verify_token(&token, &config()).unwrap();
        assert_eq!(claims.sub, "ann@example.com");
    }

    #[test]
    fn wrong_secret_or_issuer_is_rejected() {
        let token = sign_token("ann@example.com", &config(), Duration::hours(1));

        let other_secret = JwtConfig {
            secret: "nope".into(),
            ..config()
        };
        assert!(verify_token(&token, &other_secret).is_err());

        let other_issuer = JwtConfig {
            issuer: "someone-else".into(),
            ..config()
        };
        assert!(verify_token(&token, &other_issuer).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = sign_token("ann@example.com", &config(), Duration::hours(-2));
        assert!(verify_token(&token, &config()).is_err());
    }

    #[test]
    fn debug_hides_secret() {
        assert!(!format!("{:?}", config()).contains("test-secret"));
    }
}
