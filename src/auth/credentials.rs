use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use tracing::debug;

use crate::config::{JWTConfig, PasswordConfig};
use crate::models::Claims;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("invalid or expired token: {0}")]
    InvalidToken(String),

    #[error("failed to hash password: {0}")]
    Hash(String),

    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// Hashes and checks passwords, and issues and validates bearer tokens.
///
/// Token validation is purely cryptographic. It never touches the store, so
/// a valid token says nothing about whether the user still exists.
pub struct Credentials {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    ttl_secs: i64,
    cost: u32,
}

impl Credentials {
    pub fn new(jwt: &JWTConfig, password: &PasswordConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_aud = false;
        validation.set_issuer(&[jwt.iss.as_str()]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);

        Credentials {
            encoding_key: EncodingKey::from_secret(jwt.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(jwt.secret.as_bytes()),
            validation,
            issuer: jwt.iss.clone(),
            ttl_secs: jwt.exp,
            cost: password.cost,
        }
    }

    /// Salted bcrypt digest; two calls with the same password differ.
    pub fn hash(&self, password: &str) -> Result<String, CredentialError> {
        bcrypt::hash(password, self.cost).map_err(|e| CredentialError::Hash(e.to_string()))
    }

    /// Never fails: a malformed digest simply doesn't match.
    pub fn verify(&self, password: &str, digest: &str) -> bool {
        match bcrypt::verify(password, digest) {
            Ok(matched) => matched,
            Err(e) => {
                debug!(error = %e, "Stored password digest could not be parsed");
                false
            }
        }
    }

    /// Signs a token bound to `user_id` that expires after the configured TTL.
    pub fn issue(&self, user_id: &str) -> Result<String, CredentialError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            iss: self.issuer.clone(),
            iat: now,
            exp: now + self.ttl_secs,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| CredentialError::Signing(e.to_string()))
    }

    /// Returns the user id the token was issued for.
    pub fn validate(&self, token: &str) -> Result<String, CredentialError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| CredentialError::InvalidToken(e.to_string()))?;
        Ok(data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials_with_ttl(ttl_secs: i64) -> Credentials {
        Credentials::new(
            &JWTConfig {
                secret: "test-secret".to_string(),
                iss: "jobboard-test".to_string(),
                exp: ttl_secs,
            },
            &PasswordConfig { cost: 4 },
        )
    }

    #[test]
    fn test_hash_is_salted_and_verifies() {
        let creds = credentials_with_ttl(3600);
        let a = creds.hash("hunter22").unwrap();
        let b = creds.hash("hunter22").unwrap();
        assert_ne!(a, b);
        assert!(creds.verify("hunter22", &a));
        assert!(creds.verify("hunter22", &b));
        assert!(!creds.verify("hunter23", &a));
    }

    #[test]
    fn test_verify_malformed_digest_is_false() {
        let creds = credentials_with_ttl(3600);
        assert!(!creds.verify("password", "not-a-bcrypt-digest"));
        assert!(!creds.verify("password", ""));
    }

    #[test]
    fn test_default_cost_is_twelve() {
        let creds = Credentials::new(
            &JWTConfig {
                secret: "s".to_string(),
                iss: "i".to_string(),
                exp: 60,
            },
            &PasswordConfig::default(),
        );
        let digest = creds.hash("pw").unwrap();
        assert!(digest.starts_with("$2b$12$"), "unexpected digest: {}", digest);
    }

    #[test]
    fn test_issue_then_validate_returns_user_id() {
        let creds = credentials_with_ttl(3600);
        let token = creds.issue("user-42").unwrap();
        assert_eq!(creds.validate(&token), Ok("user-42".to_string()));
    }

    #[test]
    fn test_expired_token_fails() {
        let creds = credentials_with_ttl(-10);
        let token = creds.issue("user-42").unwrap();
        assert!(matches!(
            creds.validate(&token),
            Err(CredentialError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_token_signed_with_other_secret_fails() {
        let creds = credentials_with_ttl(3600);
        let other = Credentials::new(
            &JWTConfig {
                secret: "another-secret".to_string(),
                iss: "jobboard-test".to_string(),
                exp: 3600,
            },
            &PasswordConfig { cost: 4 },
        );
        let token = other.issue("user-42").unwrap();
        assert!(creds.validate(&token).is_err());
    }

    #[test]
    fn test_malformed_token_fails() {
        let creds = credentials_with_ttl(3600);
        assert!(creds.validate("not.a.jwt").is_err());
        assert!(creds.validate("").is_err());
    }

    #[test]
    fn test_token_carries_only_identity_claims() {
        let creds = credentials_with_ttl(3600);
        let token = creds.issue("user-42").unwrap();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_aud = false;
        let claims = decode::<serde_json::Value>(
            &token,
            &DecodingKey::from_secret(b"test-secret"),
            &validation,
        )
        .unwrap()
        .claims;
        let keys: Vec<&String> = claims.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 4, "unexpected claims: {:?}", keys);
        assert!(claims.get("role").is_none());
        assert_eq!(claims["exp"].as_i64().unwrap() - claims["iat"].as_i64().unwrap(), 3600);
    }
}
