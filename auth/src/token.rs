//! JWT issuance and verification.
//!
//! Access and refresh tokens are signed with distinct HS256 secrets, so a
//! refresh token can never be replayed as an access token. A successful
//! refresh rotates both tokens.

use crate::error::{AuthError, AuthResult};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};

/// Claims carried by both token kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (stringified user id, standard claim)
    pub sub: String,
    pub user_id: i64,
    pub is_admin: bool,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub token: String,
    pub refresh_token: String,
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl Keys {
    fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

pub struct TokenService {
    access: Keys,
    refresh: Keys,
    access_ttl_secs: u64,
    refresh_ttl_secs: u64,
    validation: Validation,
}

impl TokenService {
    pub fn new(
        access_secret: &str,
        refresh_secret: &str,
        access_ttl_secs: u64,
        refresh_ttl_secs: u64,
    ) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 60; // allow for clock skew

        Self {
            access: Keys::from_secret(access_secret),
            refresh: Keys::from_secret(refresh_secret),
            access_ttl_secs,
            refresh_ttl_secs,
            validation,
        }
    }

    /// Issue a fresh access/refresh token pair for a user.
    pub fn issue_pair(&self, user_id: i64, is_admin: bool) -> AuthResult<TokenPair> {
        let now = chrono::Utc::now().timestamp() as u64;

        let token = self.sign(user_id, is_admin, now, self.access_ttl_secs, &self.access)?;
        let refresh_token = self.sign(user_id, is_admin, now, self.refresh_ttl_secs, &self.refresh)?;

        Ok(TokenPair {
            token,
            refresh_token,
        })
    }

    /// Verify an access token and return its claims.
    pub fn verify_access(&self, token: &str) -> AuthResult<Claims> {
        Self::verify(token, &self.access.decoding, &self.validation)
    }

    /// Verify a refresh token and rotate the pair.
    pub fn refresh(&self, refresh_token: &str) -> AuthResult<TokenPair> {
        let claims = Self::verify(refresh_token, &self.refresh.decoding, &self.validation)?;
        self.issue_pair(claims.user_id, claims.is_admin)
    }

    fn sign(
        &self,
        user_id: i64,
        is_admin: bool,
        now: u64,
        ttl_secs: u64,
        keys: &Keys,
    ) -> AuthResult<String> {
        let claims = Claims {
            sub: user_id.to_string(),
            user_id,
            is_admin,
            iat: now,
            exp: now + ttl_secs,
        };

        encode(&Header::default(), &claims, &keys.encoding)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    fn verify(token: &str, key: &DecodingKey, validation: &Validation) -> AuthResult<Claims> {
        decode::<Claims>(token, key, validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::InvalidToken(e.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("access-test-secret", "refresh-test-secret", 180, 3600)
    }

    #[test]
    fn issued_access_token_carries_claims() {
        let tokens = service().issue_pair(42, true).unwrap();
        let claims = service().verify_access(&tokens.token).unwrap();

        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.sub, "42");
        assert!(claims.is_admin);
        assert_eq!(claims.exp - claims.iat, 180);
    }

    #[test]
    fn refresh_token_is_not_an_access_token() {
        let tokens = service().issue_pair(7, false).unwrap();
        assert!(service().verify_access(&tokens.refresh_token).is_err());
    }

    #[test]
    fn refresh_rotates_the_pair() {
        let svc = service();
        let tokens = svc.issue_pair(7, false).unwrap();
        let rotated = svc.refresh(&tokens.refresh_token).unwrap();

        let claims = svc.verify_access(&rotated.token).unwrap();
        assert_eq!(claims.user_id, 7);
        assert!(!claims.is_admin);
    }

    #[test]
    fn foreign_signature_is_rejected() {
        let other = TokenService::new("some-other-secret", "another-secret", 180, 3600);
        let tokens = other.issue_pair(9, false).unwrap();

        assert!(matches!(
            service().verify_access(&tokens.token),
            Err(AuthError::InvalidToken(_))
        ));
    }
}
