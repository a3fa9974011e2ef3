use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("password rejected: {0}")]
    WeakPassword(String),

    #[error("hashing failed: {0}")]
    Hashing(String),

    #[error("missing bearer token")]
    MissingToken,

    #[error("token has expired")]
    Expired,

    #[error("invalid token: {0}")]
    InvalidToken(String),
}
