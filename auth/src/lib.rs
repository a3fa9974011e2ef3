//! Authentication building blocks for the shop backend: bcrypt password
//! hashing and JWT access/refresh token handling.

pub mod error;
pub mod password;
pub mod token;

pub use error::{AuthError, AuthResult};
pub use token::{Claims, TokenPair, TokenService};
