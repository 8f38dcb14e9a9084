//! Session Authenticator 実装

mod jwt;

pub use jwt::{issue_token, Claims, JwtIdentityResolver};
