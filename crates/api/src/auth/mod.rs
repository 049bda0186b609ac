//! Identity handling.
//!
//! The API consumes authenticated identities; it never issues them. Tokens
//! are HS256 JWTs produced by the deployment's identity provider and
//! validated here decode-only.

pub mod jwt;
