//! Access-token validation.
//!
//! Accounts and sign-in live with the external identity provider; this
//! service only verifies the HS256 tokens it issues.

pub mod jwt;
