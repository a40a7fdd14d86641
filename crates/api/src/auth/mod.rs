//! Bearer-token authentication.
//!
//! Tokens are issued outside this service; [`jwt::generate_access_token`] is
//! kept for operators and tests.

pub mod jwt;
