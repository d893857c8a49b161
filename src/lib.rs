//! Stateless token authentication for the adventure web service.
//!
//! - [`auth`]: HS512 signed tokens, signing keys and Argon2 password hashes.
//! - [`web`]: axum middleware that resolves the caller from the `Authorization`
//!   header and an ordered policy of public and protected routes.
//! - [`account`]: registration, login and email verification on top of an
//!   [`identity::IdentityStore`].
//! - [`config`]: TOML or environment configuration.

pub mod account;
pub mod auth;
pub mod config;
pub mod error;
pub mod identity;
pub mod prelude;
pub mod web;
