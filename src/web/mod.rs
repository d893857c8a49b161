//! HTTP layer: request context, authentication middleware, access policy and routes.

pub mod ctx;
pub mod error;
pub mod mw_auth;
pub mod policy;
pub mod routes;
