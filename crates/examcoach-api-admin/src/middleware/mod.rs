//! Middleware for the admin callable API.

pub mod auth;

pub use auth::caller_identity_middleware;
