//! Routes for [axum::Router].

pub mod fallback;
pub mod health;
pub mod index;
pub mod ping;
