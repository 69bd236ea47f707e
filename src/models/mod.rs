//! Models

pub mod connect_result;
pub mod credential;
