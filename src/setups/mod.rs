//! This abstracts the server's side-effects into "setups".
//!
//! This module defines the traits, submodules define test & production
//! collections of implementations.
use crate::{
    error::ConnectError,
    models::credential::{Credential, CredentialRow},
};
use async_trait::async_trait;
use serde_json::Value;

pub mod prod;

/// This trait groups type parameters to the server's `AppState` struct.
///
/// It captures the setup of the server, distinguishing between e.g.
/// unit testing & production setups.
pub trait ServerSetup: Clone + Send + Sync + 'static {
    /// Where messaging credentials are read from
    type CredentialStore: CredentialStore;
    /// Which client to use for the messaging API's connect endpoint
    type ConnectApi: ConnectApi;
}

/// Read access to the table of per-client messaging credentials.
#[async_trait]
pub trait CredentialStore: Clone + Send + Sync + 'static {
    /// Fetch the first row whose email column equals `email` exactly.
    async fn find_row(&self, email: &str) -> Result<Option<CredentialRow>, ConnectError>;

    /// Whether the store currently answers queries.
    async fn is_reachable(&self) -> bool;
}

/// The messaging API's instance "connect" endpoint.
#[async_trait]
pub trait ConnectApi: Clone + Send + Sync + 'static {
    /// Ask the API to connect the instance owning `credential`, returning
    /// the raw JSON response.
    async fn connect(&self, credential: &Credential) -> Result<Value, ConnectError>;
}
