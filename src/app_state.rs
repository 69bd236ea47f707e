//! The Axum Application State

use crate::{
    error::ConnectError,
    models::{
        connect_result::{ConnectOutcome, ConnectResult},
        credential::Credential,
    },
    setups::{ConnectApi, ServerSetup},
};
use anyhow::{anyhow, Result};

#[derive(Clone)]
/// Global application route state.
pub struct AppState<S: ServerSetup> {
    /// Where messaging credentials are looked up by email
    pub credential_store: S::CredentialStore,
    /// Client for the messaging API's connect endpoint
    pub connect_api: S::ConnectApi,
}

impl<S: ServerSetup> AppState<S> {
    /// Run the whole connect flow for `email`: look up its credential, call
    /// the connect endpoint and interpret the response.
    pub async fn connect_by_email(&self, email: &str) -> Result<ConnectOutcome, ConnectError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(ConnectError::InvalidEmail);
        }

        let credential = Credential::lookup(&self.credential_store, email).await?;
        let response = self.connect_api.connect(&credential).await?;
        let result = ConnectResult::from_response(&response);

        tracing::info!(
            email,
            connected = result.connected,
            has_pair_code = result.pair_code.is_some(),
            "Connect response received"
        );

        ConnectOutcome::try_from(result)
    }
}

/// Builder for [`AppState`]
#[derive(Debug)]
pub struct AppStateBuilder<S: ServerSetup> {
    credential_store: Option<S::CredentialStore>,
    connect_api: Option<S::ConnectApi>,
}

impl<S: ServerSetup> Default for AppStateBuilder<S> {
    fn default() -> Self {
        Self {
            credential_store: None,
            connect_api: None,
        }
    }
}

impl<S: ServerSetup> AppStateBuilder<S> {
    /// Finalize the builder and return the [`AppState`]
    pub fn finalize(self) -> Result<AppState<S>> {
        let credential_store = self
            .credential_store
            .ok_or_else(|| anyhow!("credential_store is required"))?;

        let connect_api = self
            .connect_api
            .ok_or_else(|| anyhow!("connect_api is required"))?;

        Ok(AppState {
            credential_store,
            connect_api,
        })
    }

    /// Set the credential store
    pub fn with_credential_store(mut self, credential_store: S::CredentialStore) -> Self {
        self.credential_store = Some(credential_store);
        self
    }

    /// Set the messaging API client
    pub fn with_connect_api(mut self, connect_api: S::ConnectApi) -> Self {
        self.connect_api = Some(connect_api);
        self
    }
}

impl<S> std::fmt::Debug for AppState<S>
where
    S: ServerSetup,
    S::CredentialStore: std::fmt::Debug,
    S::ConnectApi: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("credential_store", &self.credential_store)
            .field("connect_api", &self.connect_api)
            .finish()
    }
}
