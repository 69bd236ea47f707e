//! Helpers for running isolated webserver instances
use crate::{
    app_state::{AppState, AppStateBuilder},
    router::setup_app_router,
    setups::test::{InMemoryCredentialStore, TestConnectApi, TestSetup},
};
use anyhow::Result;
use axum::Router;

/// A reference to a router in an isolated test environment
#[derive(Debug)]
pub(crate) struct TestContext {
    app: Router,
    app_state: AppState<TestSetup>,
}

impl TestContext {
    /// Create a new test context with an empty store
    pub(crate) fn new() -> Result<Self> {
        Self::new_with_state(|builder| builder)
    }

    pub(crate) fn new_with_state<F>(f: F) -> Result<Self>
    where
        F: FnOnce(AppStateBuilder<TestSetup>) -> AppStateBuilder<TestSetup>,
    {
        let builder = AppStateBuilder::default()
            .with_credential_store(InMemoryCredentialStore::default())
            .with_connect_api(TestConnectApi::default());

        let app_state = f(builder).finalize()?;

        let app = setup_app_router(app_state.clone());

        Ok(Self { app, app_state })
    }

    pub(crate) fn app(&self) -> Router {
        self.app.clone()
    }

    pub(crate) fn credential_store(&self) -> &InMemoryCredentialStore {
        &self.app_state.credential_store
    }

    pub(crate) fn connect_api(&self) -> &TestConnectApi {
        &self.app_state.connect_api
    }
}
