//! Production server setup code

use crate::{
    error::ConnectError,
    models::credential::{Credential, CredentialRow},
    settings,
    setups::{ConnectApi, CredentialStore, ServerSetup},
};
use anyhow::{anyhow, Context as _, Result};
use async_trait::async_trait;
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;
use serde_json::{json, Map, Value};
use std::time::Duration;
use url::Url;

/// Production implementation of `ServerSetup`.
/// Actually calls out to the HTTP services configured in `settings.toml`.
#[derive(Clone, Debug, Default)]
pub struct ProdSetup;

impl ServerSetup for ProdSetup {
    type CredentialStore = PostgrestCredentialStore;
    type ConnectApi = HttpConnectApi;
}

/// Build a client with the given timeout and the standard tracing
/// middleware attached.
pub fn traced_client(timeout: Duration) -> Result<ClientWithMiddleware> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .context("Could not build HTTP client")?;

    Ok(ClientBuilder::new(client)
        .with(TracingMiddleware::default())
        .build())
}

/// A `CredentialStore` reading a hosted Postgres table through its
/// PostgREST endpoint (`<url>/rest/v1/<table>`).
#[derive(Clone)]
pub struct PostgrestCredentialStore {
    client: ClientWithMiddleware,
    table_url: Url,
    api_key: String,
    email_field: String,
    token_field: String,
    phone_field: String,
}

impl std::fmt::Debug for PostgrestCredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgrestCredentialStore")
            .field("table_url", &self.table_url.as_str())
            .field("email_field", &self.email_field)
            .field("token_field", &self.token_field)
            .field("phone_field", &self.phone_field)
            .finish()
    }
}

impl PostgrestCredentialStore {
    /// Create a store with a traced client using the configured timeout.
    pub fn new(settings: &settings::Store) -> Result<Self> {
        Self::new_with(traced_client(settings.timeout())?, settings)
    }

    /// Create a store that sends its requests through `client`.
    pub fn new_with(client: ClientWithMiddleware, settings: &settings::Store) -> Result<Self> {
        let table_url = Url::parse(&format!("{}/rest/v1/{}", settings.url, settings.table))
            .with_context(|| format!("Invalid store URL: {}", settings.url))?;

        Ok(Self {
            client,
            table_url,
            api_key: settings.api_key.clone(),
            email_field: settings.email_field.clone(),
            token_field: settings.token_field.clone(),
            phone_field: settings.phone_field.clone(),
        })
    }

    fn get(&self, url: Url) -> reqwest_middleware::RequestBuilder {
        self.client
            .get(url)
            .header("apikey", &self.api_key)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(ACCEPT, "application/json")
    }

    fn row_query(&self, email: &str) -> Url {
        let mut url = self.table_url.clone();
        url.query_pairs_mut()
            .append_pair(
                "select",
                &format!("{},{}", self.token_field, self.phone_field),
            )
            .append_pair(&self.email_field, &format!("eq.{email}"))
            .append_pair("limit", "1");
        url
    }

    fn string_column(&self, row: &Map<String, Value>, column: &str) -> Option<String> {
        row.get(column).and_then(Value::as_str).map(str::to_string)
    }
}

#[async_trait]
impl CredentialStore for PostgrestCredentialStore {
    async fn find_row(&self, email: &str) -> Result<Option<CredentialRow>, ConnectError> {
        let response = self
            .get(self.row_query(email))
            .send()
            .await
            .map_err(|e| ConnectError::Store(e.into()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(?status, %body, "Credential store query failed");
            return Err(ConnectError::Store(anyhow!(
                "store responded with {status}: {body}"
            )));
        }

        let rows = response
            .json::<Vec<Map<String, Value>>>()
            .await
            .map_err(|e| ConnectError::Store(e.into()))?;

        Ok(rows.first().map(|row| CredentialRow {
            token: self.string_column(row, &self.token_field),
            phone: self.string_column(row, &self.phone_field),
        }))
    }

    async fn is_reachable(&self) -> bool {
        let mut url = self.table_url.clone();
        url.query_pairs_mut().append_pair("limit", "0");

        match self.get(url).send().await {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                tracing::warn!(%err, "Credential store unreachable");
                false
            }
        }
    }
}

/// A `ConnectApi` calling the messaging API over HTTP.
#[derive(Clone, Debug)]
pub struct HttpConnectApi {
    client: ClientWithMiddleware,
    connect_url: Url,
}

impl HttpConnectApi {
    /// Create a client bounded by the configured connect timeout.
    pub fn new(settings: &settings::Messaging) -> Result<Self> {
        Self::new_with(traced_client(settings.timeout())?, settings)
    }

    /// Create a connect client that sends its requests through `client`.
    pub fn new_with(client: ClientWithMiddleware, settings: &settings::Messaging) -> Result<Self> {
        let connect_url = Url::parse(&settings.connect_url)
            .with_context(|| format!("Invalid connect URL: {}", settings.connect_url))?;

        Ok(Self {
            client,
            connect_url,
        })
    }
}

#[async_trait]
impl ConnectApi for HttpConnectApi {
    async fn connect(&self, credential: &Credential) -> Result<Value, ConnectError> {
        let body = json!({ "phone": credential.phone }).to_string();

        tracing::info!(url = %self.connect_url, "Calling messaging API connect");

        let response = self
            .client
            .post(self.connect_url.clone())
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .header("token", &credential.token)
            .body(body)
            .send()
            .await
            .map_err(ConnectError::Network)?;

        let status = response.status();
        let text = response.text().await?;

        if status.is_client_error() || status.is_server_error() {
            tracing::error!(?status, body = %text, "Messaging API returned an error");
            return Err(ConnectError::Upstream {
                status: status.as_u16(),
                body: text,
            });
        }

        serde_json::from_str(&text).map_err(ConnectError::MalformedResponse)
    }
}
