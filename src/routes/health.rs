//! Healthcheck route.

use crate::{app_state::AppState, error::AppResult, setups::CredentialStore, setups::ServerSetup};
use axum::{
    self,
    extract::{Json, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A healthcheck response containing diagnostic information for the service
#[derive(ToSchema, Eq, PartialEq, Debug, Deserialize, Serialize)]
pub struct HealthcheckResponse {
    credential_store_reachable: bool,
}

impl HealthcheckResponse {
    /// Whether the service is healthy
    pub fn is_healthy(&self) -> bool {
        self.credential_store_reachable
    }

    /// The status code for the healthcheck response
    pub fn status_code(&self) -> StatusCode {
        if self.is_healthy() {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// GET handler for checking service health.
#[utoipa::path(
    get,
    path = "/healthcheck",
    responses(
        (status = 200, description = "whatsapp-connect-server healthy", body=HealthcheckResponse),
        (status = 503, description = "whatsapp-connect-server not healthy", body=HealthcheckResponse)
    )
)]
pub async fn healthcheck<S: ServerSetup>(
    State(state): State<AppState<S>>,
) -> AppResult<(StatusCode, Json<HealthcheckResponse>)> {
    let response = HealthcheckResponse {
        credential_store_reachable: state.credential_store.is_reachable().await,
    };

    Ok((response.status_code(), Json(response)))
}
