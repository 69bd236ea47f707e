//! The connect form.

use crate::{app_state::AppState, error::ConnectError, setups::ServerSetup, views::IndexPage};
use axum::{
    extract::{rejection::FormRejection, Form, State},
    response::Html,
};
use serde::Deserialize;
use utoipa::ToSchema;

/// Form fields submitted by the operator
#[derive(Deserialize, Clone, Debug, Default, ToSchema)]
pub struct ConnectForm {
    /// Client email the instance credentials are stored under
    #[serde(default)]
    pub email: String,
}

/// GET handler rendering the empty form
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Connect form", content_type = "text/html", body = String)
    )
)]
pub async fn get() -> Html<String> {
    Html(IndexPage::default().render())
}

/// POST handler connecting the instance registered under the submitted email
#[utoipa::path(
    post,
    path = "/",
    request_body(content = ConnectForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Form with the pairing code or a status message", content_type = "text/html", body = String)
    )
)]
pub async fn post<S: ServerSetup>(
    State(state): State<AppState<S>>,
    form: Result<Form<ConnectForm>, FormRejection>,
) -> Html<String> {
    // An unreadable submission renders like an empty email.
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            tracing::debug!(%rejection, "Could not read connect form");
            ConnectForm::default()
        }
    };

    let result = state.connect_by_email(&form.email).await;

    if let Err(err) = &result {
        log_failure(err);
    }

    Html(IndexPage::from_result(&form.email, result).render())
}

fn log_failure(err: &ConnectError) {
    match err {
        ConnectError::Store(source) => {
            tracing::error!(error = ?source, "Credential lookup failed")
        }
        ConnectError::Network(_)
        | ConnectError::Upstream { .. }
        | ConnectError::MalformedResponse(_) => {
            tracing::error!(error = %err, "Connect call failed")
        }
        _ => tracing::info!(reason = %err, "Connect request refused"),
    }
}
