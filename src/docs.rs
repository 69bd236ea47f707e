//! OpenAPI doc generation.

use crate::{
    error::{AppError, ErrorResponse},
    routes::{health, index, ping},
};
use utoipa::OpenApi;

/// API documentation generator.
#[derive(OpenApi)]
#[openapi(
    paths(health::healthcheck, ping::get, index::get, index::post),
    components(schemas(
        AppError,
        ErrorResponse,
        index::ConnectForm,
        health::HealthcheckResponse
    ))
)]
/// Tied to OpenAPI documentation.
#[derive(Debug)]
pub struct ApiDoc;
