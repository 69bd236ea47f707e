//! whatsapp-connect-server

use anyhow::{anyhow, Result};
use axum::{headers::HeaderName, Router};
use axum_server::Handle;
use clap::Parser;
use http::header;
use std::{
    io,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
    process::exit,
    time::Duration,
};
use tokio::{signal, task::JoinHandle};
#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer, sensitive_headers::SetSensitiveHeadersLayer,
    timeout::TimeoutLayer, ServiceBuilderExt,
};
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use whatsapp_connect_server::{
    app_state::{AppState, AppStateBuilder},
    docs::ApiDoc,
    middleware::{request_ulid::MakeRequestUlid, runtime},
    router,
    settings::Settings,
    setups::prod::{HttpConnectApi, PostgrestCredentialStore, ProdSetup},
};

/// Request identifier field.
const REQUEST_ID: &str = "request_id";

#[derive(Debug, Parser)]
#[command(name = "whatsapp-connect-app", about = "Connect WhatsApp instances by email")]
struct Cli {
    /// Path to the settings file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let (stdout_writer, _stdout_guard) = tracing_appender::non_blocking(io::stdout());

    setup_tracing(stdout_writer);

    let settings = Settings::load(cli.config)?;

    info!(
        subject = "app_settings",
        category = "init",
        "starting with settings: {:?}",
        settings,
    );

    let app_state = AppStateBuilder::<ProdSetup>::default()
        .with_credential_store(PostgrestCredentialStore::new(&settings.store)?)
        .with_connect_api(HttpConnectApi::new(&settings.messaging)?)
        .finalize()?;

    let cancellation_token = CancellationToken::new();

    let app_server = tokio::spawn(serve_app(
        settings,
        app_state,
        cancellation_token.clone(),
    ));

    tokio::spawn(async move {
        capture_sigterm().await;

        cancellation_token.cancel();
        println!("\nCtrl+C received, shutting down. Press Ctrl+C again to force shutdown.");

        capture_sigterm().await;

        exit(130)
    });

    join_app_server(app_server).await
}

/// Wait for the app server task, surfacing its error as the process result.
async fn join_app_server(app_server: JoinHandle<Result<()>>) -> Result<()> {
    if let Err(e) = app_server.await? {
        tracing::error!("app server crashed: {}", e);
        return Err(e);
    }

    Ok(())
}

async fn serve_app(
    settings: Settings,
    app_state: AppState<ProdSetup>,
    token: CancellationToken,
) -> Result<()> {
    let req_id = HeaderName::from_static(REQUEST_ID);

    let router = router::setup_app_router(app_state)
        // Set and propagate "request_id" (as a ulid) per request.
        .layer(
            ServiceBuilder::new()
                .set_request_id(req_id.clone(), MakeRequestUlid)
                .propagate_request_id(req_id),
        )
        // Applies the `tower_http::timeout::Timeout` middleware which
        // applies a timeout to requests.
        .layer(TimeoutLayer::new(Duration::from_millis(
            settings.server.timeout_ms,
        )))
        // Catches runtime panics and converts them into
        // `500 Internal Server` responses.
        .layer(CatchPanicLayer::custom(runtime::catch_panic))
        // Mark headers as sensitive on both requests and responses.
        .layer(SetSensitiveHeadersLayer::new([
            header::AUTHORIZATION,
            header::COOKIE,
        ]))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()));

    let (server, _) = serve("Application", router, settings.server.port).await?;

    token.cancelled().await;
    server.graceful_shutdown(Some(Duration::from_secs(10)));

    Ok(())
}

async fn serve(name: &str, app: Router, port: u16) -> Result<(Handle, SocketAddr)> {
    let bind_addr: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port);
    info!(
        subject = "app_start",
        category = "init",
        "{} server listening on {}",
        name,
        bind_addr
    );

    let handle = Handle::new();

    tokio::spawn({
        let handle = handle.clone();
        async move {
            if let Err(e) = axum_server::bind(bind_addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await
            {
                tracing::error!("server error: {}", e);
            }
        }
    });

    let addr = handle
        .listening()
        .await
        .ok_or_else(|| anyhow!("{name} server failed to bind {bind_addr}"))?;

    Ok((handle, addr))
}

/// Captures and waits for system signals.
async fn capture_sigterm() {
    #[cfg(unix)]
    let term = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!("failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await
            }
        }
    };

    #[cfg(not(unix))]
    let term = std::future::pending::<()>();

    tokio::select! {
        _ = signal::ctrl_c() => {},
        _ = term => {}
    };
}

/// Setup [tracing][tracing] with a non-blocking stdout writer, filtered by
/// `RUST_LOG`.
fn setup_tracing(writer: tracing_appender::non_blocking::NonBlocking) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("whatsapp_connect_server=info,whatsapp_connect_app=info,tower_http=info")
    });

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_target(true),
        )
        .with(filter)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use testresult::TestResult;

    #[test_log::test(tokio::test)]
    async fn test_bind_failure_is_returned() -> TestResult {
        let taken = TcpListener::bind((Ipv4Addr::UNSPECIFIED, 0))?;
        let port = taken.local_addr()?.port();

        let app_server = tokio::spawn(async move {
            serve("Application", Router::new(), port).await?;
            Ok::<_, anyhow::Error>(())
        });

        let result = join_app_server(app_server).await;

        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("server failed to bind"));

        Ok(())
    }

    #[test_log::test(tokio::test)]
    async fn test_clean_server_exit_is_ok() -> TestResult {
        let app_server = tokio::spawn(async { Ok::<_, anyhow::Error>(()) });

        join_app_server(app_server).await?;

        Ok(())
    }
}
