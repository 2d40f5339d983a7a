// src/bin/api_server.rs

use acadi_certificates::infra::logging::init_logging;
use acadi_certificates::transport;
use acadi_certificates::{AuthService, CertificateService, Config};
use anyhow::Context;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_logging(config.log_format, "info");

    // --- Service Initialization ---
    if config.token_secret.is_none() {
        tracing::warn!("CERT_TOKEN_SECRET not set; tokens will not survive a restart");
    }
    let certificates = CertificateService::new(config.default_issuer.clone());
    let auth = AuthService::new(config.token_codec());
    let app_state = transport::http::AppState::new(certificates, auth, config.enforce_roles);
    if config.enforce_roles {
        tracing::info!("role enforcement enabled on issue and admin-verify");
    } else {
        tracing::warn!("role enforcement disabled: any caller may issue or verify certificates");
    }

    // --- API Server Initialization ---
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let app = transport::http::create_router(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", transport::http::ApiDoc::openapi()))
        .layer(cors);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    tracing::info!(%addr, "API server listening");
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("shutdown signal received; in-memory certificates are discarded");
            }
        })
        .await?;

    Ok(())
}
