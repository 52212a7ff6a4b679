use std::sync::Arc;

use projector_api::app::build_app;
use projector_api::directory::InMemoryDirectory;
use projector_auth::JwtSigner;

const DEFAULT_TOKEN_MAX_AGE_SECS: u64 = 3600;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    projector_observability::init();

    let token_max_age_secs = std::env::var("JWT_TOKEN_MAX_AGE")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_TOKEN_MAX_AGE_SECS);

    let signer = Arc::new(JwtSigner::generate()?);
    let directory = Arc::new(InMemoryDirectory::seeded());

    let app = build_app(signer, directory.clone(), directory, token_max_age_secs);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
