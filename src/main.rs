//! Web server: renders the listing pages from the configured storage backend.

use hbnb::transport;
use hbnb::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    hbnb::init_tracing();

    let config = Config::from_env()?;
    tracing::info!(?config.storage, "initializing storage engine");
    let storage = hbnb::open_storage(&config).await?;

    let app = transport::http::create_app(transport::http::AppState::new(storage));
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("listening on http://{}", config.bind_addr);

    axum::serve(
        listener,
        axum::ServiceExt::<axum::extract::Request>::into_make_service(app),
    )
    .with_graceful_shutdown(async {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("shutdown signal received");
    })
    .await?;

    Ok(())
}
