use std::sync::Arc;

use anyhow::Result;
use mdlight::{
    catalog::Catalog,
    config::AppConfig,
    resolver::Resolver,
    server::{AppState, router},
};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("mdlight=info,axum=info")),
        )
        .init();

    let config = AppConfig::from_env()?;
    let root = config.content_root()?;
    let factory = config.node_factory();
    for converter in [&factory.markdown, &factory.graph] {
        let location = converter.locate()?;
        info!("using {} at {}", converter.program(), location.display());
    }

    info!("serving {} ({} strategy)", root.display(), config.strategy);
    let resolver = Resolver::new(root, factory);
    let strategy = config.strategy;
    let catalog = tokio::task::spawn_blocking(move || Catalog::build(resolver, strategy)).await??;

    let state = AppState {
        catalog: Arc::new(catalog),
        max_path_length: config.max_path_length,
    };
    let app = router(state);
    let bind_addr = config.http_bind_addr();
    let listener = TcpListener::bind(&bind_addr).await?;
    info!("listening on http://{bind_addr}");
    axum::serve(listener, app).await?;

    Ok(())
}
