use std::env;
use std::sync::Arc;

use anyhow::{Context, Result};
use larder_core::{load_path, LoadOptions, MemoryCatalog};
use larder_server::config::{Backend, Config};
use larder_server::pg_catalog::PgCatalog;
use larder_server::{api, app, db, telemetry, AppState};

fn build_catalog(config: &Config) -> Result<AppState> {
    match config.backend {
        Backend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set for the postgres backend")?;
            let pool = db::create_pool(database_url)?;
            Ok(Arc::new(PgCatalog::new(pool)))
        }
        Backend::Memory => {
            let catalog = MemoryCatalog::new();
            if let Some(seed) = &config.seed_file {
                let report = load_path(&catalog, seed, LoadOptions::default())
                    .with_context(|| format!("Failed to load seed file {}", seed.display()))?;
                tracing::info!(
                    path = %seed.display(),
                    recipes = report.recipes_inserted,
                    "seeded memory catalog"
                );
            } else {
                tracing::warn!("memory backend started without LARDER_SEED_FILE, catalog is empty");
            }
            Ok(Arc::new(catalog))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Check for --openapi flag to dump spec and exit
    if env::args().any(|arg| arg == "--openapi") {
        let spec = api::openapi()
            .to_pretty_json()
            .context("Failed to render OpenAPI document")?;
        println!("{}", spec);
        return Ok(());
    }

    telemetry::init_telemetry();

    let config = Config::from_env()?;
    let catalog = build_catalog(&config)?;
    tracing::info!(backend = catalog.backend_name(), "catalog ready");

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;

    let local_addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", local_addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", local_addr);
    tracing::info!(
        "OpenAPI spec available at http://{}/api-docs/openapi.json",
        local_addr
    );

    axum::serve(listener, app(catalog)).await?;
    Ok(())
}
