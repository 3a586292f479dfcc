use anyhow::Context;

use stockroom_infra::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stockroom_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let services = stockroom_api::app::services::build_services(&config)
        .await
        .context("failed to wire services")?;

    if config.seed_sample_data {
        stockroom_api::app::seed::seed_sample_data(&services.services)
            .await
            .context("failed to load sample data")?;
    }

    let app = stockroom_api::app::build_app(services);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
