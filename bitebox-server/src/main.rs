//! bitebox-server binary

use bitebox_server::{AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bitebox_server=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;
    tracing::info!(
        environment = %config.environment,
        currency = %config.currency,
        delivery_fee = %config.pricing.delivery_fee,
        tax_rate_bps = config.pricing.tax_rate_bps,
        "Starting bitebox-server"
    );

    let state = AppState::new(&config)
        .await
        .map_err(|e| anyhow::anyhow!(e))?;

    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("bitebox-server listening on {addr}");

    bitebox_server::serve(listener, state, async {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("Shutdown signal received");
    })
    .await
    .map_err(|e| anyhow::anyhow!(e))?;

    Ok(())
}
