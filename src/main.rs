use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{router, AppState};
use herb_core::{resolve_dataset_dir, CoreConfig, MerchantConfig};

/// Main entry point for the herbal storefront server.
///
/// Loads the CSV datasets once at startup, then serves the REST API with
/// Swagger UI at `/swagger-ui`.
///
/// # Environment Variables
/// - `HERBAL_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `HERBAL_DATASET_DIR`: Directory holding the CSV datasets (default:
///   searches for a `datasets/` directory)
/// - `HERBAL_ORDER_DATA_DIR`: Directory for order documents (default:
///   "order_data")
/// - `HERBAL_UPI_PAYEE`: UPI payee id for payment intents (default:
///   "herbalshop@oksbi")
/// - `HERBAL_MERCHANT_NAME`: Payee display name (default: "Herbal Shop")
/// - `HERBAL_CURRENCY`: ISO currency code on payment intents (default: "INR")
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If configuration or startup fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("herbal=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("HERBAL_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let dataset_override = std::env::var("HERBAL_DATASET_DIR").ok().map(PathBuf::from);
    let dataset_dir = resolve_dataset_dir(dataset_override)?;
    let order_data_dir = std::env::var("HERBAL_ORDER_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("order_data"));

    let merchant = MerchantConfig::new(
        std::env::var("HERBAL_UPI_PAYEE").unwrap_or_else(|_| "herbalshop@oksbi".into()),
        std::env::var("HERBAL_MERCHANT_NAME").unwrap_or_else(|_| "Herbal Shop".into()),
        std::env::var("HERBAL_CURRENCY").unwrap_or_else(|_| "INR".into()),
    )?;
    let cfg = Arc::new(CoreConfig::new(dataset_dir, order_data_dir, merchant)?);

    tracing::info!("++ Datasets loaded from {}", cfg.dataset_dir().display());
    tracing::info!("++ Starting herbal REST on {}", rest_addr);

    let state = AppState::initialise(cfg)?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
