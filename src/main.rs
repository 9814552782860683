use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::AppState;
use clinic_core::ClinicConfig;
use clinic_core::config::{seed_file_from_env_value, utc_offset_from_env_value};
use clinic_core::constants::DEFAULT_REST_ADDR;

/// Main entry point for the clinic booking service
///
/// Serves the REST API, Swagger UI and OpenAPI document on one listener.
///
/// # Environment Variables
/// - `CLINIC_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `CLINIC_SEED_FILE`: YAML file with patients, staff and services (optional)
/// - `CLINIC_UTC_OFFSET`: clinic UTC offset as `Z`, `UTC` or `±HH:MM` (default: UTC)
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("clinic_run=info".parse()?)
                .add_directive("api_rest=info".parse()?)
                .add_directive("clinic_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr =
        std::env::var("CLINIC_REST_ADDR").unwrap_or_else(|_| DEFAULT_REST_ADDR.into());
    let cfg = ClinicConfig::new(
        utc_offset_from_env_value(std::env::var("CLINIC_UTC_OFFSET").ok())?,
        seed_file_from_env_value(std::env::var("CLINIC_SEED_FILE").ok())?,
    );
    tracing::info!("clinic UTC offset is {}", cfg.utc_offset());

    let state = AppState::new(&cfg)?;
    let app = api_rest::router(state);

    tracing::info!("++ Starting clinic REST on {}", rest_addr);
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
