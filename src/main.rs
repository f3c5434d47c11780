use dotenvy::dotenv;
use std::str::FromStr;
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use woodex::configuration::Context;
use woodex::core::{HttpService, ServiceManager};
use woodex::AppError;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenv().ok();
    let context =
        Context::new("config.json").map_err(|e| AppError::ConfigError(e.to_string()))?;

    let log_level = Level::from_str(&context.config.log_level).unwrap_or(Level::INFO);
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::new(log_level.to_string()))
        .init();
    tracing::info!("Starting Woodex backend");

    let mut service_manager = ServiceManager::new(context);
    service_manager.spawn::<HttpService>();

    service_manager
        .wait()
        .await
        .map_err(|_| AppError::ServiceError)
}
