pub mod communication;
pub mod configuration;
pub mod core;
pub mod database;
pub mod delivery;
pub mod inventory;
pub mod orders;
pub mod pricing;
pub mod quotation;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Config Error:{0}")]
    ConfigError(String),

    #[error("Service error")]
    ServiceError,
}
