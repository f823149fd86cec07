//! Configuration loading for the Medica client.

mod error;
mod model;

pub use error::ConfigError;
pub use model::{
    BackendConfig, DEFAULT_CONFIG_FILE, MedicaConfig, MedicaConfigBuilder, SessionConfig,
};
