pub mod loader;
pub mod types;

pub use loader::{load_catalog, load_config, ConfigError};
pub use types::TapConfig;
