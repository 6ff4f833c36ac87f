mod client_config;

pub use client_config::{CachedAuth, ClientConfig, ClientConfigManager, get_config_manager};
