//! Configuration model loaded from external sources.

use serde::Deserialize;

use crate::components::list_controller::DEFAULT_PAGE_SIZE;
use crate::repository::ApiConfig;

fn default_api_timeout_ms() -> u64 {
    30000
}

fn default_search_debounce_ms() -> u64 {
    500
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

#[derive(Clone, Debug, Deserialize)]
/// Basic configuration shared across handlers.
pub struct ServerConfig {
    pub domain: String,
    pub address: String,
    pub port: u16,
    pub templates_dir: String,
    pub secret: String,
    /// Catalog backend including the API prefix.
    pub api_base_url: String,
    #[serde(default)]
    pub api_token: Option<String>,
    #[serde(default = "default_api_timeout_ms")]
    pub api_timeout_ms: u64,
    /// Delay applied to search boxes before the list is reloaded.
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,
}

impl ServerConfig {
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig::new(&self.api_base_url)
            .with_token(self.api_token.clone())
            .with_timeout(self.api_timeout_ms)
    }
}
