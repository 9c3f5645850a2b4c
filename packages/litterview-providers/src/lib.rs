pub mod error;
pub mod geocoding;
pub mod imagery;

pub use error::{Error, Result};

use std::time::Duration;

use reqwest::Client;

pub fn client(cfg: &litterview_config::ProviderConfig) -> Result<Client> {
	Ok(Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?)
}

pub fn endpoint(cfg: &litterview_config::ProviderConfig) -> String {
	format!("{}{}", cfg.api_base.trim_end_matches('/'), cfg.path)
}
