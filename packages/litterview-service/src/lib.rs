pub mod dispatch;
pub mod error;
pub mod fetch;
pub mod flatten;
pub mod geocode;
pub mod pipeline;
pub mod select;

pub use error::{Error, Result};
pub use fetch::{FetchJob, FetchOutcome};
pub use geocode::GeocodeStage;
pub use pipeline::PipelineReport;
pub use select::SelectStage;

use std::{fmt, future::Future, pin::Pin, sync::Arc};

use reqwest::Client;

use litterview_config::{Config, ProviderConfig};
use litterview_providers::{
	geocoding::{self, GeocodeOutcome},
	imagery::{self, FetchedImage, ImageRequest},
};
use litterview_storage::{images::ImageStore, pixels::PixelFile};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait GeocodingProvider
where
	Self: Send + Sync,
{
	fn geocode<'a>(
		&'a self,
		address: &'a str,
	) -> BoxFuture<'a, litterview_providers::Result<GeocodeOutcome>>;
}

pub trait ImageryProvider
where
	Self: Send + Sync,
{
	fn fetch_image<'a>(
		&'a self,
		request: &'a ImageRequest,
	) -> BoxFuture<'a, litterview_providers::Result<FetchedImage>>;
}

#[derive(Clone)]
pub struct Providers {
	pub geocoding: Arc<dyn GeocodingProvider>,
	pub imagery: Arc<dyn ImageryProvider>,
}
impl Providers {
	/// HTTP-backed providers sharing the configured API key.
	pub fn from_config(cfg: &Config) -> Result<Self> {
		let geocoding = HttpProvider::new(&cfg.providers.geocoding, &cfg.providers.api_key)?;
		let imagery = HttpProvider::new(&cfg.providers.imagery, &cfg.providers.api_key)?;

		Ok(Self { geocoding: Arc::new(geocoding), imagery: Arc::new(imagery) })
	}
}

struct HttpProvider {
	client: Client,
	cfg: ProviderConfig,
	api_key: String,
}
impl HttpProvider {
	fn new(cfg: &ProviderConfig, api_key: &str) -> Result<Self> {
		Ok(Self {
			client: litterview_providers::client(cfg)?,
			cfg: cfg.clone(),
			api_key: api_key.to_string(),
		})
	}
}

impl GeocodingProvider for HttpProvider {
	fn geocode<'a>(
		&'a self,
		address: &'a str,
	) -> BoxFuture<'a, litterview_providers::Result<GeocodeOutcome>> {
		Box::pin(geocoding::geocode(&self.client, &self.cfg, &self.api_key, address))
	}
}

impl ImageryProvider for HttpProvider {
	fn fetch_image<'a>(
		&'a self,
		request: &'a ImageRequest,
	) -> BoxFuture<'a, litterview_providers::Result<FetchedImage>> {
		Box::pin(imagery::fetch_image(&self.client, &self.cfg, &self.api_key, request))
	}
}

/// Per-stage record counts, logged and printed when a stage ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageReport {
	pub stage: &'static str,
	pub processed: usize,
	pub skipped: usize,
	pub failed: usize,
}
impl StageReport {
	pub fn new(stage: &'static str) -> Self {
		Self { stage, processed: 0, skipped: 0, failed: 0 }
	}

	pub fn log(&self) {
		tracing::info!(
			stage = self.stage,
			processed = self.processed,
			skipped = self.skipped,
			failed = self.failed,
			"Stage finished."
		);
	}
}
impl fmt::Display for StageReport {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{}: {} processed, {} skipped, {} failed",
			self.stage, self.processed, self.skipped, self.failed
		)
	}
}

/// Everything one pipeline run needs. Built once per run from the loaded configuration.
pub struct LitterService {
	pub cfg: Config,
	pub store: ImageStore,
	pub pixels: PixelFile,
	pub providers: Providers,
}
impl LitterService {
	pub fn new(cfg: Config, providers: Providers) -> Self {
		let store = ImageStore::new(&cfg.paths.image_root);
		let pixels = PixelFile::new(&cfg.paths.pixels);

		Self { cfg, store, pixels, providers }
	}

	pub fn from_config(cfg: Config) -> Result<Self> {
		let providers = Providers::from_config(&cfg)?;

		Ok(Self::new(cfg, providers))
	}
}
