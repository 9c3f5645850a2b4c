use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub paths: Paths,
	pub selection: Selection,
	pub imagery: Imagery,
	#[serde(default)]
	pub dispatch: Dispatch,
	pub providers: Providers,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Paths {
	/// Raw litter index table.
	pub input: PathBuf,
	/// Input columns plus `lat` and `lng`, rewritten by every geocoding run.
	pub coordinates: PathBuf,
	/// One folder per record id, holding one image per heading and a `links.txt` manifest.
	pub image_root: PathBuf,
	/// Append-only flattened pixel rows.
	pub pixels: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Selection {
	pub street_classes: Vec<String>,
	pub score_colors: Vec<String>,
	pub max_records: usize,
	/// Appended to every address before it is geocoded, e.g. ", Philadelphia, PA".
	#[serde(default = "default_address_suffix")]
	pub address_suffix: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Imagery {
	/// Compass bearings in degrees. One image is fetched and flattened per heading.
	pub headings: Vec<u16>,
	#[serde(default)]
	pub pitch: f32,
	pub width: u32,
	pub height: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Dispatch {
	/// Worker count for imagery downloads. Zero means twice the available parallelism.
	#[serde(default)]
	pub workers: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Providers {
	pub api_key: String,
	pub geocoding: ProviderConfig,
	pub imagery: ProviderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
	pub api_base: String,
	pub path: String,
	pub timeout_ms: u64,
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_address_suffix() -> String {
	", Philadelphia, PA".to_string()
}
