use reqwest::{Client, header::CONTENT_TYPE};

use litterview_domain::GeoPoint;

use crate::Result;

/// One directional street-level image request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageRequest {
	pub point: GeoPoint,
	pub heading: u16,
	pub pitch: f32,
	pub width: u32,
	pub height: u32,
}
impl ImageRequest {
	/// Query parameters without the API key.
	pub fn params(&self) -> Vec<(&'static str, String)> {
		vec![
			("size", format!("{}x{}", self.width, self.height)),
			("location", self.point.to_string()),
			("heading", self.heading.to_string()),
			("pitch", self.pitch.to_string()),
		]
	}
}

#[derive(Debug, Clone)]
pub struct FetchedImage {
	pub bytes: Vec<u8>,
	pub extension: &'static str,
	/// Source link with the API key stripped, suitable for the folder manifest.
	pub link: String,
}

pub async fn fetch_image(
	client: &Client,
	cfg: &litterview_config::ProviderConfig,
	api_key: &str,
	request: &ImageRequest,
) -> Result<FetchedImage> {
	let params = request.params();
	let res = client
		.get(crate::endpoint(cfg))
		.query(&params)
		.query(&[("key", api_key)])
		.send()
		.await?
		.error_for_status()?;
	let extension = res
		.headers()
		.get(CONTENT_TYPE)
		.and_then(|value| value.to_str().ok())
		.map(extension_for_content_type)
		.unwrap_or("jpg");
	let bytes = res.bytes().await?.to_vec();

	tracing::debug!(heading = request.heading, size = bytes.len(), "Fetched street-level image.");

	Ok(FetchedImage { bytes, extension, link: manifest_link(cfg, request) })
}

pub fn manifest_link(cfg: &litterview_config::ProviderConfig, request: &ImageRequest) -> String {
	let query = request
		.params()
		.into_iter()
		.map(|(key, value)| format!("{key}={value}"))
		.collect::<Vec<_>>()
		.join("&");

	format!("{}?{query}", crate::endpoint(cfg))
}

pub fn extension_for_content_type(content_type: &str) -> &'static str {
	let mime = content_type.split(';').next().unwrap_or_default().trim();

	match mime.to_ascii_lowercase().as_str() {
		"image/png" => "png",
		_ => "jpg",
	}
}
