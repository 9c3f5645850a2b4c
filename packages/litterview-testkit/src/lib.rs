mod error;

pub use error::{Error, Result};

use std::{
	env, fs,
	io::Cursor,
	path::{Path, PathBuf},
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use image::{ImageFormat, Rgb, RgbImage};

use litterview_config::{
	Config, Dispatch, Imagery, Paths, ProviderConfig, Providers, Selection, Service,
};

pub const INPUT_HEADERS: [&str; 5] =
	["OBJECTID", "LR_HUNDRED_BLOCK", "STREET_CLASS_NAME", "SCORE_COLOR", "HUNDRED_BLOCK_SCORE"];

/// Scratch directory under the system temp dir, removed on cleanup or drop.
pub struct TestDir {
	path: PathBuf,
	cleaned: bool,
}
impl TestDir {
	pub fn new(prefix: &str) -> Result<Self> {
		static COUNTER: AtomicU64 = AtomicU64::new(0);

		let nanos = SystemTime::now()
			.duration_since(UNIX_EPOCH)
			.map_err(|err| Error::Message(format!("System time is before the epoch: {err}.")))?
			.as_nanos();
		let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
		let path = env::temp_dir()
			.join(format!("litterview_{prefix}_{nanos}_{}_{ordinal}", std::process::id()));

		fs::create_dir_all(&path)?;

		Ok(Self { path, cleaned: false })
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	pub fn join(&self, relative: impl AsRef<Path>) -> PathBuf {
		self.path.join(relative)
	}

	pub fn cleanup(mut self) -> Result<()> {
		self.cleanup_inner()
	}

	fn cleanup_inner(&mut self) -> Result<()> {
		if self.cleaned {
			return Ok(());
		}

		self.cleaned = true;

		if self.path.exists() {
			fs::remove_dir_all(&self.path)?;
		}

		Ok(())
	}
}
impl Drop for TestDir {
	fn drop(&mut self) {
		let _ = self.cleanup_inner();
	}
}

/// One fixture row in input column order.
#[derive(Debug, Clone)]
pub struct FixtureRow {
	pub id: &'static str,
	pub address: &'static str,
	pub street_class: &'static str,
	pub score_color: &'static str,
	pub score: &'static str,
}

pub fn write_input_table(path: &Path, rows: &[FixtureRow]) -> Result<()> {
	let mut writer = csv::Writer::from_path(path)?;

	writer.write_record(INPUT_HEADERS)?;

	for row in rows {
		writer.write_record([row.id, row.address, row.street_class, row.score_color, row.score])?;
	}

	writer.flush()?;

	Ok(())
}

pub fn solid_rgb(width: u32, height: u32, rgb: [u8; 3]) -> RgbImage {
	RgbImage::from_pixel(width, height, Rgb(rgb))
}

pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>> {
	let mut bytes = Cursor::new(Vec::new());

	image.write_to(&mut bytes, ImageFormat::Png)?;

	Ok(bytes.into_inner())
}

pub fn write_png(path: &Path, image: &RgbImage) -> Result<()> {
	if let Some(parent) = path.parent() {
		fs::create_dir_all(parent)?;
	}

	fs::write(path, encode_png(image)?)?;

	Ok(())
}

/// A valid configuration rooted in `dir`, with providers pointing at an unroutable host.
pub fn sample_config(dir: &Path, headings: Vec<u16>, width: u32, height: u32) -> Config {
	let provider = |path: &str| ProviderConfig {
		api_base: "http://127.0.0.1:9".to_string(),
		path: path.to_string(),
		timeout_ms: 1_000,
	};

	Config {
		service: Service { log_level: "debug".to_string() },
		paths: Paths {
			input: dir.join("input.csv"),
			coordinates: dir.join("coordinates.csv"),
			image_root: dir.join("image_downloads"),
			pixels: dir.join("pixels.csv"),
		},
		selection: Selection {
			street_classes: vec!["Local".to_string()],
			score_colors: vec!["MAROON".to_string(), "RED".to_string()],
			max_records: 50,
			address_suffix: ", Philadelphia, PA".to_string(),
		},
		imagery: Imagery { headings, pitch: 0.0, width, height },
		dispatch: Dispatch { workers: 2 },
		providers: Providers {
			api_key: "test-key".to_string(),
			geocoding: provider("/maps/api/geocode/json"),
			imagery: provider("/maps/api/streetview"),
		},
	}
}
