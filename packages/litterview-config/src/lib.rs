mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, Dispatch, Imagery, Paths, ProviderConfig, Providers, Selection, Service};

use std::{collections::HashSet, fs, num::NonZeroUsize, path::Path, thread};

/// Street View static images are capped at 640 pixels per side.
pub const MAX_IMAGE_SIDE: u32 = 640;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.providers.api_key.trim().is_empty() {
		return Err(Error::Validation {
			message: "providers.api_key must be non-empty.".to_string(),
		});
	}

	for (label, provider) in
		[("geocoding", &cfg.providers.geocoding), ("imagery", &cfg.providers.imagery)]
	{
		if !provider.api_base.starts_with("http") {
			return Err(Error::Validation {
				message: format!("providers.{label}.api_base must be an http(s) URL."),
			});
		}
		if provider.timeout_ms == 0 {
			return Err(Error::Validation {
				message: format!("providers.{label}.timeout_ms must be greater than zero."),
			});
		}
	}

	if cfg.selection.street_classes.is_empty() {
		return Err(Error::Validation {
			message: "selection.street_classes must be non-empty.".to_string(),
		});
	}
	if cfg.selection.score_colors.is_empty() {
		return Err(Error::Validation {
			message: "selection.score_colors must be non-empty.".to_string(),
		});
	}
	if cfg.selection.max_records == 0 {
		return Err(Error::Validation {
			message: "selection.max_records must be greater than zero.".to_string(),
		});
	}
	if cfg.imagery.headings.is_empty() {
		return Err(Error::Validation {
			message: "imagery.headings must be non-empty.".to_string(),
		});
	}

	let mut seen = HashSet::new();

	for heading in &cfg.imagery.headings {
		if *heading >= 360 {
			return Err(Error::Validation {
				message: "imagery.headings must be in the range 0-359.".to_string(),
			});
		}
		if !seen.insert(*heading) {
			return Err(Error::Validation {
				message: format!("imagery.headings contains duplicate heading {heading}."),
			});
		}
	}

	if !cfg.imagery.pitch.is_finite() || !(-90.0..=90.0).contains(&cfg.imagery.pitch) {
		return Err(Error::Validation {
			message: "imagery.pitch must be in the range -90.0-90.0.".to_string(),
		});
	}

	for (label, side) in [("width", cfg.imagery.width), ("height", cfg.imagery.height)] {
		if side == 0 || side > MAX_IMAGE_SIDE {
			return Err(Error::Validation {
				message: format!("imagery.{label} must be in the range 1-{MAX_IMAGE_SIDE}."),
			});
		}
	}

	Ok(())
}

/// Resolves the configured worker count, falling back to twice the available parallelism.
pub fn worker_count(dispatch: &Dispatch) -> usize {
	if dispatch.workers > 0 {
		return dispatch.workers;
	}

	thread::available_parallelism().map(NonZeroUsize::get).unwrap_or(1) * 2
}

fn normalize(cfg: &mut Config) {
	for list in [&mut cfg.selection.street_classes, &mut cfg.selection.score_colors] {
		*list = list
			.iter()
			.map(|value| value.trim().to_string())
			.filter(|value| !value.is_empty())
			.collect();
	}

	cfg.imagery.headings.sort_unstable();

	if cfg.service.log_level.trim().is_empty() {
		cfg.service.log_level = "info".to_string();
	}
}
