use image::{RgbImage, imageops::FilterType};

use litterview_config::Imagery;
use litterview_domain::features::{self, FeatureMatrix, FeatureRow};
use litterview_storage::{images::ImageStore, table::InputTable};

use crate::{Error, LitterService, Result, StageReport};

/// Flattens one record folder into a matrix with one row per heading.
///
/// The folder must hold exactly one image per configured heading; anything else is
/// `Error::MalformedInput` and nothing is produced for the record.
pub fn flatten_record(
	store: &ImageStore,
	record_id: i64,
	score: f64,
	imagery: &Imagery,
) -> Result<FeatureMatrix> {
	let images = store.images(record_id)?;
	let expected = imagery.headings.len();

	if images.len() != expected {
		return Err(Error::MalformedInput {
			message: format!(
				"{} holds {} images, expected {expected}",
				store.record_dir(record_id).display(),
				images.len()
			),
		});
	}

	let mut rows = Vec::with_capacity(expected);

	for stored in &images {
		let rgb = image::open(&stored.path)?.to_rgb8();
		let rgb = fit(rgb, imagery.width, imagery.height);

		rows.push(FeatureRow::from_rgb(rgb.as_raw(), score));
	}

	Ok(FeatureMatrix::new(rows, expected, features::row_len(imagery.width, imagery.height))?)
}

fn fit(rgb: RgbImage, width: u32, height: u32) -> RgbImage {
	if rgb.dimensions() == (width, height) {
		return rgb;
	}

	image::imageops::resize(&rgb, width, height, FilterType::Triangle)
}

impl LitterService {
	/// Flattens every record folder under the image root and appends the rows to the pixel file.
	pub fn flatten_images(&self, input: &InputTable) -> Result<StageReport> {
		let record_ids = self.store.record_ids()?;

		self.flatten_records(input, &record_ids)
	}

	/// Flattens the given record folders and appends their rows to the pixel file.
	///
	/// Folders without a matching input row are skipped; folders that fail validation or decoding
	/// are counted as failed. Only a failure to write the pixel file stops the stage.
	pub fn flatten_records(&self, input: &InputTable, record_ids: &[i64]) -> Result<StageReport> {
		let mut report = StageReport::new("flatten");

		for &record_id in record_ids {
			let Some(row) = input.find(record_id) else {
				tracing::warn!(record_id, "Skipping folder with no matching input row.");

				report.skipped += 1;

				continue;
			};

			match flatten_record(&self.store, record_id, row.record.score, &self.cfg.imagery) {
				Ok(matrix) => {
					let written = self.pixels.append(&matrix)?;

					tracing::debug!(record_id, rows = written, "Appended pixel rows.");

					report.processed += 1;
				},
				Err(err) => {
					tracing::warn!(record_id, error = %err, "Failed to flatten record.");

					report.failed += 1;
				},
			}
		}

		report.log();

		Ok(report)
	}
}
