use litterview_domain::{AddressRecord, GeoPoint, GeocodedRecord, address};
use litterview_providers::geocoding::GeocodeOutcome;
use litterview_storage::table::{self, InputRow};

use crate::{Error, LitterService, Result, SelectStage, StageReport};

#[derive(Debug, Clone)]
pub struct GeocodeStage {
	pub geocoded: Vec<GeocodedRecord>,
	pub report: StageReport,
}

impl LitterService {
	/// Geocodes one record. No candidates yields `Error::NotFound`.
	pub async fn geocode_record(&self, record: &AddressRecord) -> Result<GeocodedRecord> {
		let query =
			address::geocoding_query(&record.raw_address, &self.cfg.selection.address_suffix);

		match self.providers.geocoding.geocode(&query).await? {
			GeocodeOutcome::Found(point) => Ok(GeocodedRecord { record_id: record.id, point }),
			GeocodeOutcome::NotFound =>
				Err(Error::NotFound { message: format!("no geocode for {query:?}") }),
		}
	}

	/// Geocodes the selected records one at a time and rewrites the coordinates table.
	///
	/// A record that cannot be geocoded is skipped (not found) or counted as failed (provider
	/// error); neither stops the stage.
	pub async fn geocode_records(&self, select: &SelectStage) -> Result<GeocodeStage> {
		let mut report = StageReport::new("geocode");
		let mut geocoded = Vec::with_capacity(select.positions.len());
		let mut located: Vec<(&InputRow, GeoPoint)> = Vec::with_capacity(select.positions.len());

		for row in select.selected_rows() {
			let record = &row.record;

			match self.geocode_record(record).await {
				Ok(found) => {
					located.push((row, found.point));
					geocoded.push(found);

					report.processed += 1;
				},
				Err(err @ Error::NotFound { .. }) => {
					tracing::warn!(record_id = record.id, reason = %err, "Skipping record.");

					report.skipped += 1;
				},
				Err(err) => {
					tracing::warn!(record_id = record.id, reason = %err, "Geocoding failed.");

					report.failed += 1;
				},
			}
		}

		table::write_coordinates(&self.cfg.paths.coordinates, &select.input.headers, &located)?;

		report.log();

		Ok(GeocodeStage { geocoded, report })
	}
}
