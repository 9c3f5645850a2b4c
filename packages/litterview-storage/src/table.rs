use std::{fs, path::Path};

use csv::StringRecord;
use serde::Deserialize;

use litterview_domain::{AddressRecord, GeoPoint, GeocodedRecord, ScoreColor};

use crate::{Error, Result};

pub const ADDRESS_COLUMN: &str = "LR_HUNDRED_BLOCK";
pub const STREET_CLASS_COLUMN: &str = "STREET_CLASS_NAME";
pub const SCORE_COLOR_COLUMN: &str = "SCORE_COLOR";
pub const ID_COLUMN: &str = "OBJECTID";
pub const SCORE_COLUMN: &str = "HUNDRED_BLOCK_SCORE";
pub const LAT_COLUMN: &str = "lat";
pub const LNG_COLUMN: &str = "lng";

const REQUIRED_COLUMNS: [&str; 5] =
	[ADDRESS_COLUMN, STREET_CLASS_COLUMN, SCORE_COLOR_COLUMN, ID_COLUMN, SCORE_COLUMN];

#[derive(Debug, Deserialize)]
struct RawAddressRow {
	#[serde(rename = "OBJECTID")]
	id: i64,
	#[serde(rename = "LR_HUNDRED_BLOCK", default)]
	raw_address: String,
	#[serde(rename = "STREET_CLASS_NAME", default)]
	street_class: String,
	#[serde(rename = "SCORE_COLOR", default)]
	score_color: String,
	#[serde(rename = "HUNDRED_BLOCK_SCORE")]
	score: f64,
}

#[derive(Debug, Deserialize)]
struct CoordinateRow {
	#[serde(rename = "OBJECTID")]
	id: i64,
	lat: f64,
	lng: f64,
}

/// A typed record plus the untouched source row, so outputs can carry every input column.
#[derive(Debug, Clone)]
pub struct InputRow {
	pub record: AddressRecord,
	pub raw: StringRecord,
}

#[derive(Debug, Clone)]
pub struct InputTable {
	pub headers: StringRecord,
	pub rows: Vec<InputRow>,
	/// Rows whose id or score could not be read.
	pub rejected: usize,
}
impl InputTable {
	pub fn records(&self) -> Vec<AddressRecord> {
		self.rows.iter().map(|row| row.record.clone()).collect()
	}

	/// First row carrying `id`.
	pub fn find(&self, id: i64) -> Option<&InputRow> {
		self.rows.iter().find(|row| row.record.id == id)
	}
}

pub fn read_input(path: &Path) -> Result<InputTable> {
	let mut reader = csv::Reader::from_path(path).map_err(Error::csv(path))?;
	let headers = reader.headers().map_err(Error::csv(path))?.clone();

	for column in REQUIRED_COLUMNS {
		if !headers.iter().any(|header| header == column) {
			return Err(Error::MissingColumn {
				path: path.to_path_buf(),
				column: column.to_string(),
			});
		}
	}

	let mut rows = Vec::new();
	let mut rejected = 0;

	for (line, result) in reader.records().enumerate() {
		let raw = result.map_err(Error::csv(path))?;

		match raw.deserialize::<RawAddressRow>(Some(&headers)) {
			Ok(row) => rows.push(InputRow {
				record: AddressRecord {
					id: row.id,
					raw_address: row.raw_address,
					street_class: row.street_class,
					score_color: ScoreColor::from(row.score_color.as_str()),
					score: row.score,
				},
				raw,
			}),
			Err(err) => {
				tracing::warn!(row = line + 1, error = %err, "Rejected malformed input row.");

				rejected += 1;
			},
		}
	}

	tracing::debug!(path = %path.display(), rows = rows.len(), rejected, "Read input table.");

	Ok(InputTable { headers, rows, rejected })
}

/// Rewrites the coordinates table: input columns followed by `lat` and `lng`.
pub fn write_coordinates(
	path: &Path,
	headers: &StringRecord,
	rows: &[(&InputRow, GeoPoint)],
) -> Result<()> {
	if let Some(parent) = path.parent()
		&& !parent.as_os_str().is_empty()
	{
		fs::create_dir_all(parent).map_err(Error::io(parent))?;
	}

	let mut writer = csv::Writer::from_path(path).map_err(Error::csv(path))?;
	let mut header_row = headers.clone();

	header_row.push_field(LAT_COLUMN);
	header_row.push_field(LNG_COLUMN);

	writer.write_record(&header_row).map_err(Error::csv(path))?;

	for (row, point) in rows {
		let mut record = row.raw.clone();

		record.push_field(&point.lat.to_string());
		record.push_field(&point.lng.to_string());

		writer.write_record(&record).map_err(Error::csv(path))?;
	}

	writer.flush().map_err(Error::io(path))?;

	Ok(())
}

pub fn read_coordinates(path: &Path) -> Result<Vec<GeocodedRecord>> {
	let mut reader = csv::Reader::from_path(path).map_err(Error::csv(path))?;
	let mut records = Vec::new();

	for result in reader.deserialize::<CoordinateRow>() {
		let row = result.map_err(Error::csv(path))?;

		records.push(GeocodedRecord {
			record_id: row.id,
			point: GeoPoint { lat: row.lat, lng: row.lng },
		});
	}

	Ok(records)
}
