pub mod address;
pub mod features;
pub mod selection;

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// RGB only; alpha is dropped when images are decoded.
pub const CHANNELS: usize = 3;

/// One row of the litter index table. Immutable once read.
#[derive(Debug, Clone, PartialEq)]
pub struct AddressRecord {
	pub id: i64,
	pub raw_address: String,
	pub street_class: String,
	pub score_color: ScoreColor,
	pub score: f64,
}

/// Litter score band. Unknown bands are kept uppercased so the allow-set can still name them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScoreColor {
	Green,
	Yellow,
	Orange,
	Red,
	Maroon,
	Other(String),
}
impl ScoreColor {
	pub fn as_str(&self) -> &str {
		match self {
			Self::Green => "GREEN",
			Self::Yellow => "YELLOW",
			Self::Orange => "ORANGE",
			Self::Red => "RED",
			Self::Maroon => "MAROON",
			Self::Other(raw) => raw.as_str(),
		}
	}
}
impl FromStr for ScoreColor {
	type Err = std::convert::Infallible;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let upper = s.trim().to_ascii_uppercase();
		let color = match upper.as_str() {
			"GREEN" => Self::Green,
			"YELLOW" => Self::Yellow,
			"ORANGE" => Self::Orange,
			"RED" => Self::Red,
			"MAROON" => Self::Maroon,
			_ => Self::Other(upper),
		};

		Ok(color)
	}
}
impl fmt::Display for ScoreColor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
impl From<&str> for ScoreColor {
	fn from(value: &str) -> Self {
		match value.parse() {
			Ok(color) => color,
			Err(never) => match never {},
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
	pub lat: f64,
	pub lng: f64,
}
impl fmt::Display for GeoPoint {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{},{}", self.lat, self.lng)
	}
}

/// A geocoded record. The id is the join key to the image folder, so it travels with the point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeocodedRecord {
	pub record_id: i64,
	pub point: GeoPoint,
}

/// One downloaded image, tagged with where and in which direction it was taken.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadingImage {
	pub heading: u16,
	pub point: GeoPoint,
	pub file_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageSet {
	pub record_id: i64,
	pub images: Vec<HeadingImage>,
}
