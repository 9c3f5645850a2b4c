use crate::CHANNELS;

/// Flattened pixels of one image followed by the record's score.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
	values: Vec<f64>,
}
impl FeatureRow {
	/// Builds a row from interleaved RGB bytes in row-major order.
	pub fn from_rgb(pixels: &[u8], score: f64) -> Self {
		let mut values = Vec::with_capacity(pixels.len() + 1);

		values.extend(pixels.iter().map(|value| f64::from(*value)));
		values.push(score);

		Self { values }
	}

	pub fn values(&self) -> &[f64] {
		&self.values
	}

	pub fn len(&self) -> usize {
		self.values.len()
	}

	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}

	pub fn score(&self) -> Option<f64> {
		self.values.last().copied()
	}
}

pub fn row_len(width: u32, height: u32) -> usize {
	width as usize * height as usize * CHANNELS + 1
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
	RowCount { expected: usize, actual: usize },
	RowLength { row: usize, expected: usize, actual: usize },
}
impl std::fmt::Display for ShapeError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::RowCount { expected, actual } => {
				write!(f, "expected {expected} rows, found {actual}")
			},
			Self::RowLength { row, expected, actual } => {
				write!(f, "row {row} has {actual} values, expected {expected}")
			},
		}
	}
}

impl std::error::Error for ShapeError {}

/// Rows for one record: exactly one per heading, each of identical length.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
	rows: Vec<FeatureRow>,
}
impl FeatureMatrix {
	pub fn new(
		rows: Vec<FeatureRow>,
		row_count: usize,
		row_len: usize,
	) -> Result<Self, ShapeError> {
		if rows.len() != row_count {
			return Err(ShapeError::RowCount { expected: row_count, actual: rows.len() });
		}

		for (row, values) in rows.iter().enumerate() {
			if values.len() != row_len {
				return Err(ShapeError::RowLength { row, expected: row_len, actual: values.len() });
			}
		}

		Ok(Self { rows })
	}

	pub fn rows(&self) -> &[FeatureRow] {
		&self.rows
	}
}
