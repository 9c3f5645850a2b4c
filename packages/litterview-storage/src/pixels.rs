use std::{
	fs::{self, OpenOptions},
	path::{Path, PathBuf},
};

use litterview_domain::features::FeatureMatrix;

use crate::{Error, Result};

/// Append-only writer for flattened pixel rows. No header; one row per line.
#[derive(Debug, Clone)]
pub struct PixelFile {
	path: PathBuf,
}
impl PixelFile {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Appends every row of one record's matrix and returns the number of rows written.
	pub fn append(&self, matrix: &FeatureMatrix) -> Result<usize> {
		if let Some(parent) = self.path.parent()
			&& !parent.as_os_str().is_empty()
		{
			fs::create_dir_all(parent).map_err(Error::io(parent))?;
		}

		let file = OpenOptions::new()
			.create(true)
			.append(true)
			.open(&self.path)
			.map_err(Error::io(&self.path))?;
		let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);

		for row in matrix.rows() {
			writer
				.write_record(row.values().iter().map(|value| value.to_string()))
				.map_err(Error::csv(&self.path))?;
		}

		writer.flush().map_err(Error::io(&self.path))?;

		Ok(matrix.rows().len())
	}
}
