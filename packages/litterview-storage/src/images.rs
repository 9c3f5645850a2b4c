//! Image folder layout: `<root>/<record id>/<heading>.<ext>` plus a `links.txt` manifest.

use std::{
	collections::HashSet,
	fs,
	path::{Path, PathBuf},
};

use crate::{Error, Result};

pub const LINKS_FILE: &str = "links.txt";

/// An image file found in a record folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
	pub heading: u16,
	pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ImageStore {
	root: PathBuf,
}
impl ImageStore {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self { root: root.into() }
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	pub fn record_dir(&self, record_id: i64) -> PathBuf {
		self.root.join(record_id.to_string())
	}

	pub fn ensure_record_dir(&self, record_id: i64) -> Result<PathBuf> {
		let dir = self.record_dir(record_id);

		fs::create_dir_all(&dir).map_err(Error::io(&dir))?;

		Ok(dir)
	}

	pub fn image_path(&self, record_id: i64, heading: u16, extension: &str) -> PathBuf {
		self.record_dir(record_id).join(format!("{heading}.{extension}"))
	}

	pub fn write_links(&self, record_id: i64, links: &[String]) -> Result<PathBuf> {
		let path = self.record_dir(record_id).join(LINKS_FILE);
		let mut body = links.join("\n");

		if !body.is_empty() {
			body.push('\n');
		}

		fs::write(&path, body).map_err(Error::io(&path))?;

		Ok(path)
	}

	/// Removes a record folder that holds no images, so the record is selected again next run.
	pub fn discard_if_empty(&self, record_id: i64) -> Result<bool> {
		let dir = self.record_dir(record_id);

		if !dir.is_dir() || !self.images(record_id)?.is_empty() {
			return Ok(false);
		}

		fs::remove_dir_all(&dir).map_err(Error::io(&dir))?;

		Ok(true)
	}

	/// Record folders under the root, in ascending id order. Non-numeric folder names are skipped.
	pub fn record_ids(&self) -> Result<Vec<i64>> {
		if !self.root.is_dir() {
			return Ok(Vec::new());
		}

		let mut ids = Vec::new();

		for entry in fs::read_dir(&self.root).map_err(Error::io(&self.root))? {
			let entry = entry.map_err(Error::io(&self.root))?;

			if !entry.path().is_dir() {
				continue;
			}

			match entry.file_name().to_str().and_then(|name| name.parse::<i64>().ok()) {
				Some(id) => ids.push(id),
				None => {
					tracing::debug!(path = %entry.path().display(), "Skipping non-record folder.");
				},
			}
		}

		ids.sort_unstable();

		Ok(ids)
	}

	/// Number of images held by every record folder, in ascending id order.
	pub fn image_counts(&self) -> Result<Vec<(i64, usize)>> {
		let mut counts = Vec::new();

		for id in self.record_ids()? {
			counts.push((id, self.images(id)?.len()));
		}

		Ok(counts)
	}

	/// Ids whose folder holds at least `expected` images.
	pub fn complete_ids(&self, expected: usize) -> Result<HashSet<i64>> {
		Ok(self
			.image_counts()?
			.into_iter()
			.filter(|(_, held)| *held >= expected)
			.map(|(id, _)| id)
			.collect())
	}

	/// Folders holding some images but fewer than `expected`, with their image count.
	pub fn partial_folders(&self, expected: usize) -> Result<Vec<(i64, usize)>> {
		Ok(self
			.image_counts()?
			.into_iter()
			.filter(|(_, held)| *held > 0 && *held < expected)
			.collect())
	}

	/// Images in a record folder ordered by heading. Files not named `<heading>.<ext>` are ignored.
	pub fn images(&self, record_id: i64) -> Result<Vec<StoredImage>> {
		let dir = self.record_dir(record_id);

		if !dir.is_dir() {
			return Ok(Vec::new());
		}

		let mut images = Vec::new();

		for entry in fs::read_dir(&dir).map_err(Error::io(&dir))? {
			let path = entry.map_err(Error::io(&dir))?.path();

			if !path.is_file() || path.file_name().is_some_and(|name| name == LINKS_FILE) {
				continue;
			}
			if let Some(heading) =
				path.file_stem().and_then(|stem| stem.to_str()).and_then(|stem| stem.parse().ok())
			{
				images.push(StoredImage { heading, path });
			}
		}

		images.sort_by_key(|image| image.heading);

		Ok(images)
	}
}
