use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("I/O error at {path:?}.")]
	Io { path: PathBuf, source: std::io::Error },
	#[error("CSV error in {path:?}.")]
	Csv { path: PathBuf, source: csv::Error },
	#[error("Missing column {column} in {path:?}.")]
	MissingColumn { path: PathBuf, column: String },
}
impl Error {
	pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
		let path = path.into();

		move |source| Self::Io { path, source }
	}

	pub(crate) fn csv(path: impl Into<PathBuf>) -> impl FnOnce(csv::Error) -> Self {
		let path = path.into();

		move |source| Self::Csv { path, source }
	}
}
