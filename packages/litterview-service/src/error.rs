pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Malformed input: {message}")]
	MalformedInput { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
	#[error("Dispatch error: {message}")]
	Dispatch { message: String },
}
impl From<litterview_providers::Error> for Error {
	fn from(err: litterview_providers::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}

impl From<litterview_storage::Error> for Error {
	fn from(err: litterview_storage::Error) -> Self {
		let message = match &err {
			litterview_storage::Error::Io { source, .. } => format!("{err} {source}"),
			litterview_storage::Error::Csv { source, .. } => format!("{err} {source}"),
			litterview_storage::Error::MissingColumn { .. } => err.to_string(),
		};

		Self::Storage { message }
	}
}

impl From<image::ImageError> for Error {
	fn from(err: image::ImageError) -> Self {
		Self::Storage { message: format!("Failed to decode image: {err}") }
	}
}

impl From<litterview_domain::features::ShapeError> for Error {
	fn from(err: litterview_domain::features::ShapeError) -> Self {
		Self::MalformedInput { message: err.to_string() }
	}
}
