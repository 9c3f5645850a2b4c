pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Reqwest(#[from] reqwest::Error),
	#[error(transparent)]
	SerdeJson(#[from] serde_json::Error),
	#[error("Provider returned status {status}: {message}")]
	Upstream { status: String, message: String },
	#[error("{message}")]
	InvalidResponse { message: String },
}
