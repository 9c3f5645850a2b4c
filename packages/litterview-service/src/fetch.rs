use litterview_config::Imagery;
use litterview_domain::{GeoPoint, GeocodedRecord, HeadingImage, ImageSet};
use litterview_providers::imagery::ImageRequest;
use litterview_storage::{images::ImageStore, table};

use crate::{LitterService, Providers, Result, StageReport, dispatch};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FetchJob {
	pub record_id: i64,
	pub point: GeoPoint,
}
impl From<GeocodedRecord> for FetchJob {
	fn from(record: GeocodedRecord) -> Self {
		Self { record_id: record.record_id, point: record.point }
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
	pub images: ImageSet,
	pub failed_headings: Vec<u16>,
}
impl FetchOutcome {
	pub fn record_id(&self) -> i64 {
		self.images.record_id
	}

	pub fn is_complete(&self) -> bool {
		self.failed_headings.is_empty()
	}
}

/// Downloads every configured heading for one record. Cheap to clone into worker tasks.
#[derive(Clone)]
pub struct Fetcher {
	pub providers: Providers,
	pub store: ImageStore,
	pub imagery: Imagery,
}
impl Fetcher {
	/// A failed heading is logged and recorded; the remaining headings are still fetched.
	pub async fn fetch_images(&self, job: FetchJob) -> FetchOutcome {
		let mut images = ImageSet { record_id: job.record_id, images: Vec::new() };
		let mut failed_headings = Vec::new();
		let mut links = Vec::new();

		if let Err(err) = self.store.ensure_record_dir(job.record_id) {
			tracing::warn!(
				record_id = job.record_id,
				error = %err,
				"Failed to create image folder."
			);

			return FetchOutcome { images, failed_headings: self.imagery.headings.clone() };
		}

		tracing::info!(
			record_id = job.record_id,
			folder = %self.store.record_dir(job.record_id).display(),
			"Saving images."
		);

		for heading in &self.imagery.headings {
			let request = ImageRequest {
				point: job.point,
				heading: *heading,
				pitch: self.imagery.pitch,
				width: self.imagery.width,
				height: self.imagery.height,
			};

			match self.fetch_heading(job.record_id, &request).await {
				Ok((file_name, link)) => {
					images.images.push(HeadingImage {
						heading: *heading,
						point: job.point,
						file_name,
					});
					links.push(link);
				},
				Err(err) => {
					tracing::warn!(
						record_id = job.record_id,
						heading,
						error = %err,
						"Failed to fetch heading."
					);

					failed_headings.push(*heading);
				},
			}
		}

		if links.is_empty() {
			if let Err(err) = self.store.discard_if_empty(job.record_id) {
				tracing::warn!(
					record_id = job.record_id,
					error = %err,
					"Failed to remove empty folder."
				);
			}
		} else if let Err(err) = self.store.write_links(job.record_id, &links) {
			tracing::warn!(
				record_id = job.record_id,
				error = %err,
				"Failed to write links manifest."
			);
		}

		FetchOutcome { images, failed_headings }
	}

	async fn fetch_heading(
		&self,
		record_id: i64,
		request: &ImageRequest,
	) -> Result<(String, String)> {
		let fetched = self.providers.imagery.fetch_image(request).await?;
		let path = self.store.image_path(record_id, request.heading, fetched.extension);

		tokio::fs::write(&path, &fetched.bytes).await.map_err(|err| crate::Error::Storage {
			message: format!("Failed to write {}: {err}", path.display()),
		})?;

		let file_name = path
			.file_name()
			.map(|name| name.to_string_lossy().into_owned())
			.unwrap_or_default();

		Ok((file_name, fetched.link))
	}
}

impl LitterService {
	pub fn fetcher(&self) -> Fetcher {
		Fetcher {
			providers: self.providers.clone(),
			store: self.store.clone(),
			imagery: self.cfg.imagery.clone(),
		}
	}

	/// Fans the jobs out over the worker pool.
	pub async fn fetch_jobs(
		&self,
		jobs: Vec<FetchJob>,
	) -> Result<(Vec<FetchOutcome>, StageReport)> {
		let fetcher = self.fetcher();
		let workers = litterview_config::worker_count(&self.cfg.dispatch);
		let outcomes = dispatch::run_pool(jobs, workers, move |job| {
			let fetcher = fetcher.clone();

			async move { fetcher.fetch_images(job).await }
		})
		.await?;
		let mut report = StageReport::new("fetch");

		for outcome in &outcomes {
			if outcome.is_complete() {
				report.processed += 1;
			} else {
				report.failed += 1;
			}
		}

		report.log();

		Ok((outcomes, report))
	}

	/// Reads the coordinates table and fetches imagery for every row in it.
	pub async fn fetch_from_coordinates(&self) -> Result<(Vec<FetchOutcome>, StageReport)> {
		let geocoded = table::read_coordinates(&self.cfg.paths.coordinates)?;

		self.fetch_jobs(geocoded.into_iter().map(FetchJob::from).collect()).await
	}
}
