use std::time::{Duration, Instant};

use crate::{FetchJob, FetchOutcome, LitterService, Result, StageReport};

#[derive(Debug, Clone)]
pub struct PipelineReport {
	pub selected: usize,
	pub geocode: StageReport,
	pub fetch: StageReport,
	pub flatten: StageReport,
	pub elapsed: Duration,
}

impl LitterService {
	/// Select, geocode, fetch and flatten in one run.
	///
	/// Only the records fetched in this run are flattened, so rows already in the pixel file
	/// are not appended again.
	pub async fn run_pipeline(&self) -> Result<PipelineReport> {
		let started = Instant::now();
		let select = self.select_records()?;
		let geocode = self.geocode_records(&select).await?;
		let jobs = geocode.geocoded.iter().copied().map(FetchJob::from).collect();
		let (outcomes, fetch) = self.fetch_jobs(jobs).await?;
		let mut fetched: Vec<i64> = outcomes
			.iter()
			.filter(|outcome| !outcome.images.images.is_empty())
			.map(FetchOutcome::record_id)
			.collect();

		fetched.sort_unstable();

		let flatten = self.flatten_records(&select.input, &fetched)?;
		let elapsed = started.elapsed();

		tracing::info!(elapsed_secs = elapsed.as_secs_f64(), "Pipeline finished.");

		Ok(PipelineReport {
			selected: select.report.selected,
			geocode: geocode.report,
			fetch,
			flatten,
			elapsed,
		})
	}
}
