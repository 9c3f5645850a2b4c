//! Fixed-size worker pool over a shared job list.
//!
//! Workers claim jobs with a single locked pop, so a job is handed out at most once, and the
//! pool returns only after every worker has seen the list empty and exited.

use std::{
	future::Future,
	sync::{Arc, Mutex},
};

use tokio::task::JoinSet;

use crate::{Error, Result};

pub struct JobQueue<J> {
	jobs: Mutex<Vec<J>>,
}
impl<J> JobQueue<J> {
	/// Jobs are claimed in the order given.
	pub fn new(mut jobs: Vec<J>) -> Self {
		jobs.reverse();

		Self { jobs: Mutex::new(jobs) }
	}

	pub fn claim(&self) -> Option<J> {
		self.jobs.lock().unwrap_or_else(|err| err.into_inner()).pop()
	}

	pub fn len(&self) -> usize {
		self.jobs.lock().unwrap_or_else(|err| err.into_inner()).len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

/// Runs `handler` over every job on `workers` concurrent tasks and collects the outputs.
///
/// Output order is unspecified.
pub async fn run_pool<J, O, F, Fut>(jobs: Vec<J>, workers: usize, handler: F) -> Result<Vec<O>>
where
	J: Send + 'static,
	O: Send + 'static,
	F: Fn(J) -> Fut + Clone + Send + Sync + 'static,
	Fut: Future<Output = O> + Send + 'static,
{
	let total = jobs.len();
	let queue = Arc::new(JobQueue::new(jobs));
	let mut tasks = JoinSet::new();

	tracing::info!(jobs = total, workers, "Dispatching jobs.");

	for worker in 0..workers.max(1) {
		let queue = queue.clone();
		let handler = handler.clone();

		tasks.spawn(async move {
			let mut outputs = Vec::new();

			while let Some(job) = queue.claim() {
				outputs.push(handler(job).await);
			}

			tracing::debug!(worker, handled = outputs.len(), "Worker found the job list empty.");

			outputs
		});
	}

	let mut outputs = Vec::with_capacity(total);

	while let Some(joined) = tasks.join_next().await {
		match joined {
			Ok(handled) => outputs.extend(handled),
			Err(err) => {
				tasks.abort_all();

				return Err(Error::Dispatch { message: format!("Worker task failed: {err}") });
			},
		}
	}

	Ok(outputs)
}
