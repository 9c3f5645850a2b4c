use std::{
	collections::{HashMap, HashSet},
	fs,
	sync::{
		Arc, Mutex,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration,
};

use litterview_domain::GeoPoint;
use litterview_providers::{
	Error as ProviderError,
	geocoding::GeocodeOutcome,
	imagery::{FetchedImage, ImageRequest},
};
use litterview_service::{
	BoxFuture, Error, FetchJob, GeocodingProvider, ImageryProvider, LitterService, Providers,
	dispatch, flatten,
};
use litterview_testkit::{FixtureRow, TestDir};

const MARKET_ST: GeoPoint = GeoPoint { lat: 39.95, lng: -75.16 };

struct FixedGeocoder {
	found: HashMap<String, GeoPoint>,
	failing: HashSet<String>,
	queries: Mutex<Vec<String>>,
}
impl FixedGeocoder {
	fn new(found: &[(&str, GeoPoint)], failing: &[&str]) -> Self {
		Self {
			found: found.iter().map(|(query, point)| (query.to_string(), *point)).collect(),
			failing: failing.iter().map(|query| query.to_string()).collect(),
			queries: Mutex::new(Vec::new()),
		}
	}
}
impl GeocodingProvider for FixedGeocoder {
	fn geocode<'a>(
		&'a self,
		address: &'a str,
	) -> BoxFuture<'a, litterview_providers::Result<GeocodeOutcome>> {
		self.queries.lock().expect("Lock poisoned.").push(address.to_string());

		let result = if self.failing.contains(address) {
			Err(ProviderError::Upstream {
				status: "OVER_QUERY_LIMIT".to_string(),
				message: "quota".to_string(),
			})
		} else {
			Ok(self.found.get(address).map_or(GeocodeOutcome::NotFound, |point| {
				GeocodeOutcome::Found(*point)
			}))
		};

		Box::pin(async move { result })
	}
}

/// Serves a fixed 2x2 PNG for every heading except the ones listed as failing.
struct FixedImagery {
	png: Vec<u8>,
	failing_headings: HashSet<u16>,
	calls: AtomicUsize,
}
impl FixedImagery {
	fn new(rgb: [u8; 3], failing_headings: &[u16]) -> Self {
		let image = litterview_testkit::solid_rgb(2, 2, rgb);

		Self {
			png: litterview_testkit::encode_png(&image).expect("Encode failed."),
			failing_headings: failing_headings.iter().copied().collect(),
			calls: AtomicUsize::new(0),
		}
	}
}
impl ImageryProvider for FixedImagery {
	fn fetch_image<'a>(
		&'a self,
		request: &'a ImageRequest,
	) -> BoxFuture<'a, litterview_providers::Result<FetchedImage>> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		let result = if self.failing_headings.contains(&request.heading) {
			Err(ProviderError::InvalidResponse { message: "connection reset".to_string() })
		} else {
			Ok(FetchedImage {
				bytes: self.png.clone(),
				extension: "png",
				link: format!("https://imagery.test/?heading={}", request.heading),
			})
		};

		Box::pin(async move { result })
	}
}

fn service(
	dir: &TestDir,
	geocoder: Arc<FixedGeocoder>,
	imagery: Arc<FixedImagery>,
) -> LitterService {
	let cfg = litterview_testkit::sample_config(dir.path(), vec![0, 90, 180, 270], 2, 2);

	LitterService::new(cfg, Providers { geocoding: geocoder, imagery })
}

fn market_street_row() -> FixtureRow {
	FixtureRow {
		id: "42",
		address: "100 MARKET ST",
		street_class: "Local",
		score_color: "MAROON",
		score: "7.5",
	}
}

#[tokio::test]
async fn market_street_scenario_produces_four_rows_of_thirteen() {
	let dir = TestDir::new("service_scenario").expect("Failed to create test dir.");
	let geocoder =
		Arc::new(FixedGeocoder::new(&[("100 MARKET ST, Philadelphia, PA", MARKET_ST)], &[]));
	let imagery = Arc::new(FixedImagery::new([200, 100, 50], &[]));
	let service = service(&dir, geocoder.clone(), imagery.clone());

	litterview_testkit::write_input_table(&service.cfg.paths.input, &[market_street_row()])
		.expect("Write input failed.");

	let report = service.run_pipeline().await.expect("Pipeline failed.");

	assert_eq!(report.selected, 1);
	assert_eq!(report.geocode.processed, 1);
	assert_eq!(report.fetch.processed, 1);
	assert_eq!(report.flatten.processed, 1);
	assert_eq!(imagery.calls.load(Ordering::SeqCst), 4);
	assert_eq!(
		*geocoder.queries.lock().expect("Lock poisoned."),
		vec!["100 MARKET ST, Philadelphia, PA".to_string()]
	);

	let body = fs::read_to_string(&service.cfg.paths.pixels).expect("Read pixels failed.");
	let rows: Vec<Vec<f64>> = body
		.lines()
		.map(|line| line.split(',').map(|value| value.parse().expect("Not a number.")).collect())
		.collect();

	assert_eq!(rows.len(), 4);

	for row in &rows {
		assert_eq!(row.len(), 13);
		assert_eq!(row[..3], [200.0, 100.0, 50.0]);
		assert_eq!(row[12], 7.5);
	}

	let links = fs::read_to_string(service.store.record_dir(42).join("links.txt"))
		.expect("Read links failed.");

	assert_eq!(links.lines().count(), 4);

	let coordinates =
		fs::read_to_string(&service.cfg.paths.coordinates).expect("Read coordinates failed.");

	assert!(coordinates.lines().nth(1).is_some_and(|line| line.ends_with(",39.95,-75.16")));
}

#[tokio::test]
async fn rerun_selects_nothing_once_images_exist() {
	let dir = TestDir::new("service_rerun").expect("Failed to create test dir.");
	let geocoder =
		Arc::new(FixedGeocoder::new(&[("100 MARKET ST, Philadelphia, PA", MARKET_ST)], &[]));
	let imagery = Arc::new(FixedImagery::new([1, 2, 3], &[]));
	let service = service(&dir, geocoder, imagery);

	litterview_testkit::write_input_table(&service.cfg.paths.input, &[market_street_row()])
		.expect("Write input failed.");

	let before = service.select_records().expect("Select failed.");

	assert_eq!(before.report.selected, 1);

	service.run_pipeline().await.expect("Pipeline failed.");

	let first = service.select_records().expect("Select failed.");
	let second = service.select_records().expect("Select failed.");

	assert!(first.selected.is_empty());
	assert_eq!(first.report.already_fetched, 1);
	assert_eq!(first.selected, second.selected);
	assert_eq!(first.report, second.report);
}

#[tokio::test]
async fn second_run_appends_only_newly_fetched_records() {
	let dir = TestDir::new("service_second_run").expect("Failed to create test dir.");
	let geocoder = Arc::new(FixedGeocoder::new(
		&[
			("100 MARKET ST, Philadelphia, PA", MARKET_ST),
			("200 MARKET ST, Philadelphia, PA", GeoPoint { lat: 39.96, lng: -75.17 }),
		],
		&[],
	));
	let imagery = Arc::new(FixedImagery::new([1, 2, 3], &[]));
	let service = service(&dir, geocoder, imagery);

	litterview_testkit::write_input_table(&service.cfg.paths.input, &[market_street_row()])
		.expect("Write input failed.");

	let first = service.run_pipeline().await.expect("Pipeline failed.");
	let rows_after_first = fs::read_to_string(&service.cfg.paths.pixels)
		.expect("Read pixels failed.")
		.lines()
		.count();

	assert_eq!(first.flatten.processed, 1);
	assert_eq!(rows_after_first, 4);

	let rows = [
		market_street_row(),
		FixtureRow {
			id: "43",
			address: "200 MARKET ST",
			street_class: "Local",
			score_color: "RED",
			score: "2.5",
		},
	];

	litterview_testkit::write_input_table(&service.cfg.paths.input, &rows)
		.expect("Write input failed.");

	let second = service.run_pipeline().await.expect("Pipeline failed.");
	let body = fs::read_to_string(&service.cfg.paths.pixels).expect("Read pixels failed.");

	assert_eq!(second.selected, 1);
	assert_eq!(second.flatten.processed, 1);
	assert_eq!(body.lines().count(), 8);
	assert_eq!(body.lines().filter(|line| line.ends_with(",2.5")).count(), 4);
	assert_eq!(body.lines().filter(|line| line.ends_with(",7.5")).count(), 4);
}

#[tokio::test]
async fn partly_fetched_record_is_selected_again() {
	let dir = TestDir::new("service_partial_rerun").expect("Failed to create test dir.");
	let geocoder =
		Arc::new(FixedGeocoder::new(&[("100 MARKET ST, Philadelphia, PA", MARKET_ST)], &[]));
	let imagery = Arc::new(FixedImagery::new([1, 2, 3], &[]));
	let service = service(&dir, geocoder, imagery.clone());
	let image = litterview_testkit::solid_rgb(2, 2, [1, 2, 3]);

	litterview_testkit::write_input_table(&service.cfg.paths.input, &[market_street_row()])
		.expect("Write input failed.");

	for heading in [0, 90, 180] {
		litterview_testkit::write_png(&service.store.image_path(42, heading, "png"), &image)
			.expect("Write image failed.");
	}

	let select = service.select_records().expect("Select failed.");

	assert_eq!(select.report.already_fetched, 0);
	assert_eq!(select.selected.len(), 1);

	let report = service.run_pipeline().await.expect("Pipeline failed.");

	assert_eq!(imagery.calls.load(Ordering::SeqCst), 4);
	assert_eq!(report.flatten.processed, 1);
	assert_eq!(service.store.images(42).expect("List failed.").len(), 4);
	assert_eq!(service.select_records().expect("Select failed.").report.already_fetched, 1);
}

#[tokio::test]
async fn nan_score_row_still_reaches_the_coordinates_table() {
	let dir = TestDir::new("service_nan_score").expect("Failed to create test dir.");
	let geocoder =
		Arc::new(FixedGeocoder::new(&[("100 MARKET ST, Philadelphia, PA", MARKET_ST)], &[]));
	let imagery = Arc::new(FixedImagery::new([1, 2, 3], &[]));
	let service = service(&dir, geocoder, imagery);
	let row = FixtureRow { score: "NaN", ..market_street_row() };

	litterview_testkit::write_input_table(&service.cfg.paths.input, &[row])
		.expect("Write input failed.");

	let select = service.select_records().expect("Select failed.");
	let stage = service.geocode_records(&select).await.expect("Geocode failed.");
	let written = litterview_storage::table::read_coordinates(&service.cfg.paths.coordinates)
		.expect("Read coordinates failed.");

	assert_eq!(stage.report.processed, 1);
	assert_eq!(written.len(), 1);
	assert_eq!(written[0].record_id, 42);
	assert_eq!(written[0].point, MARKET_ST);
}

#[tokio::test]
async fn geocoding_failures_skip_records_without_aborting() {
	let dir = TestDir::new("service_geocode").expect("Failed to create test dir.");
	let geocoder = Arc::new(FixedGeocoder::new(
		&[("100 MARKET ST, Philadelphia, PA", MARKET_ST)],
		&["300 MARKET ST, Philadelphia, PA"],
	));
	let imagery = Arc::new(FixedImagery::new([1, 2, 3], &[]));
	let service = service(&dir, geocoder, imagery);
	let rows = [
		market_street_row(),
		FixtureRow {
			id: "43",
			address: "200 MARKET ST",
			street_class: "Local",
			score_color: "RED",
			score: "2.0",
		},
		FixtureRow {
			id: "44",
			address: "300 MARKET ST",
			street_class: "Local",
			score_color: "RED",
			score: "3.0",
		},
	];

	litterview_testkit::write_input_table(&service.cfg.paths.input, &rows)
		.expect("Write input failed.");

	let select = service.select_records().expect("Select failed.");
	let stage = service.geocode_records(&select).await.expect("Geocode failed.");

	assert_eq!(stage.report.processed, 1);
	assert_eq!(stage.report.skipped, 1);
	assert_eq!(stage.report.failed, 1);
	assert_eq!(stage.geocoded.len(), 1);
	assert_eq!(stage.geocoded[0].record_id, 42);
	assert_eq!(stage.geocoded[0].point, MARKET_ST);

	let missing = service.geocode_record(&select.selected[1]).await.expect_err("Expected miss.");

	assert!(matches!(missing, Error::NotFound { .. }));
}

#[tokio::test]
async fn failed_heading_does_not_abort_the_record() {
	let dir = TestDir::new("service_partial").expect("Failed to create test dir.");
	let geocoder = Arc::new(FixedGeocoder::new(&[], &[]));
	let imagery = Arc::new(FixedImagery::new([1, 2, 3], &[90]));
	let service = service(&dir, geocoder, imagery.clone());
	let (outcomes, report) = service
		.fetch_jobs(vec![FetchJob { record_id: 7, point: MARKET_ST }])
		.await
		.expect("Fetch failed.");

	assert_eq!(imagery.calls.load(Ordering::SeqCst), 4);
	assert_eq!(report.failed, 1);
	assert_eq!(outcomes[0].record_id(), 7);
	assert_eq!(outcomes[0].failed_headings, vec![90]);

	let saved: Vec<u16> = outcomes[0].images.images.iter().map(|image| image.heading).collect();

	assert_eq!(saved, vec![0, 180, 270]);
	assert!(outcomes[0].images.images.iter().all(|image| image.point == MARKET_ST));
	assert!(service.store.record_dir(7).join("180.png").is_file());

	let err = flatten::flatten_record(&service.store, 7, 1.0, &service.cfg.imagery)
		.expect_err("Expected image count validation.");

	assert!(matches!(err, Error::MalformedInput { .. }));
	assert!(err.to_string().contains("holds 3 images, expected 4"));
}

#[tokio::test]
async fn record_with_no_images_leaves_no_folder() {
	let dir = TestDir::new("service_empty_folder").expect("Failed to create test dir.");
	let geocoder = Arc::new(FixedGeocoder::new(&[], &[]));
	let imagery = Arc::new(FixedImagery::new([1, 2, 3], &[0, 90, 180, 270]));
	let service = service(&dir, geocoder, imagery);
	let (_, report) = service
		.fetch_jobs(vec![FetchJob { record_id: 8, point: MARKET_ST }])
		.await
		.expect("Fetch failed.");

	assert_eq!(report.failed, 1);
	assert!(!service.store.record_dir(8).exists());
}

#[tokio::test]
async fn flatten_counts_bad_folders_without_writing_them() {
	let dir = TestDir::new("service_flatten").expect("Failed to create test dir.");
	let geocoder = Arc::new(FixedGeocoder::new(&[], &[]));
	let imagery = Arc::new(FixedImagery::new([1, 2, 3], &[]));
	let service = service(&dir, geocoder, imagery);
	let image = litterview_testkit::solid_rgb(4, 4, [9, 9, 9]);

	litterview_testkit::write_input_table(&service.cfg.paths.input, &[market_street_row()])
		.expect("Write input failed.");

	// Full set stored at a larger size, resized to 2x2 on flatten.
	for heading in [0, 90, 180, 270] {
		litterview_testkit::write_png(&service.store.image_path(42, heading, "png"), &image)
			.expect("Write image failed.");
	}

	// Unknown record id.
	litterview_testkit::write_png(&service.store.image_path(99, 0, "png"), &image)
		.expect("Write image failed.");

	let input = service.read_input().expect("Read input failed.");
	let report = service.flatten_images(&input).expect("Flatten failed.");

	assert_eq!(report.processed, 1);
	assert_eq!(report.skipped, 1);
	assert_eq!(report.failed, 0);

	let body = fs::read_to_string(&service.cfg.paths.pixels).expect("Read pixels failed.");

	assert_eq!(body.lines().count(), 4);
	assert!(body.lines().all(|line| line == "9,9,9,9,9,9,9,9,9,9,9,9,7.5"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn dispatcher_runs_every_job_exactly_once() {
	for workers in 1..=8 {
		let counts: Arc<Vec<AtomicUsize>> =
			Arc::new((0..64).map(|_| AtomicUsize::new(0)).collect());
		let jobs: Vec<usize> = (0..64).collect();
		let handler_counts = counts.clone();
		let outputs = dispatch::run_pool(jobs, workers, move |job| {
			let counts = handler_counts.clone();

			async move {
				counts[job].fetch_add(1, Ordering::SeqCst);
				tokio::time::sleep(Duration::from_millis(2)).await;

				job
			}
		})
		.await
		.expect("Dispatch failed.");
		let mut seen = outputs.clone();

		seen.sort_unstable();

		assert_eq!(seen, (0..64).collect::<Vec<_>>(), "workers = {workers}");
		assert!(counts.iter().all(|count| count.load(Ordering::SeqCst) == 1));
	}
}

#[tokio::test]
async fn dispatcher_with_no_jobs_returns_immediately() {
	let outputs = dispatch::run_pool(Vec::<u32>::new(), 4, |job| async move { job })
		.await
		.expect("Dispatch failed.");

	assert!(outputs.is_empty());
}

#[test]
fn queue_claims_in_order_until_empty() {
	let queue = dispatch::JobQueue::new(vec![1, 2, 3]);

	assert_eq!(queue.len(), 3);
	assert_eq!(queue.claim(), Some(1));
	assert_eq!(queue.claim(), Some(2));
	assert_eq!(queue.claim(), Some(3));
	assert_eq!(queue.claim(), None);
	assert!(queue.is_empty());
}
