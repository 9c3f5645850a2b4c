use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use litterview_service::LitterService;

#[derive(Debug, Parser)]
#[command(
	version = litterview_cli::VERSION,
	rename_all = "kebab",
	styles = litterview_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	#[command(subcommand)]
	pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
	/// List the input records that still need imagery.
	Select,
	/// Geocode the selected records and write the coordinates table.
	Geocode,
	/// Fetch imagery for every row of the coordinates table.
	Fetch,
	/// Append one feature row per stored image to the pixel file.
	Flatten,
	/// Select, geocode, fetch and flatten in one pass.
	Run,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = litterview_config::load(&args.config)?;
	init_tracing(&config)?;
	let service = LitterService::from_config(config)?;

	tracing::info!(command = ?args.command, "Starting.");

	match args.command {
		Command::Select => {
			let stage = service.select_records()?;

			for record in &stage.selected {
				println!("{}\t{}", record.id, record.raw_address);
			}

			println!(
				"select: {} of {} records selected",
				stage.report.selected, stage.report.input
			);
		},
		Command::Geocode => {
			let select = service.select_records()?;
			let stage = service.geocode_records(&select).await?;

			println!("{}", stage.report);
		},
		Command::Fetch => {
			let (_, report) = service.fetch_from_coordinates().await?;

			println!("{report}");
		},
		Command::Flatten => {
			let input = service.read_input()?;
			let report = service.flatten_images(&input)?;

			println!("{report}");
		},
		Command::Run => {
			let report = service.run_pipeline().await?;

			println!("select: {} records selected", report.selected);
			println!("{}", report.geocode);
			println!("{}", report.fetch);
			println!("{}", report.flatten);
			println!("Finished in {:.1}s.", report.elapsed.as_secs_f64());
		},
	}

	Ok(())
}

fn init_tracing(config: &litterview_config::Config) -> color_eyre::Result<()> {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
	tracing_subscriber::fmt().with_env_filter(filter).init();
	Ok(())
}
