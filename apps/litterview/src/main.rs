use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = litterview::Args::parse();
	litterview::run(args).await
}
