use anyhow::Result;
use clap::Parser;
use flexiona::cli::Cli;
use flexiona::{logging, Flexiona};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Before parsing, so `.env` can supply the API keys
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    logging::init_tracing(cli.verbose, cli.quiet);

    let app = Flexiona::from_cli(cli)?;
    app.run().await?;

    Ok(())
}
