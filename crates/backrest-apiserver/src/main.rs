//! pgo-backrest binary

use clap::Parser;

use backrest_apiserver::{Cli, Result};
use backrest_common::telemetry::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_format())?;
    cli.run().await
}
