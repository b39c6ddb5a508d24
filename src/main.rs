//! metricbridge CLI entry point.

use metricbridge_lib::cli::{self, Cli};
use metricbridge_lib::core::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();
    cli::execute(cli).await
}
