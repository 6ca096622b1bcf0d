mod cli;
mod error;
mod logging;

use std::process::ExitCode;
use std::sync::Arc;

use bubblewatch_core::{
    Clock, RefreshMode, RefreshReport, SnapshotBuilder, SystemClock, YahooSource,
};
use clap::Parser;

use crate::cli::Cli;
use crate::error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();

    let cli = Cli::parse();
    match run(&cli, &SystemClock).await {
        Ok(report) => {
            println!(
                "Wrote {} with {} tickers ({} live, {} synthetic)",
                report.output_path.display(),
                report.snapshot.points.len(),
                report.live_count(),
                report.synthetic_count()
            );
            ExitCode::SUCCESS
        }
        Err(error) => {
            tracing::error!(error = %error, "refresh failed; previous cache left in place");
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run(cli: &Cli, clock: &dyn Clock) -> Result<RefreshReport, CliError> {
    let mut builder = SnapshotBuilder::new(cli.to_config()?);
    if builder.config().mode == RefreshMode::Live {
        let timeout_ms = builder.config().fetch_timeout.as_millis() as u64;
        let live = YahooSource::default().with_timeout_ms(timeout_ms);
        builder = builder.with_live_source(Arc::new(live));
    }

    Ok(builder.refresh(clock).await?)
}
