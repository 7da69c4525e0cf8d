use std::process::ExitCode;

use clap::Parser;
use wpsf_tap::cli::{self, Cli};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    wpsf_tap::core::logging::init();
    let cli = Cli::parse();

    match cli::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "tap failed");
            ExitCode::FAILURE
        }
    }
}
