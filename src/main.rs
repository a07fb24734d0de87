use std::process::ExitCode;

use clap::Parser;
use ganga_genai::cli::{self, Cli};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // logging may not be initialized yet (bad config)
            eprintln!("❌ {:#}", e);
            ExitCode::FAILURE
        }
    }
}
