//! Portfolio Showcase - binary entry point
//! Delegates to the library for all app logic.

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match portfolio_showcase::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("portfolio-showcase: {}", e);
            ExitCode::FAILURE
        }
    }
}
