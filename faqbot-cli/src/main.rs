use std::process::ExitCode;

use clap::Parser;
use faqbot_cli::{Args, logging};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    logging::init(args.verbose);

    match faqbot_cli::run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
