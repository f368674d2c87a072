use std::process;
use clap::Parser;

use feed_cache::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = cli.run().await {
        eprintln!("Error [{}]: {}", e.error_code(), e);
        if let Some(hint) = e.hint() {
            eprintln!("Hint: {}", hint);
        }
        process::exit(1);
    }
}
