use anyhow::Result;
use clap::Parser;
use std::io;

mod aggregator;
mod cli;
mod config;
mod error;
mod listings_client;
mod pipeline;
mod prompt;
mod sink;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Listing price stats starting");

    let args = cli::Args::parse();
    let settings = config::Settings::load_from(&args.config_dir, &args.overrides())
        .map_err(error::AggregateError::from)?;

    let (main_filter, extra) = match args.filter_choice() {
        Some(choice) => choice,
        None => prompt::prompt_for_filters(&mut io::stdin().lock(), &mut io::stdout())?,
    };
    let selection = pipeline::selection_for(&settings, &main_filter, extra);

    // Failures are reported, not propagated to the exit status.
    match pipeline::aggregate(&settings, &selection).await {
        Ok(document) if document.is_empty() => {
            log::warn!("No listing had both a price and `{}`", selection.main_filter);
        }
        Ok(document) => {
            for group in document.groups() {
                log::debug!(
                    "{} = {}: {} listings, average {}",
                    selection.main_filter,
                    group.label(),
                    group.stats.count,
                    group.stats.average_price
                );
            }
            log::info!("Aggregation finished with {} groups", document.len());
        }
        Err(e) => {
            log::error!("Aggregation failed ({}): {}", e.kind(), e);
            println!("❌ Error: {}", e);
        }
    }

    log::info!("Listing price stats finished");
    Ok(())
}
