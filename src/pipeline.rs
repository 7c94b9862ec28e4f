use crate::aggregator::{FilterSelection, ResultDocument, aggregate_listings};
use crate::config::Settings;
use crate::error::AggregateError;
use crate::listings_client::{build_client, fetch_listings};
use crate::sink::write_results;

/// Builds the selection handed to the aggregator. A blank main filter falls
/// back to the configured default.
pub fn selection_for(settings: &Settings, main_filter: &str, extra: Vec<String>) -> FilterSelection {
    let main = match main_filter.trim() {
        "" => {
            log::warn!(
                "No main filter given, grouping by `{}`",
                settings.filters.main_filter
            );
            settings.filters.main_filter.as_str()
        }
        name => name,
    };
    FilterSelection::new(main, extra)
        .with_always_include(settings.filters.always_include.iter().cloned())
}

/// Fetches the listings, groups them, writes the result document and reports it.
///
/// Nothing is written unless every earlier step succeeded.
pub async fn aggregate(
    settings: &Settings,
    selection: &FilterSelection,
) -> Result<ResultDocument, AggregateError> {
    log::info!(
        "Aggregating listings from {} by `{}`",
        settings.source.url,
        selection.main_filter
    );
    let client = build_client(&settings.source)?;
    let listings = fetch_listings(&client, &settings.source.url).await?;

    let document = aggregate_listings(&listings, selection)?;
    log::info!("Computed price stats for {} groups", document.len());
    log::debug!("Writing results to {}", settings.output.results_path().display());

    let path = write_results(
        &settings.output.folder,
        &settings.output.file_name,
        &document,
    )?;

    let summary = serde_json::to_string(&document)?;
    log::info!("Results written to {}", path.display());
    println!("✅ Results written to: {}", path.display());
    println!("📊 Avg Prices by Filter: {}", summary);
    Ok(document)
}
