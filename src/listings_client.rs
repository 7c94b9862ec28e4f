use crate::config::SourceConfig;
use crate::error::AggregateError;
use reqwest::Client;
use serde_json::Value;

pub fn build_client(config: &SourceConfig) -> Result<Client, AggregateError> {
    let client = Client::builder()
        .timeout(config.timeout())
        .user_agent(config.user_agent.as_str())
        .build()?;
    Ok(client)
}

/// Decodes a listings payload, which must be a JSON array at the top level.
pub fn parse_listings(body: &str) -> Result<Vec<Value>, AggregateError> {
    match serde_json::from_str::<Value>(body)? {
        Value::Array(listings) => Ok(listings),
        other => Err(AggregateError::shape(format!(
            "expected a JSON list of listings, got {}",
            json_type_name(&other)
        ))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

/// Performs the single GET against the listings source. No retries.
pub async fn fetch_listings(client: &Client, url: &str) -> Result<Vec<Value>, AggregateError> {
    log::debug!("Fetching listings from {}", url);
    let response = client.get(url).send().await?;
    let response = response.error_for_status()?;
    let body = response.text().await?;
    let listings = parse_listings(&body)?;
    log::info!("Fetched {} listings from {}", listings.len(), url);
    Ok(listings)
}
