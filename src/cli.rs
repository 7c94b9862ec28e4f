use crate::config::Overrides;
use crate::prompt::parse_filter_list;
use clap::Parser;
use std::path::PathBuf;

/// Average listing prices grouped by a chosen attribute.
#[derive(Parser, Debug, Clone)]
#[command(name = "listing_price_stats", version, about)]
pub struct Args {
    /// Attribute to group listings by. Prompts interactively when omitted.
    #[arg(short, long)]
    pub main_filter: Option<String>,

    /// Comma-separated attributes to keep in each listing's record.
    #[arg(short, long)]
    pub filters: Option<String>,

    /// Listings source URL.
    #[arg(long)]
    pub url: Option<String>,

    /// Folder that receives results.json.
    #[arg(short, long)]
    pub output_folder: Option<String>,

    /// Request timeout in seconds.
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Directory holding default.toml / local.toml.
    #[arg(long, default_value = "config")]
    pub config_dir: PathBuf,
}

impl Args {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            url: self.url.clone(),
            output_folder: self.output_folder.clone(),
            timeout_seconds: self.timeout,
        }
    }

    /// `Some` when the selection was given on the command line.
    pub fn filter_choice(&self) -> Option<(String, Vec<String>)> {
        let main = self.main_filter.as_ref()?;
        let extra = self
            .filters
            .as_deref()
            .map(parse_filter_list)
            .unwrap_or_default();
        Some((main.trim().to_string(), extra))
    }
}
