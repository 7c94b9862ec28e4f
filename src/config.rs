use config::{Config, ConfigBuilder, ConfigError, Environment, File, builder::DefaultState};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_SOURCE_URL: &str =
    "https://raw.githubusercontent.com/bogdanfazakas/datasets/refs/heads/main/data.json";
const ENV_PREFIX: &str = "LISTINGS";

#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    pub url: String,
    pub timeout_seconds: u64,
    pub user_agent: String,
}

impl SourceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    pub folder: PathBuf,
    pub file_name: String,
}

impl OutputConfig {
    pub fn results_path(&self) -> PathBuf {
        self.folder.join(&self.file_name)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct FilterConfig {
    /// Used when the selector hands over a blank main filter.
    pub main_filter: String,
    /// Always projected alongside the user's extra filters.
    pub always_include: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub source: SourceConfig,
    pub output: OutputConfig,
    pub filters: FilterConfig,
}

/// Values supplied on the command line; they win over every other layer.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub url: Option<String>,
    pub output_folder: Option<String>,
    pub timeout_seconds: Option<u64>,
}

impl Settings {
    /// Loads `<config_dir>/default.toml` and `<config_dir>/local.toml` on top
    /// of the built-in defaults, then `LISTINGS__*` environment variables.
    pub fn load_from(config_dir: &Path, overrides: &Overrides) -> Result<Self, ConfigError> {
        let env = Environment::with_prefix(ENV_PREFIX).separator("__");
        Self::build(config_dir, env, overrides)
    }

    fn build(
        config_dir: &Path,
        env: Environment,
        overrides: &Overrides,
    ) -> Result<Self, ConfigError> {
        let builder = defaults()?
            .add_source(File::from(config_dir.join("default")).required(false))
            .add_source(File::from(config_dir.join("local")).required(false))
            .add_source(env)
            .set_override_option("source.url", overrides.url.clone())?
            .set_override_option("output.folder", overrides.output_folder.clone())?
            .set_override_option(
                "source.timeout_seconds",
                overrides.timeout_seconds.map(|s| s as i64),
            )?;

        let settings: Settings = builder.build()?.try_deserialize()?;
        log::debug!("Loaded settings: {:?}", settings);
        Ok(settings)
    }
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("source.url", DEFAULT_SOURCE_URL)?
        .set_default("source.timeout_seconds", 30_i64)?
        .set_default("source.user_agent", "listing-price-stats")?
        .set_default("output.folder", "/data/outputs")?
        .set_default("output.file_name", "results.json")?
        .set_default("filters.main_filter", "roomsNo")?
        .set_default(
            "filters.always_include",
            vec!["surface", "roomsNo", "createdOn"],
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::collections::HashMap;
    use std::fs;
    use std::io::Write;

    fn create_temp_config_file(dir: &Path, name: &str, content: &str) -> Result<()> {
        fs::create_dir_all(dir)?;
        let mut file = fs::File::create(dir.join(format!("{}.toml", name)))?;
        writeln!(file, "{}", content)?;
        Ok(())
    }

    fn no_env() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .source(Some(HashMap::new()))
    }

    #[test]
    fn test_builtin_defaults_without_files() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let settings = Settings::build(dir.path(), no_env(), &Overrides::default())?;

        assert_eq!(settings.source.url, DEFAULT_SOURCE_URL);
        assert_eq!(settings.source.timeout(), Duration::from_secs(30));
        assert_eq!(
            settings.output.results_path(),
            PathBuf::from("/data/outputs/results.json")
        );
        assert_eq!(settings.filters.main_filter, "roomsNo");
        assert_eq!(
            settings.filters.always_include,
            vec!["surface", "roomsNo", "createdOn"]
        );
        Ok(())
    }

    #[test]
    fn test_local_file_overrides_default_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        create_temp_config_file(
            dir.path(),
            "default",
            r#"
[source]
url = "http://listings.internal/data.json"
timeout_seconds = 10

[output]
folder = "/srv/outputs"
        "#,
        )?;
        create_temp_config_file(
            dir.path(),
            "local",
            r#"
[source]
timeout_seconds = 3

[filters]
main_filter = "zone"
        "#,
        )?;

        let settings = Settings::build(dir.path(), no_env(), &Overrides::default())?;

        assert_eq!(settings.source.url, "http://listings.internal/data.json");
        assert_eq!(settings.source.timeout_seconds, 3);
        assert_eq!(settings.output.folder, PathBuf::from("/srv/outputs"));
        assert_eq!(settings.output.file_name, "results.json");
        assert_eq!(settings.filters.main_filter, "zone");
        Ok(())
    }

    #[test]
    fn test_environment_and_cli_layers() -> Result<()> {
        let dir = tempfile::tempdir()?;
        create_temp_config_file(
            dir.path(),
            "default",
            r#"
[output]
folder = "/srv/outputs"
        "#,
        )?;

        let mut vars = HashMap::new();
        vars.insert("LISTINGS__OUTPUT__FOLDER".to_string(), "/env/outputs".to_string());
        vars.insert("LISTINGS__SOURCE__TIMEOUT_SECONDS".to_string(), "12".to_string());
        let env = Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .source(Some(vars));

        let overrides = Overrides {
            url: Some("http://localhost:9999/listings".to_string()),
            output_folder: None,
            timeout_seconds: None,
        };
        let settings = Settings::build(dir.path(), env, &overrides)?;

        assert_eq!(settings.output.folder, PathBuf::from("/env/outputs"));
        assert_eq!(settings.source.timeout_seconds, 12);
        assert_eq!(settings.source.url, "http://localhost:9999/listings");
        Ok(())
    }

    #[test]
    fn test_cli_override_wins_over_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        create_temp_config_file(
            dir.path(),
            "default",
            r#"
[output]
folder = "/srv/outputs"
        "#,
        )?;

        let overrides = Overrides {
            url: None,
            output_folder: Some("/tmp/cli-outputs".to_string()),
            timeout_seconds: Some(5),
        };
        let settings = Settings::build(dir.path(), no_env(), &overrides)?;

        assert_eq!(settings.output.folder, PathBuf::from("/tmp/cli-outputs"));
        assert_eq!(settings.source.timeout_seconds, 5);
        Ok(())
    }
}
