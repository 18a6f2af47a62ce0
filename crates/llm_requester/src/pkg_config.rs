use config::{Config, File};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIConfig {
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub openai: OpenAIConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RequestConfig {
    pub timeout_secs: Option<u64>,
    pub max_retries: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub provider: String,
    pub llm: LlmConfig,
    pub request: Option<RequestConfig>,
}

/// Load the application configuration. The config file is searched at a few
/// relative locations so the binary works from the workspace root as well as
/// from inside a member crate.
pub fn get_config() -> Result<AppConfig, config::ConfigError> {
    let possible_paths = [
        "config/config.toml",
        "../config/config.toml",
        "../../config/config.toml",
    ];

    let mut config_builder = Config::builder();
    let mut found_config = false;

    for path in &possible_paths {
        if std::path::Path::new(path).exists() {
            config_builder = config_builder.add_source(File::with_name(path));
            found_config = true;
            break;
        }
    }

    if !found_config {
        return Err(config::ConfigError::NotFound(
            "config.toml not found in any expected location".to_string(),
        ));
    }

    let config = config_builder.build()?;
    let config: AppConfig = config.try_deserialize()?;
    Ok(config)
}
