use config::{Config, File};
use serde::Deserialize;

/// Settings for the batch translation pipeline, read from the `[pipeline]`
/// table of config.toml. Every field has a usable default so the table may
/// be omitted entirely.
#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct PipelineConfig {
    /// Whole-file retries after a failed translation.
    pub max_retry_attempts: usize,
    /// Files translated concurrently.
    pub concurrent_limit: usize,
    /// Upper bound for one translation request, including its retries.
    pub translation_timeout_secs: u64,
    /// Run the compile probe and mechanical fixes on translated code.
    pub fix_errors: bool,
    /// Escalate still-failing code to a model repair round.
    pub use_ai_fix: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_retry_attempts: 3,
            concurrent_limit: 4,
            translation_timeout_secs: 1800,
            fix_errors: true,
            use_ai_fix: true,
        }
    }
}

#[derive(Deserialize, Default)]
struct AppConfig {
    #[serde(default)]
    pipeline: PipelineConfig,
}

pub fn get_config() -> Result<PipelineConfig, config::ConfigError> {
    // Try multiple possible paths for the config file
    let possible_paths = [
        "config/config.toml",       // From project root
        "../config/config.toml",    // From crates subdirectory
        "../../config/config.toml", // From deeper nested directories
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

    Ok(config.pipeline)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_sane() {
        let cfg = PipelineConfig::default();
        assert!(cfg.max_retry_attempts >= 1);
        assert!(cfg.concurrent_limit >= 1);
        assert!(cfg.fix_errors);
    }

    #[test]
    fn test_missing_pipeline_table_uses_defaults() {
        let cfg: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.pipeline.max_retry_attempts, 3);
    }
}
