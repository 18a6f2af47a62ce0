use anyhow::Result;
use log::{debug, error, info, warn};
use std::time::Duration;
use tokio::time::sleep;

pub mod openai_provider;
pub mod pkg_config;

pub use openai_provider::OpenAIProvider;

const DEFAULT_MAX_RETRIES: usize = 3;

/// Make an LLM request with a system prompt, using the default retry count.
pub async fn llm_request_with_prompt(messages: Vec<String>, prompt: String) -> Result<String> {
    llm_request_with_prompt_and_retry(messages, prompt, DEFAULT_MAX_RETRIES).await
}

/// Make an LLM request with a system prompt and a specified retry count.
/// Retryable failures back off exponentially between attempts.
pub async fn llm_request_with_prompt_and_retry(
    messages: Vec<String>,
    prompt: String,
    max_retries: usize,
) -> Result<String> {
    info!(
        "Starting LLM request with prompt, {} messages, prompt length: {} chars",
        messages.len(),
        prompt.len()
    );

    let config = match pkg_config::get_config() {
        Ok(config) => {
            debug!("Using provider: {}", config.provider);
            config
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(anyhow::anyhow!("Configuration error: {}", e));
        }
    };

    let mut last_error = None;

    for attempt in 1..=max_retries {
        info!("LLM request attempt {} of {}", attempt, max_retries);

        let result = match config.provider.as_str() {
            "openai" => {
                OpenAIProvider::chat_with_prompt_static(messages.clone(), prompt.clone()).await
            }
            _ => {
                error!("Invalid provider specified: {}", config.provider);
                return Err(anyhow::anyhow!(
                    "Invalid provider: {}. Supported providers: openai",
                    config.provider
                ));
            }
        };

        match result {
            Ok(response) => {
                info!(
                    "LLM request completed successfully on attempt {}, response length: {} chars",
                    attempt,
                    response.len()
                );
                return Ok(response);
            }
            Err(e) => {
                error!(
                    "LLM request attempt {} failed with provider {}: {}",
                    attempt, config.provider, e
                );
                last_error = Some(e);

                if attempt < max_retries && is_retryable_error(last_error.as_ref().unwrap()) {
                    let delay_seconds = 2_u64.pow((attempt - 1) as u32);
                    warn!(
                        "Retrying in {} seconds (attempt {} of {})",
                        delay_seconds, attempt, max_retries
                    );
                    sleep(Duration::from_secs(delay_seconds)).await;
                    continue;
                } else {
                    break;
                }
            }
        }
    }

    let final_error = last_error.unwrap();
    error!(
        "All {} retry attempts failed with provider {}: {}",
        max_retries, config.provider, final_error
    );
    Err(anyhow::anyhow!(
        "LLM request failed after {} attempts with {}: {}",
        max_retries,
        config.provider,
        final_error
    ))
}

/// Check whether an error is retryable (network issues, timeouts, rate
/// limits, transient server errors).
fn is_retryable_error(error: &anyhow::Error) -> bool {
    let error_str = error.to_string().to_lowercase();

    error_str.contains("timeout")
        || error_str.contains("connection")
        || error_str.contains("network")
        || error_str.contains("rate limit")
        || error_str.contains("429")
        || error_str.contains("503")
        || error_str.contains("502")
        || error_str.contains("500")
        || error_str.contains("error decoding response body")
        || error_str.contains("temporary failure")
        || error_str.contains("service unavailable")
}

/// Validate the current LLM configuration without making an API call.
pub fn validate_llm_config() -> Result<()> {
    info!("Validating LLM configuration");

    let config =
        pkg_config::get_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    match config.provider.as_str() {
        "openai" => OpenAIProvider::validate_config(),
        _ => {
            error!("Invalid provider in config: {}", config.provider);
            Err(anyhow::anyhow!(
                "Invalid provider: {}. Supported providers: openai",
                config.provider
            ))
        }
    }
}

/// Test the connection to the configured LLM provider.
pub async fn test_llm_connection() -> Result<()> {
    info!("Testing LLM provider connection");

    let config =
        pkg_config::get_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    match config.provider.as_str() {
        "openai" => OpenAIProvider::test_connection().await,
        provider => {
            warn!("Connection test not implemented for provider: {}", provider);
            Ok(())
        }
    }
}

/// Diagnose common configuration issues and return a readable report.
pub fn diagnose_config_issues() -> Result<String> {
    info!("Running configuration diagnostics");

    let mut diagnostics = Vec::new();

    let config_paths = [
        "config/config.toml",
        "../config/config.toml",
        "../../config/config.toml",
    ];

    let mut config_found = false;
    for path in &config_paths {
        if std::path::Path::new(path).exists() {
            config_found = true;
            diagnostics.push(format!("✓ Configuration file found at: {}", path));
            break;
        }
    }

    if !config_found {
        diagnostics.push(
            "✗ No configuration file found. Please copy config/config.default.toml to config/config.toml"
                .to_string(),
        );
        return Ok(diagnostics.join("\n"));
    }

    match pkg_config::get_config() {
        Ok(config) => {
            diagnostics.push("✓ Configuration file loaded successfully".to_string());
            diagnostics.push(format!("✓ Using provider: {}", config.provider));

            match config.provider.as_str() {
                "openai" => {
                    let api_key = &config.llm.openai.api_key;
                    if api_key.is_empty() || api_key == "your_openai_api_key_here" {
                        diagnostics.push(
                            "✗ OpenAI API key not configured. Please set a valid API key in config.toml"
                                .to_string(),
                        );
                    } else {
                        diagnostics.push("✓ OpenAI API key configured".to_string());
                    }
                    diagnostics.push(format!("✓ OpenAI model: {}", config.llm.openai.model));
                    diagnostics.push(format!("✓ Base URL: {}", config.llm.openai.base_url));
                }
                _ => {
                    diagnostics.push(format!("✗ Unknown provider: {}", config.provider));
                }
            }

            if let Some(request) = &config.request {
                diagnostics.push(format!(
                    "✓ Request timeout: {}s",
                    request.timeout_secs.unwrap_or(600)
                ));
                diagnostics.push(format!(
                    "✓ Max retries: {}",
                    request.max_retries.unwrap_or(DEFAULT_MAX_RETRIES)
                ));
            } else {
                diagnostics.push("ℹ Using default request configuration".to_string());
            }
        }
        Err(e) => {
            diagnostics.push(format!("✗ Failed to load configuration: {}", e));
            diagnostics.push(
                "  Please check that config/config.toml exists and is properly formatted"
                    .to_string(),
            );
        }
    }

    match validate_llm_config() {
        Ok(_) => diagnostics.push("✓ Configuration validation passed".to_string()),
        Err(e) => diagnostics.push(format!("✗ Configuration validation failed: {}", e)),
    }

    Ok(diagnostics.join("\n"))
}

/// Retry configuration from the config file, with env-style defaults.
pub fn get_retry_config() -> (usize, u64) {
    let max_retries = pkg_config::get_config()
        .ok()
        .and_then(|c| c.request.and_then(|r| r.max_retries))
        .unwrap_or(DEFAULT_MAX_RETRIES);

    let base_delay = 2;
    (max_retries, base_delay)
}
