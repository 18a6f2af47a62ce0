use anyhow::Result;
use anyhow::anyhow;
use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::pkg_config::{OpenAIConfig, get_config};

const PLACEHOLDER_KEYS: &[&str] = &["your_openai_api_key_here", "sk-your-key-here"];
const DEFAULT_TIMEOUT_SECS: u64 = 600;

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Deserialize)]
struct MessageContent {
    content: String,
}

/// Chat-completion client for any OpenAI-compatible endpoint. The base URL
/// from the config decides the actual backend (OpenAI, DashScope
/// compatible-mode, a local server).
pub struct OpenAIProvider {
    client: reqwest::Client,
    config: OpenAIConfig,
}

fn is_placeholder_key(api_key: &str) -> bool {
    api_key.is_empty() || PLACEHOLDER_KEYS.contains(&api_key)
}

impl OpenAIProvider {
    pub fn new(openai_config: OpenAIConfig) -> Result<Self> {
        info!(
            "Creating OpenAI provider with model: {}",
            openai_config.model
        );

        if is_placeholder_key(&openai_config.api_key) {
            return Err(anyhow!(
                "Invalid OpenAI API key. Please set a valid API key in config.toml"
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            client,
            config: openai_config,
        })
    }

    pub fn init_with_config() -> Result<Self> {
        debug!("Initializing OpenAI provider from config");

        let config = match get_config() {
            Ok(config) => config,
            Err(err) => {
                error!("Failed to get config: {}", err);
                return Err(anyhow!("Can't get config with error: {}", err));
            }
        };

        Self::new(config.llm.openai)
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    /// Send one system+user exchange and return the completion text.
    pub async fn chat_with_prompt(&self, message: &str, system_prompt: &str) -> Result<String> {
        info!("Starting OpenAI chat with prompt request");
        debug!("Message length: {} chars", message.len());
        debug!("System prompt length: {} chars", system_prompt.len());

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: system_prompt.to_string(),
                },
                Message {
                    role: "user".to_string(),
                    content: message.to_string(),
                },
            ],
            stream: false,
            temperature: Some(0.1),
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| anyhow!("OpenAI chat request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("OpenAI chat failed with status {}: {}", status, body);
            return Err(anyhow!(
                "OpenAI chat request failed with status {}: {}",
                status,
                body
            ));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| anyhow!("error decoding response body: {}", e))?;

        let text = parsed
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .ok_or_else(|| anyhow!("OpenAI response contained no choices"))?;

        info!(
            "OpenAI chat completed successfully, response length: {} chars",
            text.len()
        );
        Ok(text)
    }

    pub async fn chat_with_prompt_static(
        messages: Vec<String>,
        system_prompt: String,
    ) -> Result<String> {
        info!(
            "Processing static chat with prompt request, {} messages",
            messages.len()
        );

        let provider = Self::init_with_config().map_err(|e| {
            error!("Failed to initialize OpenAI provider: {}", e);
            e
        })?;

        let combined_message = messages.join("\n\n");
        debug!("Combined message length: {} chars", combined_message.len());

        provider
            .chat_with_prompt(&combined_message, &system_prompt)
            .await
    }

    /// Validate the OpenAI configuration without making an API call.
    pub fn validate_config() -> Result<()> {
        info!("Validating OpenAI configuration");

        let config = get_config().map_err(|e| anyhow!("Config validation failed: {}", e))?;

        let api_key = &config.llm.openai.api_key;
        let model = &config.llm.openai.model;

        if is_placeholder_key(api_key) {
            error!("Invalid API key in configuration");
            return Err(anyhow!(
                "Invalid OpenAI API key. Please set a valid API key in config.toml"
            ));
        }

        if model.is_empty() {
            error!("Empty model name in configuration");
            return Err(anyhow!("OpenAI model name cannot be empty"));
        }

        info!("OpenAI configuration validation passed");
        Ok(())
    }

    /// Test the connection with a trivial request.
    pub async fn test_connection() -> Result<()> {
        info!("Testing OpenAI connection");

        let provider = Self::init_with_config()?;
        match provider
            .chat_with_prompt(
                "Hello, this is a connection test. Please respond with 'OK'.",
                "You are a connectivity probe.",
            )
            .await
        {
            Ok(text) => {
                info!("OpenAI connection test successful, response: {}", text);
                Ok(())
            }
            Err(e) => {
                error!("OpenAI connection test failed: {}", e);
                Err(anyhow!("OpenAI connection test failed: {}", e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_key_detection() {
        assert!(is_placeholder_key(""));
        assert!(is_placeholder_key("your_openai_api_key_here"));
        assert!(!is_placeholder_key("sk-real-key"));
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let provider = OpenAIProvider::new(OpenAIConfig {
            api_key: "sk-test".to_string(),
            base_url: "https://dashscope.aliyuncs.com/compatible-mode/v1/".to_string(),
            model: "qwq-32b".to_string(),
        })
        .unwrap();
        assert_eq!(
            provider.endpoint(),
            "https://dashscope.aliyuncs.com/compatible-mode/v1/chat/completions"
        );
    }

    #[test]
    fn test_new_rejects_placeholder_key() {
        let result = OpenAIProvider::new(OpenAIConfig {
            api_key: String::new(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
        });
        assert!(result.is_err());
    }
}
