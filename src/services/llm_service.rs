//! LLM service - inference driver
//!
//! Sends one prompt to the configured model and returns the decoded text.
//!
//! ## Stack
//! - `async-openai` against any OpenAI-compatible endpoint (vLLM, TGI, Ollama…),
//!   which is where the pretrained code model is actually loaded and run
//! - tokenizer concerns such as a missing pad token stay with that runtime

use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AppError, LlmError};

/// Anything that turns a prompt into generated text
///
/// The code generation workflow only depends on this, so it can run against a
/// canned response in tests.
pub trait TextGenerator {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// LLM service
pub struct LlmService {
    client: Client<OpenAIConfig>,
    model_name: String,
    token_length: u32,
    temperature: f32,
    system_message: Option<String>,
}

impl LlmService {
    /// Create a new LLM service
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
            token_length: config.token_length,
            temperature: config.temperature,
            system_message: None,
        }
    }

    pub fn with_system_message(mut self, system_message: impl Into<String>) -> Self {
        self.system_message = Some(system_message.into());
        self
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Run one generation for `prompt` and report how long it took
    ///
    /// # Returns
    /// The generated text, trimmed
    pub async fn run_llm_inference(&self, prompt: &str) -> Result<String> {
        info!(
            "🤖 Running inference on {} (max {} tokens)",
            self.model_name, self.token_length
        );
        debug!("prompt length: {} chars", prompt.len());

        let mut messages = Vec::new();

        if let Some(sys_msg) = &self.system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg.as_str())
                .build()?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(self.temperature)
            .max_tokens(self.token_length)
            .build()?;

        let start_time = Instant::now();

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API call failed: {}", e);
            AppError::llm_api_failed(&self.model_name, e)
        })?;

        info!(
            "⏱️ Time taken: {:.2} minutes",
            start_time.elapsed().as_secs_f64() / 60.0
        );

        let choice = response.choices.first().ok_or_else(|| {
            AppError::from(LlmError::EmptyResponse {
                model: self.model_name.clone(),
            })
        })?;

        let content = choice.message.content.clone().ok_or_else(|| {
            AppError::from(LlmError::EmptyContent {
                model: self.model_name.clone(),
            })
        })?;

        Ok(content.trim().to_string())
    }
}

impl TextGenerator for LlmService {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.run_llm_inference(prompt).await
    }
}

/// Persist the raw generation output for later inspection
pub async fn store_llm_output(output: &str, output_file: &Path) -> Result<()> {
    tokio::fs::write(output_file, output)
        .await
        .map_err(|e| AppError::file_write_failed(output_file, e))?;
    debug!("raw LLM output stored in {}", output_file.display());
    Ok(())
}

/// Read back output stored by [`store_llm_output`]
pub async fn read_llm_output(output_file: &Path) -> Result<String> {
    let output = tokio::fs::read_to_string(output_file)
        .await
        .map_err(|e| AppError::file_read_failed(output_file, e))?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_service() -> LlmService {
        let config = Config {
            llm_api_key: "test-key".to_string(),
            llm_api_base_url: "http://localhost:8000/v1".to_string(),
            ..Config::default()
        };
        LlmService::new(&config)
    }

    #[test]
    fn test_service_takes_model_from_config() {
        let service = create_test_service();
        assert_eq!(service.model_name(), "deepseek-ai/deepseek-coder-1.3b-instruct");
        assert_eq!(service.token_length, 1024);
    }

    #[tokio::test]
    async fn test_store_and_read_llm_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("llm_output.txt");
        let output = "python code snippet #1:\nprint(3.14)\n";

        store_llm_output(output, &path).await.unwrap();
        assert_eq!(read_llm_output(&path).await.unwrap(), output);
    }

    /// Needs a running OpenAI-compatible server:
    /// ```bash
    /// LLM_API_BASE_URL=http://localhost:8000/v1 cargo test test_inference_live -- --ignored --nocapture
    /// ```
    #[tokio::test]
    #[ignore]
    async fn test_inference_live() {
        let _ = tracing_subscriber::fmt::try_init();

        let config = Config::from_env().unwrap();
        let service = LlmService::new(&config);

        let result = service
            .run_llm_inference("Write a Python function returning 3.14.")
            .await;

        match result {
            Ok(response) => {
                println!("\n========== LLM response ==========\n{}\n", response);
                assert!(!response.is_empty());
            }
            Err(e) => panic!("inference failed: {}", e),
        }
    }
}
