// AI implementation using OpenAI
//
// This is the infrastructure implementation of BaseAI. What to prompt for
// (industry context, answer format) lives in the questions domain.

use anyhow::{Context, Result};
use async_trait::async_trait;
use rig::completion::Prompt;
use rig::providers::openai;

use super::BaseAI;

/// OpenAI implementation of answer generation
#[derive(Clone)]
pub struct OpenAIClient {
    client: openai::Client,
    model: String,
}

impl OpenAIClient {
    pub fn new(api_key: &str, model: String) -> Self {
        Self {
            client: openai::Client::new(api_key),
            model,
        }
    }
}

#[async_trait]
impl BaseAI for OpenAIClient {
    async fn complete(&self, system_context: &str, user_text: &str) -> Result<String> {
        let agent = self
            .client
            .agent(&self.model)
            .preamble(system_context)
            .max_tokens(1024)
            .build();

        tracing::info!(model = %self.model, "Calling OpenAI API");

        let response = agent
            .prompt(user_text)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    model = %self.model,
                    "OpenAI API call failed"
                );
                e
            })
            .context("Failed to call OpenAI API")?;

        tracing::info!(
            response_length = response.len(),
            model = %self.model,
            "OpenAI API response received"
        );

        Ok(response)
    }
}
