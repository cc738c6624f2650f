use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::llm::prompt::{self, PromptConfig};
use crate::llm::{Difficulty, GenerateRequest, LlmManager, LlmResult};
use crate::types::{Locale, WordWithHints};

/// Request for a fresh batch of words
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WordRequest {
    pub category: String,
    pub language: Locale,
    pub count: usize,
}

/// Source of freshly generated words
#[async_trait]
pub trait WordGenerator: Send + Sync {
    async fn generate_words(&self, request: &WordRequest) -> LlmResult<Vec<WordWithHints>>;
}

/// Generates words through the configured LLM providers
pub struct LlmWordGenerator {
    manager: LlmManager,
    difficulty: Difficulty,
    timeout: Duration,
    max_tokens: u32,
}

impl LlmWordGenerator {
    pub fn new(manager: LlmManager, difficulty: Difficulty, timeout: Duration, max_tokens: u32) -> Self {
        Self {
            manager,
            difficulty,
            timeout,
            max_tokens,
        }
    }
}

#[async_trait]
impl WordGenerator for LlmWordGenerator {
    async fn generate_words(&self, request: &WordRequest) -> LlmResult<Vec<WordWithHints>> {
        let prompt = prompt::create_prompt(&PromptConfig {
            category: request.category.clone(),
            language: request.language,
            count: request.count,
            difficulty: self.difficulty,
        });

        let llm_request = GenerateRequest {
            prompt,
            system_prompt: Some(prompt::SYSTEM_PROMPT.to_string()),
            max_tokens: Some(self.max_tokens),
            timeout: self.timeout,
            json_output: true,
        };

        let count = request.count;
        self.manager
            .generate_first(llm_request, move |response| {
                prompt::parse_response(&response.text, count)
            })
            .await
    }
}
