//! Turns assembled prompts into model responses

use crate::error::Result;
use crate::llm::assembler::{AssembledPrompt, PromptKind};
use crate::llm::client::{ChatClient, ChatMessage};
use log::{debug, info};
use std::time::Instant;

pub struct ResponseGenerator {
    client: Box<dyn ChatClient>,
}

impl ResponseGenerator {
    pub fn new(client: Box<dyn ChatClient>) -> Self {
        Self { client }
    }

    pub fn model_name(&self) -> &str {
        self.client.model_name()
    }

    /// Sends `prompt` with `history` between its system and user turns and
    /// returns the completion unmodified. Cover letters are always sent
    /// without history.
    pub async fn generate(&self, prompt: &AssembledPrompt, history: &[ChatMessage]) -> Result<String> {
        let history: &[ChatMessage] = match prompt.kind {
            PromptKind::CoverLetter => &[],
            PromptKind::Qa => history,
        };
        let messages = prompt.messages(history);
        debug!("Sending {} messages to {}", messages.len(), self.model_name());

        let start_time = Instant::now();
        let text = self.client.complete(&messages).await?;
        info!(
            "Generated {:?} response ({} chars) in {:.2?}",
            prompt.kind,
            text.len(),
            start_time.elapsed()
        );
        Ok(text)
    }
}
