pub mod anthropic;

use async_trait::async_trait;
use std::error::Error as StdError;
use std::sync::Arc;
use thiserror::Error;
use super::LlmConfig;
use self::anthropic::AnthropicChatClient;

#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub response: String,
}

/// Every way an assistant request can fail. The widget treats them all alike.
#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("assistant request failed: {0}")] Network(String),
    #[error("assistant request failed with status {status}: {message}")] Status {
        status: u16,
        message: String,
    },
    #[error("assistant response could not be parsed: {0}")] Parse(String),
}

impl From<reqwest::Error> for AssistantError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AssistantError::Parse(err.to_string())
        } else {
            AssistantError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AssistantError {
    fn from(err: serde_json::Error) -> Self {
        AssistantError::Parse(err.to_string())
    }
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<CompletionResponse, AssistantError>;

    fn get_model(&self) -> String;
    fn get_base_url(&self) -> Option<String>;
}

pub fn new_client(
    config: &LlmConfig
) -> Result<Arc<dyn ChatClient>, Box<dyn StdError + Send + Sync>> {
    let client = AnthropicChatClient::from_config(config)?;
    Ok(Arc::new(client))
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned outcomes in order and records every prompt it receives.
    pub struct ScriptedChatClient {
        outcomes: Mutex<VecDeque<Result<String, AssistantError>>>,
        pub prompts: Mutex<Vec<String>>,
    }

    impl ScriptedChatClient {
        pub fn new(outcomes: Vec<Result<String, AssistantError>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn failing() -> Self {
            Self::new(vec![Err(AssistantError::Network("connection refused".to_string()))])
        }
    }

    #[async_trait]
    impl ChatClient for ScriptedChatClient {
        async fn complete(&self, prompt: &str) -> Result<CompletionResponse, AssistantError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            let next = self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(AssistantError::Network("no scripted outcome".to_string())));
            next.map(|response| CompletionResponse { response })
        }

        fn get_model(&self) -> String {
            "scripted".to_string()
        }

        fn get_base_url(&self) -> Option<String> {
            None
        }
    }
}
