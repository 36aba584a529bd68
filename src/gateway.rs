//! LLM gateway
//!
//! The narrow boundary between the pipeline and an inference service: one
//! conversation in, one completion out. Stages go through [`dispatch`], which
//! adds the progress and error notices around the call.

use async_trait::async_trait;
use rig::client::builder::DynClientBuilder;
use rig::completion::{Chat, Message};
use serde::{Deserialize, Serialize};

use crate::providers::{Provider, ProviderError};
use crate::{log_debug, ui};

// Anthropic rejects requests without an explicit limit
const DEFAULT_MAX_TOKENS: u64 = 8192;

/// Speaker of one conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One turn of a conversation sent to the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// The inference call failed. The cause is passed through unclassified.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{cause}")]
pub struct TransportError {
    pub cause: String,
}

impl TransportError {
    pub fn new(cause: impl Into<String>) -> Self {
        Self {
            cause: cause.into(),
        }
    }
}

/// Request/response access to a language model. One round trip per call,
/// no retries.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    async fn complete(
        &self,
        conversation: &[ChatMessage],
        model: &str,
    ) -> Result<String, TransportError>;
}

/// Run one gateway call, announcing `purpose` before it and reporting a
/// failure after it.
pub async fn dispatch(
    gateway: &dyn LlmGateway,
    conversation: &[ChatMessage],
    model: &str,
    purpose: &str,
) -> Result<String, TransportError> {
    ui::print_info(&format!("🔄 {purpose}..."));
    log_debug!("{} ({} turns, model {})", purpose, conversation.len(), model);

    match gateway.complete(conversation, model).await {
        Ok(text) => {
            log_debug!("{}: received {} chars", purpose, text.len());
            Ok(text)
        }
        Err(e) => {
            ui::print_error(&format!("Error in {purpose}: {e}"));
            crate::log_error!("{} failed: {}", purpose, e);
            Err(e)
        }
    }
}

/// Gateway backed by rig's provider clients. Credentials come from the
/// provider's API key environment variable.
#[derive(Debug, Clone)]
pub struct RigGateway {
    provider: Provider,
}

impl RigGateway {
    pub fn new(provider: Provider) -> Result<Self, ProviderError> {
        if std::env::var(provider.api_key_env()).is_err() {
            return Err(ProviderError::MissingApiKey(
                provider.name().to_string(),
                provider.api_key_env(),
            ));
        }
        Ok(Self { provider })
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    /// Build the agent synchronously; `DynClientBuilder` is not Send
    fn build_agent(
        provider: Provider,
        model: &str,
        preamble: Option<&str>,
    ) -> Result<rig::agent::Agent<impl rig::completion::CompletionModel + 'static>, TransportError>
    {
        let client_builder = DynClientBuilder::new();
        let mut builder = client_builder
            .agent(provider.rig_name(), model)
            .map_err(|e| TransportError::new(format!("Failed to create agent: {e}")))?
            .max_tokens(DEFAULT_MAX_TOKENS);
        if let Some(preamble) = preamble {
            builder = builder.preamble(preamble);
        }
        Ok(builder.build())
    }
}

/// Split a conversation into rig's shape: system turns become the preamble,
/// the final user turn the prompt, everything between it the history.
fn split_conversation(
    conversation: &[ChatMessage],
) -> Result<(Option<String>, String, Vec<Message>), TransportError> {
    let Some((last, earlier)) = conversation.split_last() else {
        return Err(TransportError::new("Conversation is empty"));
    };
    if last.role != Role::User {
        return Err(TransportError::new("Conversation must end with a user turn"));
    }

    let system: Vec<&str> = earlier
        .iter()
        .filter(|m| m.role == Role::System)
        .map(|m| m.content.as_str())
        .collect();
    let preamble = (!system.is_empty()).then(|| system.join("\n\n"));

    let history = earlier
        .iter()
        .filter_map(|m| match m.role {
            Role::User => Some(Message::user(m.content.clone())),
            Role::Assistant => Some(Message::assistant(m.content.clone())),
            Role::System => None,
        })
        .collect();

    Ok((preamble, last.content.clone(), history))
}

#[async_trait]
impl LlmGateway for RigGateway {
    async fn complete(
        &self,
        conversation: &[ChatMessage],
        model: &str,
    ) -> Result<String, TransportError> {
        let (preamble, prompt, history) = split_conversation(conversation)?;
        let agent = Self::build_agent(self.provider, model, preamble.as_deref())?;

        tracing::info!(
            "Prompting {} model {} with {} history turns",
            self.provider,
            model,
            history.len()
        );
        agent
            .chat(prompt, history)
            .await
            .map_err(|e| TransportError::new(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_single_user_turn() {
        let (preamble, prompt, history) =
            split_conversation(&[ChatMessage::user("hello")]).expect("should split");
        assert_eq!(preamble, None);
        assert_eq!(prompt, "hello");
        assert!(history.is_empty());
    }

    #[test]
    fn test_split_with_system_and_history() {
        let conversation = vec![
            ChatMessage::system("be brief"),
            ChatMessage::user("first"),
            ChatMessage::assistant("reply"),
            ChatMessage::user("second"),
        ];
        let (preamble, prompt, history) = split_conversation(&conversation).expect("should split");
        assert_eq!(preamble.as_deref(), Some("be brief"));
        assert_eq!(prompt, "second");
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_split_rejects_bad_conversations() {
        assert!(split_conversation(&[]).is_err());
        assert!(split_conversation(&[ChatMessage::assistant("hi")]).is_err());
    }

    #[test]
    fn test_transport_error_display() {
        assert_eq!(TransportError::new("rate limited").to_string(), "rate limited");
    }
}
