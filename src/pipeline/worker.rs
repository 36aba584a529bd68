use crate::extract::extract;
use crate::gateway::{ChatMessage, LlmGateway, dispatch};
use crate::types::{SubtaskRecord, Task};

use super::{PipelineConfig, subtask_schema};

/// Characters of the description shown in the progress notice
const PURPOSE_PREVIEW_CHARS: usize = 50;

/// Analyzes one facet of the task. Instances share nothing but the gateway
/// and the immutable task.
pub struct SubtaskWorker<'a> {
    gateway: &'a dyn LlmGateway,
    config: &'a PipelineConfig,
}

impl<'a> SubtaskWorker<'a> {
    pub fn new(gateway: &'a dyn LlmGateway, config: &'a PipelineConfig) -> Self {
        Self { gateway, config }
    }

    /// `None` only if the gateway call fails; a record with missing fields is
    /// a valid result.
    pub async fn execute(&self, description: &str, task: &Task) -> Option<SubtaskRecord> {
        let conversation = [ChatMessage::user(
            self.config.prompts.subtask(description, task.as_str()),
        )];
        let purpose = format!(
            "Executing subtask: {}",
            description
                .chars()
                .take(PURPOSE_PREVIEW_CHARS)
                .collect::<String>()
        );

        let raw = dispatch(
            self.gateway,
            &conversation,
            &self.config.subtask_model,
            &purpose,
        )
        .await
        .ok()?;

        Some(SubtaskRecord::from_fields(extract(&raw, &subtask_schema())))
    }
}
