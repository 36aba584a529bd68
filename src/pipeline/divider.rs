use crate::extract::extract;
use crate::gateway::{ChatMessage, LlmGateway, dispatch};
use crate::log_debug;
use crate::types::{DivisionResult, Task};

use super::{PipelineConfig, division_schema};

const PURPOSE: &str = "Dividing main task into subtasks";

/// Splits the task into up to three complementary sub-tasks.
pub struct TaskDivider<'a> {
    gateway: &'a dyn LlmGateway,
    config: &'a PipelineConfig,
}

impl<'a> TaskDivider<'a> {
    pub fn new(gateway: &'a dyn LlmGateway, config: &'a PipelineConfig) -> Self {
        Self { gateway, config }
    }

    /// `None` when the call fails or the response has no usable division
    /// field; blank slots do not count. A division with missing slots is
    /// still returned.
    pub async fn divide(&self, task: &Task) -> Option<DivisionResult> {
        let conversation = [ChatMessage::user(
            self.config.prompts.division(task.as_str()),
        )];
        let raw = dispatch(self.gateway, &conversation, &self.config.main_model, PURPOSE)
            .await
            .ok()?;

        let division = DivisionResult::from_fields(extract(&raw, &division_schema()));
        if division.slots().is_empty() && division.reasoning.is_none() {
            log_debug!("Division response had no usable fields");
            return None;
        }

        log_debug!(
            "Division produced {} subtasks (reasoning: {})",
            division.slots().len(),
            division.reasoning.as_deref().unwrap_or("none")
        );
        Some(division)
    }
}
