use crate::extract::extract;
use crate::gateway::{ChatMessage, LlmGateway, dispatch};
use crate::types::{SubtaskResults, SynthesisReport};
use crate::{log_error, ui};

use super::{PipelineConfig, synthesis_schema};

const PURPOSE: &str = "Synthesizing final results";

/// Combines the completed subtask records into the final report.
pub struct Synthesizer<'a> {
    gateway: &'a dyn LlmGateway,
    config: &'a PipelineConfig,
}

impl<'a> Synthesizer<'a> {
    pub fn new(gateway: &'a dyn LlmGateway, config: &'a PipelineConfig) -> Self {
        Self { gateway, config }
    }

    /// Records are embedded as pretty-printed JSON, ordered by slot. `None`
    /// only if the gateway call fails.
    pub async fn synthesize(&self, records: &SubtaskResults) -> Option<SynthesisReport> {
        let results_json = match serde_json::to_string_pretty(records) {
            Ok(json) => json,
            Err(e) => {
                ui::print_error(&format!("Error serializing subtask results: {e}"));
                log_error!("Failed to serialize subtask results: {}", e);
                return None;
            }
        };

        let conversation = [ChatMessage::user(
            self.config.prompts.synthesis(&results_json),
        )];
        let raw = dispatch(self.gateway, &conversation, &self.config.main_model, PURPOSE)
            .await
            .ok()?;

        Some(SynthesisReport::from_fields(extract(&raw, &synthesis_schema())))
    }
}
