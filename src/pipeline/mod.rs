//! Divide → execute in parallel → synthesize
//!
//! Each stage makes exactly one gateway call per unit of work and turns the
//! raw completion into a typed record through [`crate::extract`]. Stages never
//! propagate errors: a failed call becomes `None`, and only the
//! [`Orchestrator`] decides whether that ends the run.

pub mod divider;
pub mod orchestrator;
pub mod synthesizer;
pub mod worker;

pub use divider::TaskDivider;
pub use orchestrator::{Orchestrator, PipelineOutcome, PipelineRun, PipelineState, StageFailure};
pub use synthesizer::Synthesizer;
pub use worker::SubtaskWorker;

use crate::extract::ExtractionSchema;
use crate::prompts::PromptTemplates;
use crate::types::SubtaskSlot;

/// Everything the orchestrator needs besides the gateway. Built once from
/// [`crate::config::Config`] and never changed during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Model for division and synthesis
    pub main_model: String,
    /// Model for subtask workers
    pub subtask_model: String,
    pub prompts: PromptTemplates,
    /// Treat "every worker failed" as a stage failure
    pub require_subtask_results: bool,
}

impl PipelineConfig {
    /// Default templates, one model for every stage
    pub fn with_model(model: &str) -> Self {
        Self {
            main_model: model.to_string(),
            subtask_model: model.to_string(),
            prompts: PromptTemplates::default(),
            require_subtask_results: false,
        }
    }
}

/// `task1..task3` renamed to `subtask_1..subtask_3`, plus `reasoning`
pub fn division_schema() -> ExtractionSchema {
    ExtractionSchema::ordinal(
        "division",
        "task",
        "subtask",
        SubtaskSlot::ALL.len(),
        &["reasoning"],
    )
}

pub fn subtask_schema() -> ExtractionSchema {
    ExtractionSchema::literal(
        "subtask",
        &["key_findings", "supporting_evidence", "recommendations"],
    )
}

pub fn synthesis_schema() -> ExtractionSchema {
    ExtractionSchema::literal(
        "synthesis",
        &[
            "executive_summary",
            "detailed_analysis",
            "future_implications",
            "recommendations",
        ],
    )
}
