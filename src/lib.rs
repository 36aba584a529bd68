//! trio - divide a task, analyze it in parallel, synthesize one report
//!
//! An LLM splits a natural-language task into three complementary sub-tasks,
//! three independent workers analyze them concurrently, and a final call
//! combines their findings into a structured report. LLM output is read back
//! through a small tag-delimited extraction layer that tolerates missing or
//! malformed fields.

#![allow(clippy::uninlined_format_args)] // Style preference
#![allow(clippy::future_not_send)] // From Rig framework internals, can't fix

pub mod cli;
pub mod commands;
pub mod config;
pub mod extract;
pub mod gateway;
pub mod logger;
pub mod pipeline;
pub mod prompts;
pub mod providers;
pub mod report;
pub mod types;
pub mod ui;

pub use config::Config;
pub use extract::{ExtractedFields, ExtractionSchema, extract};
pub use gateway::{ChatMessage, LlmGateway, Role, TransportError};
pub use pipeline::{Orchestrator, PipelineConfig, PipelineOutcome, PipelineRun, PipelineState};
pub use providers::Provider;
pub use types::{DivisionResult, SubtaskRecord, SubtaskSlot, SynthesisReport, Task};
