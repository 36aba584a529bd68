//! Pipeline coordinator
//!
//! Runs the stages in order and owns the short-circuit policy:
//!
//! ```text
//! Dividing ──► Executing ──► Synthesizing ──► Done
//!    │             │               │
//!    └─────────────┴───────────────┴──────► Failed
//! ```
//!
//! Workers are started together once division completes and joined with a
//! full barrier before synthesis begins. `Done` and `Failed` are terminal.

use futures::future::join_all;
use std::fmt;
use std::sync::Arc;

use crate::gateway::LlmGateway;
use crate::types::{DivisionResult, SubtaskResults, SynthesisReport, Task};
use crate::{log_info, log_warn, ui};

use super::{PipelineConfig, Synthesizer, SubtaskWorker, TaskDivider};

/// Where a run currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Dividing,
    Executing,
    Synthesizing,
    Done,
    Failed,
}

impl PipelineState {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Dividing => "dividing",
            Self::Executing => "executing",
            Self::Synthesizing => "synthesizing",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// A stage produced nothing usable; the run stops here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StageFailure {
    #[error("Task division produced no result")]
    Division,
    #[error("Every subtask worker failed")]
    NoSubtaskResults,
    #[error("Synthesis produced no result")]
    Synthesis,
}

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    Done(SynthesisReport),
    Failed(StageFailure),
}

/// Everything observable about one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineRun {
    /// States entered, in order, starting with `Dividing`
    pub states: Vec<PipelineState>,
    pub division: Option<DivisionResult>,
    /// Number of workers started after division
    pub launched_workers: usize,
    /// Successful worker records keyed by their original slot
    pub subtask_results: SubtaskResults,
    pub outcome: PipelineOutcome,
}

impl PipelineRun {
    fn new() -> Self {
        Self {
            states: vec![PipelineState::Dividing],
            division: None,
            launched_workers: 0,
            subtask_results: SubtaskResults::new(),
            outcome: PipelineOutcome::Failed(StageFailure::Division),
        }
    }

    pub fn state(&self) -> PipelineState {
        self.states
            .last()
            .copied()
            .unwrap_or(PipelineState::Dividing)
    }

    pub fn report(&self) -> Option<&SynthesisReport> {
        match &self.outcome {
            PipelineOutcome::Done(report) => Some(report),
            PipelineOutcome::Failed(_) => None,
        }
    }

    fn enter(&mut self, next: PipelineState) {
        debug_assert!(
            !self.state().is_terminal(),
            "no transition out of {}",
            self.state()
        );
        log_info!("Pipeline: {} -> {}", self.state(), next);
        self.states.push(next);
    }

    fn fail(mut self, failure: StageFailure) -> Self {
        self.enter(PipelineState::Failed);
        self.outcome = PipelineOutcome::Failed(failure);
        self
    }
}

/// Owns the gateway and the immutable pipeline settings.
pub struct Orchestrator {
    gateway: Arc<dyn LlmGateway>,
    config: PipelineConfig,
}

impl Orchestrator {
    pub fn new(gateway: Arc<dyn LlmGateway>, config: PipelineConfig) -> Self {
        Self { gateway, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the whole pipeline for `task`. Never errors: stage failures are
    /// reported through [`PipelineRun::outcome`].
    pub async fn run(&self, task: &Task) -> PipelineRun {
        let gateway = self.gateway.as_ref();
        let mut run = PipelineRun::new();

        let Some(division) = TaskDivider::new(gateway, &self.config).divide(task).await else {
            return run.fail(StageFailure::Division);
        };

        run.enter(PipelineState::Executing);
        run.subtask_results = self.execute_all(&division, task).await;
        run.launched_workers = division.slots().len();
        run.division = Some(division);

        if run.subtask_results.is_empty() && run.launched_workers > 0 {
            log_warn!("All {} subtask workers failed", run.launched_workers);
            if self.config.require_subtask_results {
                return run.fail(StageFailure::NoSubtaskResults);
            }
            ui::print_warning("⚠️  No subtask produced a result; synthesizing anyway");
        }

        run.enter(PipelineState::Synthesizing);
        let Some(report) = Synthesizer::new(gateway, &self.config)
            .synthesize(&run.subtask_results)
            .await
        else {
            return run.fail(StageFailure::Synthesis);
        };

        run.enter(PipelineState::Done);
        run.outcome = PipelineOutcome::Done(report);
        run
    }

    /// One worker per present slot, all awaited before returning. Failed
    /// workers are left out of the result.
    async fn execute_all(&self, division: &DivisionResult, task: &Task) -> SubtaskResults {
        let slots = division.slots();
        let worker = SubtaskWorker::new(self.gateway.as_ref(), &self.config);

        let spinner = ui::create_spinner(&format!(
            "Waiting for {} subtask workers...",
            slots.len()
        ));
        let settled = join_all(slots.into_iter().map(|(slot, description)| {
            let worker = &worker;
            async move { (slot, worker.execute(description, task).await) }
        }))
        .await;
        spinner.finish_and_clear();

        let mut results = SubtaskResults::new();
        for (slot, record) in settled {
            match record {
                Some(record) => {
                    results.insert(slot, record);
                }
                None => log_warn!("Subtask {} failed and is excluded from synthesis", slot),
            }
        }
        log_info!(
            "{} of {} subtasks completed",
            results.len(),
            division.slots().len()
        );
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(PipelineState::Done.is_terminal());
        assert!(PipelineState::Failed.is_terminal());
        assert!(!PipelineState::Executing.is_terminal());
    }

    #[test]
    fn test_failed_run_has_no_report() {
        let run = PipelineRun::new().fail(StageFailure::Division);
        assert_eq!(run.state(), PipelineState::Failed);
        assert_eq!(
            run.states,
            vec![PipelineState::Dividing, PipelineState::Failed]
        );
        assert!(run.report().is_none());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "no transition out of failed")]
    fn test_terminal_state_is_absorbing() {
        let mut run = PipelineRun::new().fail(StageFailure::Division);
        run.enter(PipelineState::Executing);
    }
}
