use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use crate::gateway::LlmGateway;
use crate::pipeline::{Orchestrator, PipelineConfig, PipelineOutcome, PipelineRun};
use crate::report::write_report;
use crate::types::Task;
use crate::ui;

/// Run the pipeline and write the report to `output_path` if it completes.
/// Nothing is written when division or synthesis fails.
pub async fn handle_run(
    task: &Task,
    config: PipelineConfig,
    gateway: Arc<dyn LlmGateway>,
    output_path: &Path,
) -> Result<PipelineRun> {
    ui::print_success("🚀 Starting task execution...");

    let orchestrator = Orchestrator::new(gateway, config);
    let run = orchestrator.run(task).await;

    match &run.outcome {
        PipelineOutcome::Done(report) => {
            write_report(report, output_path)?;
            if let Some(summary) = &report.executive_summary {
                ui::print_section("Executive summary", summary);
            }
            ui::print_success(&format!(
                "✅ Task completed! Results saved to {}",
                output_path.display()
            ));
        }
        PipelineOutcome::Failed(failure) => {
            ui::print_error(&format!("❌ {failure}. No report was written."));
        }
    }

    Ok(run)
}
