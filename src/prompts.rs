//! Instruction templates for the three pipeline stages.
//!
//! Each template carries one placeholder that is substituted at render time:
//! `{task}` for division, `{specific_role}` for subtask workers and
//! `{results}` for synthesis. The tag names requested by each template must
//! match the extraction schemas in `pipeline`.

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

pub const TASK_PLACEHOLDER: &str = "{task}";
pub const ROLE_PLACEHOLDER: &str = "{specific_role}";
pub const RESULTS_PLACEHOLDER: &str = "{results}";

pub const DEFAULT_DIVISION_TEMPLATE: &str = r"You are the task manager. Given this task:
'{task}'

Divide this task into exactly 3 distinct sub-tasks. Each sub-task should:
- Be clearly defined and focused
- Cover a different aspect of the main task
- Be designed to gather complementary information

Format your response using XML tags like this:
<task1>description of first subtask</task1>
<task2>description of second subtask</task2>
<task3>description of third subtask</task3>
<reasoning>explanation of why you divided the task this way</reasoning>";

pub const DEFAULT_SUBTASK_TEMPLATE: &str = r"You are a specialized AI agent. Your role is to focus on the following specific aspect of the task:

{specific_role}

Provide a detailed analysis focusing ONLY on your assigned aspect. Format your response using XML tags like this:
<key_findings>list your main points here</key_findings>
<supporting_evidence>list your relevant data or examples here</supporting_evidence>
<recommendations>list your forward-looking suggestions here</recommendations>

Keep your response focused and analytical.";

pub const DEFAULT_SYNTHESIS_TEMPLATE: &str = r"Analyze and synthesize these separate analyses into a comprehensive final report:

{results}

Format your response using XML tags like this:
<executive_summary>brief overview of key findings</executive_summary>
<detailed_analysis>comprehensive analysis combining all inputs</detailed_analysis>
<future_implications>what this means for the future</future_implications>
<recommendations>actionable next steps</recommendations>";

/// Optional template overrides as read from a config file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub division: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtask: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synthesis: Option<String>,
}

/// Resolved, validated templates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplates {
    division: String,
    subtask: String,
    synthesis: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            division: DEFAULT_DIVISION_TEMPLATE.to_string(),
            subtask: DEFAULT_SUBTASK_TEMPLATE.to_string(),
            synthesis: DEFAULT_SYNTHESIS_TEMPLATE.to_string(),
        }
    }
}

impl PromptTemplates {
    /// Apply overrides on top of the defaults, rejecting any template that is
    /// missing its placeholder.
    pub fn from_overrides(overrides: &PromptOverrides) -> Result<Self> {
        let pick = |custom: Option<&String>,
                    default: &str,
                    placeholder: &str,
                    stage: &str|
         -> Result<String> {
            let template = custom.map_or(default, String::as_str);
            if !template.contains(placeholder) {
                bail!("The {stage} prompt template must contain {placeholder}");
            }
            Ok(template.to_string())
        };

        Ok(Self {
            division: pick(
                overrides.division.as_ref(),
                DEFAULT_DIVISION_TEMPLATE,
                TASK_PLACEHOLDER,
                "division",
            )?,
            subtask: pick(
                overrides.subtask.as_ref(),
                DEFAULT_SUBTASK_TEMPLATE,
                ROLE_PLACEHOLDER,
                "subtask",
            )?,
            synthesis: pick(
                overrides.synthesis.as_ref(),
                DEFAULT_SYNTHESIS_TEMPLATE,
                RESULTS_PLACEHOLDER,
                "synthesis",
            )?,
        })
    }

    pub fn division(&self, task: &str) -> String {
        self.division.replace(TASK_PLACEHOLDER, task)
    }

    /// Role instruction followed by the original task as context
    pub fn subtask(&self, description: &str, task: &str) -> String {
        format!(
            "{}\n\nTask: {task}",
            self.subtask.replace(ROLE_PLACEHOLDER, description)
        )
    }

    pub fn synthesis(&self, results_json: &str) -> String {
        self.synthesis.replace(RESULTS_PLACEHOLDER, results_json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_templates_render() {
        let templates = PromptTemplates::default();
        let division = templates.division("compare web frameworks");
        assert!(division.contains("'compare web frameworks'"));
        assert!(division.contains("<task3>"));

        let subtask = templates.subtask("Study adoption trends", "compare web frameworks");
        assert!(subtask.contains("Study adoption trends"));
        assert!(subtask.ends_with("Task: compare web frameworks"));

        let synthesis = templates.synthesis("{}");
        assert!(synthesis.contains("{}\n"));
        assert!(!synthesis.contains(RESULTS_PLACEHOLDER));
    }

    #[test]
    fn test_overrides_apply() {
        let overrides = PromptOverrides {
            division: Some("Split {task} into <task1>, <task2>, <task3>".to_string()),
            ..Default::default()
        };
        let templates = PromptTemplates::from_overrides(&overrides).expect("valid overrides");
        assert_eq!(
            templates.division("X"),
            "Split X into <task1>, <task2>, <task3>"
        );
        assert_eq!(templates.synthesis("R"), PromptTemplates::default().synthesis("R"));
    }

    #[test]
    fn test_override_without_placeholder_rejected() {
        let overrides = PromptOverrides {
            synthesis: Some("Summarize everything".to_string()),
            ..Default::default()
        };
        let err = PromptTemplates::from_overrides(&overrides).expect_err("should reject");
        assert!(err.to_string().contains("{results}"));
    }
}
