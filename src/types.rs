//! Records passed between pipeline stages.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::extract::ExtractedFields;

/// The overall unit of work. Cheap to clone; the text itself is shared and
/// never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task(Arc<str>);

impl Task {
    pub fn new(text: &str) -> Self {
        Self(Arc::from(text.trim()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One of the three ordinal positions a sub-task occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SubtaskSlot {
    #[serde(rename = "subtask_1")]
    First,
    #[serde(rename = "subtask_2")]
    Second,
    #[serde(rename = "subtask_3")]
    Third,
}

impl SubtaskSlot {
    pub const ALL: [SubtaskSlot; 3] = [Self::First, Self::Second, Self::Third];

    /// 1-based position
    pub const fn index(self) -> usize {
        match self {
            Self::First => 1,
            Self::Second => 2,
            Self::Third => 3,
        }
    }

    /// Canonical key, e.g. `subtask_1`
    pub fn key(self) -> String {
        format!("subtask_{}", self.index())
    }
}

impl fmt::Display for SubtaskSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "subtask_{}", self.index())
    }
}

/// Output of the division stage. Slots may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DivisionResult {
    pub subtask_1: Option<String>,
    pub subtask_2: Option<String>,
    pub subtask_3: Option<String>,
    pub reasoning: Option<String>,
}

impl DivisionResult {
    /// Build from extracted `subtask_N`/`reasoning` fields. Blank values
    /// count as absent.
    pub fn from_fields(mut fields: ExtractedFields) -> Self {
        let mut take_slot =
            |slot: SubtaskSlot| fields.take(&slot.key()).filter(|d| !d.is_empty());
        let subtask_1 = take_slot(SubtaskSlot::First);
        let subtask_2 = take_slot(SubtaskSlot::Second);
        let subtask_3 = take_slot(SubtaskSlot::Third);
        Self {
            subtask_1,
            subtask_2,
            subtask_3,
            reasoning: fields.take("reasoning").filter(|r| !r.is_empty()),
        }
    }

    pub fn description(&self, slot: SubtaskSlot) -> Option<&str> {
        match slot {
            SubtaskSlot::First => self.subtask_1.as_deref(),
            SubtaskSlot::Second => self.subtask_2.as_deref(),
            SubtaskSlot::Third => self.subtask_3.as_deref(),
        }
    }

    /// Present slots in ordinal order
    pub fn slots(&self) -> Vec<(SubtaskSlot, &str)> {
        SubtaskSlot::ALL
            .iter()
            .filter_map(|&slot| self.description(slot).map(|d| (slot, d)))
            .collect()
    }

    /// True when all three slots are filled
    pub fn is_complete(&self) -> bool {
        self.slots().len() == SubtaskSlot::ALL.len()
    }
}

/// Analysis produced by one worker. Any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtaskRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_findings: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supporting_evidence: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<String>,
}

impl SubtaskRecord {
    pub fn from_fields(mut fields: ExtractedFields) -> Self {
        Self {
            key_findings: fields.take("key_findings"),
            supporting_evidence: fields.take("supporting_evidence"),
            recommendations: fields.take("recommendations"),
        }
    }
}

/// Completed worker records keyed by ordinal slot.
pub type SubtaskResults = BTreeMap<SubtaskSlot, SubtaskRecord>;

/// Final report. Serialized with missing fields as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisReport {
    pub executive_summary: Option<String>,
    pub detailed_analysis: Option<String>,
    pub future_implications: Option<String>,
    pub recommendations: Option<String>,
}

impl SynthesisReport {
    pub fn from_fields(mut fields: ExtractedFields) -> Self {
        Self {
            executive_summary: fields.take("executive_summary"),
            detailed_analysis: fields.take("detailed_analysis"),
            future_implications: fields.take("future_implications"),
            recommendations: fields.take("recommendations"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{ExtractionSchema, extract};

    #[test]
    fn test_task_is_trimmed() {
        let task = Task::new("  build a thing \n");
        assert_eq!(task.as_str(), "build a thing");
        assert!(Task::new("   ").is_empty());
    }

    #[test]
    fn test_slot_keys_and_order() {
        assert_eq!(SubtaskSlot::First.key(), "subtask_1");
        assert_eq!(SubtaskSlot::Third.to_string(), "subtask_3");
        assert!(SubtaskSlot::First < SubtaskSlot::Second);
    }

    #[test]
    fn test_division_skips_blank_slots() {
        let schema = ExtractionSchema::ordinal("division", "task", "subtask", 3, &["reasoning"]);
        let fields = extract("<task1>A</task1><task2>  </task2><task3>C</task3>", &schema);
        let division = DivisionResult::from_fields(fields);
        assert_eq!(
            division.slots(),
            vec![(SubtaskSlot::First, "A"), (SubtaskSlot::Third, "C")]
        );
        assert!(!division.is_complete());
        assert_eq!(division.reasoning, None);
    }

    #[test]
    fn test_results_serialize_by_slot() {
        let mut results = SubtaskResults::new();
        results.insert(
            SubtaskSlot::Third,
            SubtaskRecord {
                key_findings: Some("k3".to_string()),
                ..Default::default()
            },
        );
        results.insert(SubtaskSlot::First, SubtaskRecord::default());
        let json = serde_json::to_string(&results).expect("results should serialize");
        assert_eq!(json, r#"{"subtask_1":{},"subtask_3":{"key_findings":"k3"}}"#);
    }

    #[test]
    fn test_report_serializes_nulls() {
        let report = SynthesisReport {
            executive_summary: Some("s".to_string()),
            ..Default::default()
        };
        let value = serde_json::to_value(&report).expect("report should serialize");
        assert_eq!(value["executive_summary"], "s");
        assert!(value["detailed_analysis"].is_null());
        assert_eq!(value.as_object().map(serde_json::Map::len), Some(4));
    }
}
