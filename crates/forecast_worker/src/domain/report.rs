use serde::Serialize;

/// Terminal state of one record within an invocation
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecordStatus {
    Completed,
    Failed { reason: String },
}

/// Structured per-record outcome, in event order
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RecordOutcome {
    pub index: usize,
    #[serde(flatten)]
    pub status: RecordStatus,
}

/// Aggregate outcome of one invocation.
///
/// Status 200 means the model loaded and every record was attempted, even if
/// all of them failed; only a model-load failure produces 500. Callers that
/// need partial-failure visibility read the outcomes rather than the status.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BatchOutcome {
    pub status_code: u16,
    pub message: String,
    pub outcomes: Vec<RecordOutcome>,
}

impl BatchOutcome {
    /// Batch-level failure: the model could not be acquired, no records ran
    pub fn batch_failure(message: impl Into<String>) -> Self {
        Self {
            status_code: 500,
            message: message.into(),
            outcomes: Vec::new(),
        }
    }

    /// Batch-level success with the collected per-record outcomes
    pub fn completed(outcomes: Vec<RecordOutcome>) -> Self {
        let failed = outcomes
            .iter()
            .filter(|o| !matches!(o.status, RecordStatus::Completed))
            .count();
        let message = format!(
            "Processed {} of {} records",
            outcomes.len() - failed,
            outcomes.len()
        );
        Self {
            status_code: 200,
            message,
            outcomes,
        }
    }

    pub fn is_batch_failure(&self) -> bool {
        self.status_code != 200
    }

    pub fn succeeded_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, RecordStatus::Completed))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.succeeded_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_failure_reports_500_and_no_outcomes() {
        let outcome = BatchOutcome::batch_failure("Error processing data: download failed");

        assert_eq!(outcome.status_code, 500);
        assert!(outcome.is_batch_failure());
        assert!(outcome.outcomes.is_empty());
        assert!(outcome.message.contains("download failed"));
    }

    #[test]
    fn test_completed_counts_partial_failures() {
        let outcome = BatchOutcome::completed(vec![
            RecordOutcome {
                index: 0,
                status: RecordStatus::Completed,
            },
            RecordOutcome {
                index: 1,
                status: RecordStatus::Failed {
                    reason: "bad payload".to_string(),
                },
            },
            RecordOutcome {
                index: 2,
                status: RecordStatus::Completed,
            },
        ]);

        assert_eq!(outcome.status_code, 200);
        assert!(!outcome.is_batch_failure());
        assert_eq!(outcome.succeeded_count(), 2);
        assert_eq!(outcome.failed_count(), 1);
        assert_eq!(outcome.message, "Processed 2 of 3 records");
    }

    #[test]
    fn test_all_records_failed_is_still_batch_success() {
        let outcome = BatchOutcome::completed(vec![RecordOutcome {
            index: 0,
            status: RecordStatus::Failed {
                reason: "boom".to_string(),
            },
        }]);

        assert_eq!(outcome.status_code, 200);
        assert_eq!(outcome.failed_count(), 1);
    }

    #[test]
    fn test_outcome_serializes_with_flattened_status() {
        let outcome = RecordOutcome {
            index: 4,
            status: RecordStatus::Failed {
                reason: "bad payload".to_string(),
            },
        };

        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["index"], 4);
        assert_eq!(value["status"], "failed");
        assert_eq!(value["reason"], "bad payload");
    }
}
