use serde::Serialize;

use crate::error::EntryExtractionError;

/// Result of extracting one entry
#[derive(Debug)]
pub enum ExtractionOutcome {
    Success { entry: String },
    Fail { entry: String, error: EntryExtractionError },
}

impl ExtractionOutcome {
    pub fn entry(&self) -> &str {
        match self {
            ExtractionOutcome::Success { entry } | ExtractionOutcome::Fail { entry, .. } => entry,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExtractionOutcome::Success { .. })
    }
}

/// Entry names partitioned by outcome, in worker completion order.
///
/// Serializes as `{"success": [...], "fail": [...]}`, the invocation output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResultSet {
    pub success: Vec<String>,
    pub fail: Vec<String>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one outcome to the matching sequence
    pub fn record(&mut self, outcome: ExtractionOutcome) {
        match outcome {
            ExtractionOutcome::Success { entry } => self.success.push(entry),
            ExtractionOutcome::Fail { entry, .. } => self.fail.push(entry),
        }
    }

    /// Total number of entries accounted for
    pub fn len(&self) -> usize {
        self.success.len() + self.fail.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<ExtractionOutcome> for ResultSet {
    fn from_iter<I: IntoIterator<Item = ExtractionOutcome>>(iter: I) -> Self {
        let mut results = ResultSet::new();
        for outcome in iter {
            results.record(outcome);
        }
        results
    }
}
