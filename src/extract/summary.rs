use bytes::Bytes;
use std::fmt;

use super::ResultSet;

/// Text report written next to the extracted entries.
///
/// One `fail:{entry}` line per failed entry, then
/// `success:{n}, fail:{m}`. The object carries an `.html` suffix but the
/// body is plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryReport {
    failed: Vec<String>,
    success_count: usize,
}

impl SummaryReport {
    pub fn from_results(results: &ResultSet) -> Self {
        SummaryReport {
            failed: results.fail.clone(),
            success_count: results.success.len(),
        }
    }

    pub fn fail_count(&self) -> usize {
        self.failed.len()
    }

    pub fn to_bytes(&self) -> Bytes {
        Bytes::from(self.to_string())
    }
}

impl fmt::Display for SummaryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.failed {
            writeln!(f, "fail:{entry}")?;
        }
        writeln!(f, "success:{}, fail:{}", self.success_count, self.fail_count())
    }
}
