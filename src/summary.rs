//! Summary types produced by the agent and returned to callers.

use serde::Serialize;

/// A generated summary tied to the pull request it describes.
///
/// Only created after the pull request was fetched and the model answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRecord {
    pub pr_number: i64,
    pub summary: String,
}

impl SummaryRecord {
    pub fn new(pr_number: i64, summary: String) -> Self {
        Self { pr_number, summary }
    }
}

/// JSON body of a successful `/docs` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryResponse {
    pub summary: String,
}

impl From<SummaryRecord> for SummaryResponse {
    fn from(record: SummaryRecord) -> Self {
        Self {
            summary: record.summary,
        }
    }
}
