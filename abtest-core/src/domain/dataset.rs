use serde::{Deserialize, Serialize};

use super::record::{Group, TrialRecord};
use crate::error::{AnalysisError, Result};

// ===== Cumulative Counts =====

/// Trial and conversion totals for one arm. Invariant: `conversions <=
/// trials`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupCounts {
    pub trials: u64,
    pub conversions: u64,
}

impl GroupCounts {
    pub fn failures(&self) -> u64 {
        self.trials - self.conversions
    }

    pub fn conversion_rate(&self) -> Option<f64> {
        if self.trials == 0 {
            None
        } else {
            Some(self.conversions as f64 / self.trials as f64)
        }
    }
}

// ===== Dataset Helpers =====

/// Revenue observations for one arm, in input order.
pub fn group_revenue(records: &[TrialRecord], group: Group) -> Vec<f64> {
    records
        .iter()
        .filter(|r| r.group == group)
        .map(|r| r.revenue)
        .collect()
}

/// Trial and conversion totals for one arm.
pub fn group_counts(records: &[TrialRecord], group: Group) -> GroupCounts {
    records
        .iter()
        .filter(|r| r.group == group)
        .fold(GroupCounts::default(), |mut counts, record| {
            counts.trials += 1;
            if record.converted {
                counts.conversions += 1;
            }
            counts
        })
}

/// Fails fast when either arm is absent from the dataset. Every analysis
/// compares the two arms, so a one-armed dataset is a caller error.
pub fn ensure_both_groups(records: &[TrialRecord]) -> Result<()> {
    if records.is_empty() {
        return Err(AnalysisError::MissingData("dataset is empty".to_string()));
    }
    for group in [Group::A, Group::B] {
        if !records.iter().any(|r| r.group == group) {
            return Err(AnalysisError::MissingData(format!(
                "dataset contains no records for group {}",
                group
            )));
        }
    }
    Ok(())
}
