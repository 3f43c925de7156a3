use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use abtest_core::{AnalysisError, Group, Result, TrialRecord};

/// Arithmetic means of the three observed outcomes for one arm.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GroupSummary {
    pub click_rate: f64,
    pub conversion_rate: f64,
    pub avg_revenue: f64,
}

/// Partition records by arm and compute mean click rate, mean conversion
/// rate, and mean revenue per arm. Every arm must have at least one
/// record; the mean of an empty arm is undefined.
pub fn summarize(records: &[TrialRecord]) -> Result<HashMap<Group, GroupSummary>> {
    let mut summaries = HashMap::new();

    for group in [Group::A, Group::B] {
        let arm: Vec<&TrialRecord> = records.iter().filter(|r| r.group == group).collect();
        if arm.is_empty() {
            return Err(AnalysisError::MissingData(format!(
                "cannot summarize group {}: no records",
                group
            )));
        }

        let n = arm.len() as f64;
        let clicks = arm.iter().filter(|r| r.click).count() as f64;
        let conversions = arm.iter().filter(|r| r.converted).count() as f64;
        let revenue: f64 = arm.iter().map(|r| r.revenue).sum();

        let summary = GroupSummary {
            click_rate: clicks / n,
            conversion_rate: conversions / n,
            avg_revenue: revenue / n,
        };

        tracing::info!(
            group = %group,
            click_rate = summary.click_rate,
            conversion_rate = summary.conversion_rate,
            avg_revenue = summary.avg_revenue,
            "group summary"
        );

        summaries.insert(group, summary);
    }

    Ok(summaries)
}
