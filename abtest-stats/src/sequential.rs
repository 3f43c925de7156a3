use serde::{Deserialize, Serialize};
use statrs::distribution::{Binomial, Discrete};

use abtest_core::{
    ensure_both_groups, AnalysisError, Group, GroupCounts, Result, TrialRecord,
};

pub const DEFAULT_ALPHA: f64 = 0.05;

// ===== Outcome =====

/// How the sequential test terminated.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum SequentialOutcome {
    /// A significant difference was detected at `index` (position in the
    /// time-ordered data) with the given p-value.
    Stopped { index: usize, p_value: f64 },
    /// The data ran out without the p-value ever crossing the threshold.
    Exhausted,
}

impl SequentialOutcome {
    pub fn is_stopped(&self) -> bool {
        matches!(self, SequentialOutcome::Stopped { .. })
    }

    pub fn stopping_index(&self) -> Option<usize> {
        match self {
            SequentialOutcome::Stopped { index, .. } => Some(*index),
            SequentialOutcome::Exhausted => None,
        }
    }
}

/// Trace of the sequential test: one p-value per processed index,
/// starting at index 1, plus the termination outcome. When the test
/// stops early the trace ends at the stopping index and nothing past it
/// is computed, so `p_values.len()` equals the stopping index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SequentialTestResult {
    pub p_values: Vec<f64>,
    pub outcome: SequentialOutcome,
}

// ===== Test Runner =====

/// Sequential A/B test with an early-stopping rule: walk the records in
/// timestamp order and, at each index, compare the arms' cumulative
/// conversion counts with a two-sided exact binomial test. Stop at the
/// first p-value strictly below the significance threshold.
pub struct SequentialTest {
    alpha: f64,
}

impl SequentialTest {
    /// `alpha` is the stopping threshold and must lie in (0, 1).
    pub fn new(alpha: f64) -> Result<Self> {
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(AnalysisError::InvalidParameter(format!(
                "alpha must be in (0, 1), got {}",
                alpha
            )));
        }
        Ok(Self { alpha })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Run the test over a copy of `records` sorted by timestamp.
    /// Records with equal timestamps keep their original input order
    /// (stable sort), so reruns on the same input are deterministic.
    ///
    /// Index 0 has no comparison basis; testing starts at index 1. At
    /// each index the null success probability is the cumulative share
    /// of trials assigned to arm A, and the observed statistic is arm
    /// A's share of the cumulative conversions. An arm with zero
    /// cumulative trials at a tested prefix makes the binomial test
    /// undefined and fails the run outright.
    pub fn run(&self, records: &[TrialRecord]) -> Result<SequentialTestResult> {
        ensure_both_groups(records)?;
        if records.len() < 2 {
            return Err(AnalysisError::InsufficientData(
                "sequential test needs at least 2 records".to_string(),
            ));
        }

        let mut ordered: Vec<&TrialRecord> = records.iter().collect();
        ordered.sort_by_key(|r| r.timestamp);

        let mut counts_a = GroupCounts::default();
        let mut counts_b = GroupCounts::default();
        tally(&mut counts_a, &mut counts_b, ordered[0]);

        let mut p_values = Vec::new();

        for (index, &record) in ordered.iter().enumerate().skip(1) {
            tally(&mut counts_a, &mut counts_b, record);

            for (group, counts) in [(Group::A, counts_a), (Group::B, counts_b)] {
                if counts.trials == 0 {
                    return Err(AnalysisError::DegenerateInput(format!(
                        "group {} has no trials through index {}; binomial test is undefined",
                        group, index
                    )));
                }
            }

            let null_share =
                counts_a.trials as f64 / (counts_a.trials + counts_b.trials) as f64;
            let p_value = binomial_two_sided(
                counts_a.conversions,
                counts_a.conversions + counts_b.conversions,
                null_share,
            )?;
            p_values.push(p_value);

            if p_value < self.alpha {
                tracing::info!(
                    index = index,
                    p_value = p_value,
                    rate_a = counts_a.conversion_rate(),
                    rate_b = counts_b.conversion_rate(),
                    "sequential test stopped early: significant difference"
                );
                return Ok(SequentialTestResult {
                    p_values,
                    outcome: SequentialOutcome::Stopped { index, p_value },
                });
            }
        }

        tracing::info!(
            samples = ordered.len(),
            rate_a = counts_a.conversion_rate(),
            rate_b = counts_b.conversion_rate(),
            "sequential test exhausted the data: no significant difference found"
        );
        Ok(SequentialTestResult {
            p_values,
            outcome: SequentialOutcome::Exhausted,
        })
    }
}

impl Default for SequentialTest {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
        }
    }
}

fn tally(counts_a: &mut GroupCounts, counts_b: &mut GroupCounts, record: &TrialRecord) {
    let counts = match record.group {
        Group::A => counts_a,
        Group::B => counts_b,
    };
    counts.trials += 1;
    if record.converted {
        counts.conversions += 1;
    }
}

/// Two-sided exact binomial test: probability, under Binomial(n, p0), of
/// an outcome no more likely than the observed `successes`. With no
/// observations there is no evidence against the null and p is 1.
fn binomial_two_sided(successes: u64, n: u64, p0: f64) -> Result<f64> {
    if n == 0 {
        return Ok(1.0);
    }

    let dist =
        Binomial::new(p0, n).map_err(|e| AnalysisError::DegenerateInput(e.to_string()))?;
    let observed = dist.pmf(successes);

    // Relative slack keeps outcomes of equal likelihood on the rejection
    // side despite floating-point rounding.
    let cutoff = observed * (1.0 + 1e-7);
    let p_value: f64 = (0..=n)
        .map(|k| dist.pmf(k))
        .filter(|&prob| prob <= cutoff)
        .sum();

    Ok(p_value.min(1.0))
}
