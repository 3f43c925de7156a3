use serde::{Deserialize, Serialize};
use statrs::distribution::{ChiSquared, ContinuousCDF, StudentsT};
use statrs::statistics::Statistics;

use abtest_core::{
    ensure_both_groups, group_counts, group_revenue, AnalysisError, Group, Result, TrialRecord,
};

/// Test statistic and two-sided p-value of a frequentist hypothesis test.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TestResult {
    pub statistic: f64,
    pub p_value: f64,
}

pub struct FrequentistAnalyzer;

impl FrequentistAnalyzer {
    /// Chi-square test of independence on the 2x2 contingency table of
    /// (group x converted), with Yates continuity correction. Null
    /// hypothesis: conversion is independent of arm.
    pub fn independence_test(records: &[TrialRecord]) -> Result<TestResult> {
        ensure_both_groups(records)?;

        let counts_a = group_counts(records, Group::A);
        let counts_b = group_counts(records, Group::B);

        // Observed cells: rows are arms, columns are (not converted,
        // converted).
        let observed = [
            [counts_a.failures() as f64, counts_a.conversions as f64],
            [counts_b.failures() as f64, counts_b.conversions as f64],
        ];

        let row_totals = [observed[0][0] + observed[0][1], observed[1][0] + observed[1][1]];
        let col_totals = [observed[0][0] + observed[1][0], observed[0][1] + observed[1][1]];
        let total = row_totals[0] + row_totals[1];

        let mut chi2 = 0.0;
        for i in 0..2 {
            for j in 0..2 {
                let expected = row_totals[i] * col_totals[j] / total;
                if expected == 0.0 {
                    return Err(AnalysisError::DegenerateInput(
                        "contingency table has a zero margin; chi-square test is undefined"
                            .to_string(),
                    ));
                }
                let deviation = ((observed[i][j] - expected).abs() - 0.5).max(0.0);
                chi2 += deviation * deviation / expected;
            }
        }

        // 2x2 table has one degree of freedom.
        let dist = ChiSquared::new(1.0)
            .map_err(|e| AnalysisError::DegenerateInput(e.to_string()))?;
        let p_value = 1.0 - dist.cdf(chi2);

        tracing::info!(
            chi2 = chi2,
            p_value = p_value,
            "chi-square test for conversion rate"
        );

        Ok(TestResult {
            statistic: chi2,
            p_value,
        })
    }

    /// Welch's unequal-variance t-test comparing revenue between the two
    /// arms. Statistic sign follows A minus B.
    pub fn mean_difference_test(records: &[TrialRecord]) -> Result<TestResult> {
        ensure_both_groups(records)?;

        let revenue_a = group_revenue(records, Group::A);
        let revenue_b = group_revenue(records, Group::B);
        let result = Self::welch_t_test(&revenue_a, &revenue_b)?;

        tracing::info!(
            t_stat = result.statistic,
            p_value = result.p_value,
            "t-test for revenue"
        );

        Ok(result)
    }

    /// Cohen's d between arm B and arm A revenue, with pooled standard
    /// deviation sqrt((var_A + var_B) / 2). Positive means B's mean
    /// revenue exceeds A's.
    pub fn effect_size(records: &[TrialRecord]) -> Result<f64> {
        ensure_both_groups(records)?;

        let revenue_a = group_revenue(records, Group::A);
        let revenue_b = group_revenue(records, Group::B);
        let d = Self::cohens_d(&revenue_a, &revenue_b)?;

        tracing::info!(effect_size = d, "effect size (Cohen's d)");

        Ok(d)
    }

    fn welch_t_test(sample_a: &[f64], sample_b: &[f64]) -> Result<TestResult> {
        if sample_a.len() < 2 || sample_b.len() < 2 {
            return Err(AnalysisError::InsufficientData(
                "Welch's t-test needs at least 2 observations per group".to_string(),
            ));
        }

        let mean_a = sample_a.mean();
        let mean_b = sample_b.mean();
        let var_a = sample_a.variance();
        let var_b = sample_b.variance();
        let n_a = sample_a.len() as f64;
        let n_b = sample_b.len() as f64;

        let se_a = var_a / n_a;
        let se_b = var_b / n_b;
        let pooled_se = se_a + se_b;
        if pooled_se == 0.0 {
            return Err(AnalysisError::DegenerateInput(
                "both groups have zero revenue variance".to_string(),
            ));
        }

        let t_stat = (mean_a - mean_b) / pooled_se.sqrt();

        // Welch-Satterthwaite degrees of freedom.
        let df = pooled_se * pooled_se
            / (se_a * se_a / (n_a - 1.0) + se_b * se_b / (n_b - 1.0));

        let dist = StudentsT::new(0.0, 1.0, df)
            .map_err(|e| AnalysisError::DegenerateInput(e.to_string()))?;
        let p_value = 2.0 * (1.0 - dist.cdf(t_stat.abs()));

        Ok(TestResult {
            statistic: t_stat,
            p_value,
        })
    }

    fn cohens_d(sample_a: &[f64], sample_b: &[f64]) -> Result<f64> {
        if sample_a.len() < 2 || sample_b.len() < 2 {
            return Err(AnalysisError::InsufficientData(
                "Cohen's d needs at least 2 observations per group".to_string(),
            ));
        }

        let var_a = sample_a.variance();
        let var_b = sample_b.variance();
        let pooled_std = ((var_a + var_b) / 2.0).sqrt();
        if pooled_std == 0.0 {
            return Err(AnalysisError::DegenerateInput(
                "pooled standard deviation is zero".to_string(),
            ));
        }

        Ok((sample_b.mean() - sample_a.mean()) / pooled_std)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(group: Group, converted: bool, revenue: f64) -> TrialRecord {
        TrialRecord::new(group, converted, converted, revenue, Utc::now())
    }

    fn paired_revenue(revenue_a: &[f64], revenue_b: &[f64]) -> Vec<TrialRecord> {
        let mut records: Vec<TrialRecord> = revenue_a
            .iter()
            .map(|&r| record(Group::A, true, r))
            .collect();
        records.extend(revenue_b.iter().map(|&r| record(Group::B, true, r)));
        records
    }

    #[test]
    fn test_welch_identical_samples() {
        let records = paired_revenue(
            &[10.0, 11.0, 12.0, 13.0, 14.0],
            &[10.0, 11.0, 12.0, 13.0, 14.0],
        );
        let result = FrequentistAnalyzer::mean_difference_test(&records).unwrap();
        assert!(result.statistic.abs() < 1e-12);
        assert!(result.p_value > 0.99);
    }

    #[test]
    fn test_welch_clear_separation() {
        let records = paired_revenue(
            &[10.0, 11.0, 12.0, 13.0, 14.0],
            &[20.0, 21.0, 22.0, 23.0, 24.0],
        );
        let result = FrequentistAnalyzer::mean_difference_test(&records).unwrap();
        assert!(result.statistic < -5.0);
        assert!(result.p_value < 0.01);
    }

    #[test]
    fn test_welch_insufficient_observations() {
        let records = paired_revenue(&[10.0], &[12.0, 13.0]);
        assert!(FrequentistAnalyzer::mean_difference_test(&records).is_err());
    }

    #[test]
    fn test_welch_zero_variance() {
        let records = paired_revenue(&[5.0, 5.0, 5.0], &[5.0, 5.0, 5.0]);
        let err = FrequentistAnalyzer::mean_difference_test(&records).unwrap_err();
        assert!(matches!(err, AnalysisError::DegenerateInput(_)));
    }

    #[test]
    fn test_effect_size_sign() {
        let records = paired_revenue(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]);
        let d = FrequentistAnalyzer::effect_size(&records).unwrap();
        assert!(d > 0.0);
    }

    #[test]
    fn test_chi_square_independent_arms() {
        let mut records = Vec::new();
        for _ in 0..90 {
            records.push(record(Group::A, false, 0.0));
            records.push(record(Group::B, false, 0.0));
        }
        for _ in 0..10 {
            records.push(record(Group::A, true, 10.0));
            records.push(record(Group::B, true, 10.0));
        }

        let result = FrequentistAnalyzer::independence_test(&records).unwrap();
        assert!(result.statistic >= 0.0);
        assert!(result.p_value > 0.9);
    }

    #[test]
    fn test_chi_square_dependent_arms() {
        let mut records = Vec::new();
        for i in 0..100 {
            records.push(record(Group::A, i < 10, 0.0));
            records.push(record(Group::B, i < 50, 0.0));
        }

        let result = FrequentistAnalyzer::independence_test(&records).unwrap();
        assert!(result.statistic > 10.0);
        assert!(result.p_value < 0.001);
    }

    #[test]
    fn test_chi_square_zero_margin() {
        // Nobody converts anywhere: the converted column sums to zero.
        let records = vec![
            record(Group::A, false, 0.0),
            record(Group::A, false, 0.0),
            record(Group::B, false, 0.0),
        ];
        let err = FrequentistAnalyzer::independence_test(&records).unwrap_err();
        assert!(matches!(err, AnalysisError::DegenerateInput(_)));
    }
}
