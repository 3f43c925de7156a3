use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use statrs::distribution::Beta;

use abtest_core::{ensure_both_groups, group_counts, AnalysisError, Group, Result, TrialRecord};

/// Prior, sample budget, and optional seed for the posterior comparison.
///
/// The default is the uniform Beta(1,1) prior with 10 000 Monte Carlo
/// draws and entropy-seeded randomness. Pass a seed to make the estimate
/// bit-reproducible in tests.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BayesianConfig {
    pub prior_alpha: f64,
    pub prior_beta: f64,
    pub sample_count: usize,
    pub seed: Option<u64>,
}

impl Default for BayesianConfig {
    fn default() -> Self {
        Self {
            prior_alpha: 1.0,
            prior_beta: 1.0,
            sample_count: 10_000,
            seed: None,
        }
    }
}

impl BayesianConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Estimate P(rate_B > rate_A) by pairing draws from each arm's
/// Beta posterior. The result carries Monte Carlo noise of order
/// 1/sqrt(sample_count); callers must treat it as approximate unless a
/// seed is fixed.
pub fn probability_b_better(records: &[TrialRecord], config: &BayesianConfig) -> Result<f64> {
    ensure_both_groups(records)?;

    if config.sample_count == 0 {
        return Err(AnalysisError::InvalidParameter(
            "sample_count must be positive".to_string(),
        ));
    }
    if config.prior_alpha <= 0.0 || config.prior_beta <= 0.0 {
        return Err(AnalysisError::InvalidParameter(
            "Beta prior parameters must be positive".to_string(),
        ));
    }

    let posterior_a = posterior(records, Group::A, config)?;
    let posterior_b = posterior(records, Group::B, config)?;

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut b_better = 0usize;
    for _ in 0..config.sample_count {
        let sample_a = posterior_a.sample(&mut rng);
        let sample_b = posterior_b.sample(&mut rng);
        if sample_b > sample_a {
            b_better += 1;
        }
    }

    let prob = b_better as f64 / config.sample_count as f64;

    tracing::info!(prob_b_better = prob, "bayesian A/B test: P(B > A)");

    Ok(prob)
}

/// `probability_b_better` with the default uniform prior and 10 000
/// draws.
pub fn bayesian_probability_b_better(records: &[TrialRecord]) -> Result<f64> {
    probability_b_better(records, &BayesianConfig::default())
}

fn posterior(records: &[TrialRecord], group: Group, config: &BayesianConfig) -> Result<Beta> {
    let counts = group_counts(records, group);
    Beta::new(
        config.prior_alpha + counts.conversions as f64,
        config.prior_beta + counts.failures() as f64,
    )
    .map_err(|e| AnalysisError::DegenerateInput(e.to_string()))
}
