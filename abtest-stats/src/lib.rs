//! Statistical analysis of A/B test data: descriptive summaries,
//! frequentist significance tests, a Bayesian posterior comparison, and a
//! sequential early-stopping test over time-ordered records.
//!
//! Every analysis is a pure synchronous function over caller-owned
//! records; diagnostic one-liners are emitted as `tracing` events rather
//! than printed, so the computation stays testable without capturing
//! output streams.

pub mod bayesian;
pub mod frequentist;
pub mod sequential;
pub mod summary;

pub use bayesian::{bayesian_probability_b_better, probability_b_better, BayesianConfig};
pub use frequentist::{FrequentistAnalyzer, TestResult};
pub use sequential::{SequentialOutcome, SequentialTest, SequentialTestResult};
pub use summary::{summarize, GroupSummary};
