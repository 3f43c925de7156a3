use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ===== Treatment Arm =====

/// One of the two treatment conditions under comparison: `A` is the
/// control arm, `B` the treatment arm.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Group {
    A,
    B,
}

impl Group {
    pub fn other(&self) -> Group {
        match self {
            Group::A => Group::B,
            Group::B => Group::A,
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Group::A => write!(f, "A"),
            Group::B => write!(f, "B"),
        }
    }
}

// ===== Trial Record =====

/// One subject's observed outcome in the experiment. Records are
/// immutable once built; analyses never mutate caller-owned data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrialRecord {
    pub group: Group,

    pub click: bool,

    pub converted: bool,

    /// Revenue attributed to this subject. Meaningful only when
    /// `converted` is true, but not enforced.
    pub revenue: f64,

    pub timestamp: DateTime<Utc>,
}

impl TrialRecord {
    pub fn new(
        group: Group,
        click: bool,
        converted: bool,
        revenue: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            group,
            click,
            converted,
            revenue,
            timestamp,
        }
    }
}
