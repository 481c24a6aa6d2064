//! Thresholded mapping from rerank outcome to a linking status.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LinkStatus {
    Rejected,
    Unresolved,
    Ambiguous,
    Resolved,
}

impl LinkStatus {
    /// RESOLVED > AMBIGUOUS > UNRESOLVED > REJECTED, used to pick the surviving
    /// entity when two mentions collide during dedup.
    pub fn rank(self) -> u8 {
        match self {
            LinkStatus::Resolved => 3,
            LinkStatus::Ambiguous => 2,
            LinkStatus::Unresolved => 1,
            LinkStatus::Rejected => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusPolicy {
    pub tau: f32,
    pub delta: f32,
    pub top_n: usize,
}

impl Default for StatusPolicy {
    fn default() -> Self {
        StatusPolicy {
            tau: 0.70,
            delta: 0.10,
            top_n: 5,
        }
    }
}

impl StatusPolicy {
    pub fn new(tau: f32, delta: f32, top_n: usize) -> Self {
        StatusPolicy { tau, delta, top_n }
    }

    /// Decides RESOLVED/AMBIGUOUS/UNRESOLVED from a reranked best score and
    /// margin. Never returns REJECTED; that status only comes from negation.
    pub fn decide(&self, best: f32, margin: f32) -> LinkStatus {
        if best >= self.tau && margin >= self.delta {
            LinkStatus::Resolved
        } else if best >= self.tau {
            LinkStatus::Ambiguous
        } else {
            LinkStatus::Unresolved
        }
    }

    /// Number of candidates to retain for a given status: one for RESOLVED,
    /// `top_n` otherwise.
    pub fn retain_count(&self, status: LinkStatus) -> usize {
        match status {
            LinkStatus::Resolved => 1,
            _ => self.top_n,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.70, 0.10, 0.70, 0.10, LinkStatus::Resolved)]
    #[case(0.70, 0.10, 0.70, 0.09, LinkStatus::Ambiguous)]
    #[case(0.70, 0.10, 0.69, 0.50, LinkStatus::Unresolved)]
    #[case(0.70, 0.10, 0.95, 0.95, LinkStatus::Resolved)]
    fn decides_boundary_cases(
        #[case] tau: f32,
        #[case] delta: f32,
        #[case] best: f32,
        #[case] margin: f32,
        #[case] expected: LinkStatus,
    ) {
        let policy = StatusPolicy::new(tau, delta, 5);
        assert_eq!(policy.decide(best, margin), expected);
    }

    #[test]
    fn status_rank_orders_resolved_highest() {
        assert!(LinkStatus::Resolved.rank() > LinkStatus::Ambiguous.rank());
        assert!(LinkStatus::Ambiguous.rank() > LinkStatus::Unresolved.rank());
        assert!(LinkStatus::Unresolved.rank() > LinkStatus::Rejected.rank());
    }
}
