use crate::RepoSignals;

/// Fallback `overallHealth` when no repository reported metrics.
pub const BASELINE_OVERALL_HEALTH: u8 = 75;

/// Produces a 0..=100 health figure.
pub trait HealthScorer: Send + Sync {
    fn score_repository(&self, signals: &RepoSignals) -> u8;

    /// Score for a container that declares no `metrics.healthScore`.
    fn score_container(&self) -> u8;
}

/// Placeholder scoring: a fixed baseline plus uniform random jitter.
///
/// This does not yet derive anything from the signals; there is no agreed
/// formula, so callers must not read meaning into the value beyond "data was
/// available".
#[derive(Debug, Clone, Copy)]
pub struct JitterHealthScorer {
    pub baseline: u8,
    pub jitter: u8,
}

impl Default for JitterHealthScorer {
    fn default() -> Self {
        Self {
            baseline: 70,
            jitter: 30,
        }
    }
}

impl JitterHealthScorer {
    fn sample(&self) -> u8 {
        let extra = if self.jitter == 0 {
            0
        } else {
            fastrand::u8(0..=self.jitter)
        };
        self.baseline.saturating_add(extra).min(100)
    }
}

impl HealthScorer for JitterHealthScorer {
    fn score_repository(&self, _signals: &RepoSignals) -> u8 {
        self.sample()
    }

    fn score_container(&self) -> u8 {
        self.sample()
    }
}

/// Always returns the same value. Useful for deterministic output.
#[derive(Debug, Clone, Copy)]
pub struct FixedHealthScorer(pub u8);

impl HealthScorer for FixedHealthScorer {
    fn score_repository(&self, _signals: &RepoSignals) -> u8 {
        self.0.min(100)
    }

    fn score_container(&self) -> u8 {
        self.0.min(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jitter_stays_in_range() {
        let scorer = JitterHealthScorer::default();
        for _ in 0..500 {
            let s = scorer.score_repository(&RepoSignals::default());
            assert!((70..=100).contains(&s));
        }
    }

    #[test]
    fn saturates_at_one_hundred() {
        let scorer = JitterHealthScorer {
            baseline: 95,
            jitter: 50,
        };
        for _ in 0..200 {
            assert!(scorer.score_container() <= 100);
        }
    }
}
