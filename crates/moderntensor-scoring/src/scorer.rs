//! Scorer — converts a (task, result-or-error) pair into a bounded score.

use moderntensor_core::{TaskOutcome, SCORE_MAX, SCORE_MIN};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

const LATENCY_FAST: Duration = Duration::from_secs(5);
const LATENCY_OK: Duration = Duration::from_secs(10);

/// Stateful only in its RNG: noise is resampled per call in non-deterministic
/// mode, and is skipped entirely (not merely zeroed) in deterministic mode
/// so replaying a phase with `deterministic_scoring = true` never touches
/// the RNG at all.
pub struct Scorer {
    deterministic: bool,
    rng: StdRng,
}

impl Scorer {
    /// `seed` should come from `moderntensor_core::seed::seed_for(slot_id, round_index)`
    /// when deterministic reproducibility across runs is required; any value
    /// works when `deterministic` is false since the RNG is only used to draw
    /// noise in that branch.
    pub fn new(deterministic: bool, seed: u64) -> Self {
        let rng = if deterministic { StdRng::seed_from_u64(seed) } else { StdRng::from_entropy() };
        Self { deterministic, rng }
    }

    /// Score one task outcome. Never panics, never returns outside
    /// `[SCORE_MIN, SCORE_MAX]`.
    pub fn score(&mut self, outcome: &TaskOutcome) -> f64 {
        let completed = match outcome {
            TaskOutcome::Completed(result) => result,
            // Timeout, DispatchError, and Malformed all take the no-result path.
            TaskOutcome::Timeout | TaskOutcome::DispatchError(_) | TaskOutcome::Malformed(_) => {
                return SCORE_MIN;
            }
        };

        let mut base: f64 = 0.5;
        if completed.latency < LATENCY_FAST {
            base += 0.20;
        } else if completed.latency < LATENCY_OK {
            base += 0.10;
        }

        let caps = completed.payload.capabilities();
        if caps.has_url {
            base += 0.15;
        }
        if caps.has_version {
            base += 0.05;
        }
        base = base.clamp(SCORE_MIN, SCORE_MAX);

        let noise = if self.deterministic { 0.0 } else { self.rng.gen_range(-0.15..=0.15) };

        (base + noise).clamp(SCORE_MIN, SCORE_MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moderntensor_core::{MinerResult, Payload};
    use std::time::Instant;

    fn completed(latency: Duration, payload: Payload) -> TaskOutcome {
        TaskOutcome::Completed(MinerResult { task_id: 1, completed_at: Instant::now(), payload, latency })
    }

    #[test]
    fn every_score_stays_in_bounds() {
        let mut scorer = Scorer::new(false, 1);
        for outcome in [
            TaskOutcome::Timeout,
            TaskOutcome::DispatchError("x".into()),
            TaskOutcome::Malformed("y".into()),
            completed(Duration::from_millis(1), Payload::structured().with_result_url("u").with_model_version("v")),
        ] {
            let s = scorer.score(&outcome);
            assert!((SCORE_MIN..=SCORE_MAX).contains(&s), "score {s} out of bounds");
        }
    }

    #[test]
    fn no_result_always_scores_minimum() {
        let mut scorer = Scorer::new(true, 42);
        assert_eq!(scorer.score(&TaskOutcome::Timeout), SCORE_MIN);
        assert_eq!(scorer.score(&TaskOutcome::DispatchError("e".into())), SCORE_MIN);
        assert_eq!(scorer.score(&TaskOutcome::Malformed("e".into())), SCORE_MIN);
    }

    #[test]
    fn deterministic_mode_is_reproducible() {
        let outcome =
            completed(Duration::from_millis(100), Payload::structured().with_result_url("u").with_model_version("v"));
        let mut a = Scorer::new(true, 7);
        let mut b = Scorer::new(true, 999); // seed irrelevant when deterministic
        assert_eq!(a.score(&outcome), b.score(&outcome));
    }

    #[test]
    fn fast_well_formed_result_scores_high_under_determinism() {
        let mut scorer = Scorer::new(true, 0);
        let outcome =
            completed(Duration::from_millis(500), Payload::structured().with_result_url("u").with_model_version("v"));
        let score = scorer.score(&outcome);
        // base 0.5 + 0.20 (fast) + 0.15 (url) + 0.05 (version) = 0.90
        assert!((score - 0.90).abs() < 1e-9);
    }

    mod prop_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn score_always_in_bounds(
                latency_ms in 0u64..20_000,
                has_url in any::<bool>(),
                has_version in any::<bool>(),
                deterministic in any::<bool>(),
                seed in any::<u64>(),
            ) {
                let mut payload = Payload::structured();
                if has_url {
                    payload = payload.with_result_url("u");
                }
                if has_version {
                    payload = payload.with_model_version("v");
                }
                let outcome = completed(Duration::from_millis(latency_ms), payload);
                let mut scorer = Scorer::new(deterministic, seed);
                let score = scorer.score(&outcome);
                prop_assert!((SCORE_MIN..=SCORE_MAX).contains(&score));
            }
        }
    }
}
