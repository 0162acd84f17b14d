//! Selector — chooses the next round's batch of miners.

use moderntensor_core::{seed_for, MinerDirectory, MinerRef, MinerUid};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cmp::Ordering;
use std::collections::HashSet;

pub struct Selector;

impl Selector {
    /// Rank candidates by (usage_counter ascending, weight descending,
    /// seeded tiebreak), take the first `target_k`, and mark each selected
    /// miner's usage counter incremented before returning.
    ///
    /// `excluded` holds miners a prior round scored as a dispatch error
    /// while `retry_failed = false`; they are dropped from the candidate
    /// pool before ranking so they cannot be re-selected for the remainder
    /// of the phase.
    ///
    /// The tiebreak seed is keyed by `(slot_id, round_index)` alone, which
    /// makes every validator's round-k ordering reproducible given its own
    /// slot id rather than divergent between validators sharing a slot id
    /// and round index — there is no validator identity in this domain
    /// model for the seed to fold in.
    pub fn select(
        directory: &mut MinerDirectory,
        target_k: usize,
        slot_id: u64,
        round_index: u64,
        excluded: &HashSet<MinerUid>,
    ) -> Vec<MinerRef> {
        let seed = seed_for(slot_id, round_index);
        let mut rng = StdRng::seed_from_u64(seed);

        let mut candidates: Vec<(MinerRef, u64)> = directory
            .iter()
            .filter(|m| !excluded.contains(&m.uid))
            .cloned()
            .map(|m| (m, rng.gen::<u64>()))
            .collect();

        candidates.sort_by(|(a, a_tiebreak), (b, b_tiebreak)| {
            a.usage_counter
                .cmp(&b.usage_counter)
                .then_with(|| b.weight.partial_cmp(&a.weight).unwrap_or(Ordering::Equal))
                .then_with(|| a_tiebreak.cmp(b_tiebreak))
        });

        let take = target_k.min(candidates.len());
        let selected: Vec<MinerRef> = candidates.into_iter().take(take).map(|(m, _)| m).collect();
        for miner in &selected {
            directory.record_usage(&miner.uid);
        }
        selected
    }
}
