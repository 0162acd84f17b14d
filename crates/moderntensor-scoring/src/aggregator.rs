//! Aggregator — reduces one miner's `MinerScoreHistory` into a single
//! `FinalScore` at phase end.

use moderntensor_core::AggregationKind;

/// Returns `None` for an empty history: miners never selected get no
/// entry in the output map.
pub fn aggregate(history: &[f64], kind: AggregationKind) -> Option<f64> {
    if history.is_empty() {
        return None;
    }
    Some(match kind {
        AggregationKind::Average => history.iter().sum::<f64>() / history.len() as f64,
        AggregationKind::Median => median(history),
        AggregationKind::Max => history.iter().copied().fold(f64::MIN, f64::max),
    })
}

/// Positional median: the middle element of the sorted history (lower of
/// the two middle elements on an even-length history), not an
/// interpolated average. This keeps the aggregate always equal to one
/// actually-observed score, which matters for the idempotence property
/// that a single-element history returns exactly that element.
fn median(history: &[f64]) -> f64 {
    let mut sorted = history.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).expect("scores are never NaN"));
    sorted[(sorted.len() - 1) / 2]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_element_history_returns_that_element_for_every_aggregator() {
        for kind in [AggregationKind::Average, AggregationKind::Median, AggregationKind::Max] {
            assert_eq!(aggregate(&[0.42], kind), Some(0.42));
        }
    }

    #[test]
    fn average_of_repeated_value_is_exact() {
        let history = vec![0.7; 20];
        assert_eq!(aggregate(&history, AggregationKind::Average), Some(0.7));
    }

    #[test]
    fn empty_history_has_no_entry() {
        assert_eq!(aggregate(&[], AggregationKind::Average), None);
    }

    #[test]
    fn median_picks_actual_observed_score() {
        let history = vec![0.1, 0.9, 0.5, 0.3];
        let m = aggregate(&history, AggregationKind::Median).unwrap();
        assert!(history.contains(&m));
    }

    #[test]
    fn max_picks_largest() {
        let history = vec![0.2, 0.8, 0.4];
        assert_eq!(aggregate(&history, AggregationKind::Max), Some(0.8));
    }
}
