//! Per-client utility signals fed into an Oort-style client selector.

use serde::{Deserialize, Serialize};

/// Reward and cost signals for a single client in a single round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientUtility {
    pub client_id: String,
    pub statistical_utility: f64,
    pub gradient_utility: f64,
    /// Wall clock or simulated round duration, in seconds.
    pub duration: f64,
    pub data_diversity_score: Option<f64>,
    pub combined_utility: f64,
}

impl ClientUtility {
    /// The reward consumed by the selector, which is the statistical utility.
    pub fn oort_reward(&self) -> f64 {
        self.statistical_utility
    }
}

/// Builds the utility record for a client from its round measurements.
///
/// Negative `loss_value` and `gradient_l2_norm` are clamped to zero, the
/// function never fails.
///
/// # Arguments
/// * `client_id` - The client identifier.
/// * `loss_value` - The aggregated training loss reported by the client.
/// * `trained_size` - The amount of samples trained this round.
/// * `gradient_l2_norm` - The L2 norm of the client's update.
/// * `duration` - The round duration for this client.
/// * `data_diversity_score` - An optional diversity score, carried as is.
///
/// # Returns
/// A new `ClientUtility`.
pub fn build_client_utility(
    client_id: impl Into<String>,
    loss_value: f64,
    trained_size: u64,
    gradient_l2_norm: f64,
    duration: f64,
    data_diversity_score: Option<f64>,
) -> ClientUtility {
    let loss_value = loss_value.max(0.0);
    let gradient_l2_norm = gradient_l2_norm.max(0.0);
    let samples = trained_size as f64;

    let statistical_utility = loss_value.sqrt() * samples;
    let gradient_utility = if trained_size > 0 {
        gradient_l2_norm.sqrt() * samples / 100.0
    } else {
        0.0
    };

    // Single-signal policy: only the statistical utility drives selection.
    let combined_utility = statistical_utility;

    ClientUtility {
        client_id: client_id.into(),
        statistical_utility,
        gradient_utility,
        duration,
        data_diversity_score,
        combined_utility,
    }
}

/// Estimates the cost of selecting a client, currently its round duration.
pub fn estimate_simple_cost(util: &ClientUtility) -> f64 {
    // TODO: fold in uploaded bytes and straggler penalties once the transport reports them.
    util.duration
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn reference_example() {
        let u = build_client_utility("c1", 4.0, 10, 100.0, 2.5, None);

        assert_eq!(u.client_id, "c1");
        assert!((u.statistical_utility - 20.0).abs() < EPS);
        assert!((u.gradient_utility - 1.0).abs() < EPS);
        assert!((u.combined_utility - 20.0).abs() < EPS);
        assert!((u.duration - 2.5).abs() < EPS);
        assert_eq!(u.data_diversity_score, None);
    }

    #[test]
    fn statistical_utility_is_sqrt_loss_times_size() {
        for (loss, size) in [(0.0, 5), (1.0, 0), (2.25, 4), (9.0, 3), (0.5, 1000)] {
            let u = build_client_utility("c", loss, size, 1.0, 1.0, None);
            let expected = f64::sqrt(loss) * size as f64;
            assert!((u.statistical_utility - expected).abs() < EPS);
        }
    }

    #[test]
    fn zero_loss_or_size_yields_zero_statistical_utility() {
        assert_eq!(build_client_utility("c", 0.0, 50, 1.0, 1.0, None).statistical_utility, 0.0);
        assert_eq!(build_client_utility("c", 3.0, 0, 1.0, 1.0, None).statistical_utility, 0.0);
    }

    #[test]
    fn negative_inputs_are_clamped() {
        let clamped = build_client_utility("c", -3.0, 10, -42.0, 1.0, Some(0.3));
        let zeroed = build_client_utility("c", 0.0, 10, 0.0, 1.0, Some(0.3));

        assert_eq!(clamped, zeroed);
        assert!(clamped.statistical_utility >= 0.0);
        assert!(clamped.gradient_utility >= 0.0);
    }

    #[test]
    fn gradient_utility_is_zero_without_samples() {
        let u = build_client_utility("c", 1.0, 0, 1e6, 1.0, None);
        assert_eq!(u.gradient_utility, 0.0);
    }

    #[test]
    fn combined_utility_matches_statistical_utility() {
        for (loss, size, norm) in [(0.1, 1, 0.0), (4.0, 10, 100.0), (-1.0, 3, 7.0), (16.0, 0, 2.0)] {
            let u = build_client_utility("c", loss, size, norm, 0.0, None);
            assert_eq!(u.combined_utility, u.statistical_utility);
            assert_eq!(u.oort_reward(), u.statistical_utility);
        }
    }

    #[test]
    fn diversity_score_is_carried() {
        let u = build_client_utility("c", 1.0, 1, 1.0, 1.0, Some(0.75));
        assert_eq!(u.data_diversity_score, Some(0.75));
    }

    #[test]
    fn simple_cost_is_duration() {
        let u = build_client_utility("c", 4.0, 10, 100.0, 7.25, None);
        assert_eq!(estimate_simple_cost(&u), 7.25);
    }
}
