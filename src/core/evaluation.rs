use crate::core::fanout::join_ordered;
use crate::domain::model::{Coordinate, Objective, TransportProfile};
use crate::domain::ports::RoutingProvider;
use crate::utils::error::Result;

/// Travel times to a candidate and the verdict against the budget.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub eta_minutes: Vec<f64>,
    pub objective_value: f64,
    pub reachable: bool,
}

pub struct FeasibilityEvaluator<'a, D: RoutingProvider> {
    provider: &'a D,
    profile: TransportProfile,
    tolerance_minutes: f64,
}

impl<'a, D: RoutingProvider> FeasibilityEvaluator<'a, D> {
    pub fn new(provider: &'a D, profile: TransportProfile, tolerance_minutes: f64) -> Self {
        Self {
            provider,
            profile,
            tolerance_minutes,
        }
    }

    pub async fn evaluate(
        &self,
        candidate: Coordinate,
        origins: &[Coordinate],
        objective: Objective,
        effective_budget: u32,
    ) -> Result<Evaluation> {
        let requests = origins.iter().map(|&origin| async move {
            self.provider
                .duration_seconds(origin, candidate, self.profile)
                .await
        });
        let durations = join_ordered("directions", requests).await?;

        let eta_minutes: Vec<f64> = durations.into_iter().map(seconds_to_minutes).collect();
        let objective_value = objective_value(objective, &eta_minutes);
        let reachable = within_budget(&eta_minutes, effective_budget, self.tolerance_minutes);

        tracing::debug!(
            "Evaluated candidate {}: etas {:?}, {} = {}, reachable = {}",
            candidate,
            eta_minutes,
            objective,
            objective_value,
            reachable
        );

        Ok(Evaluation {
            eta_minutes,
            objective_value,
            reachable,
        })
    }
}

/// Seconds to minutes, rounded to one decimal with ties to even.
pub fn seconds_to_minutes(seconds: f64) -> f64 {
    (seconds / 60.0 * 10.0).round_ties_even() / 10.0
}

/// Sum or maximum of the participant times, rounded to two decimals.
pub fn objective_value(objective: Objective, eta_minutes: &[f64]) -> f64 {
    let value = match objective {
        Objective::MinSum => eta_minutes.iter().sum(),
        Objective::MinMax => eta_minutes.iter().copied().fold(0.0, f64::max),
    };
    (value * 100.0).round_ties_even() / 100.0
}

/// The tolerance absorbs disagreement between isochrone and directions data.
pub fn within_budget(eta_minutes: &[f64], budget: u32, tolerance_minutes: f64) -> bool {
    let limit = budget as f64 + tolerance_minutes;
    eta_minutes.iter().all(|&eta| eta <= limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    #[test]
    fn test_seconds_to_minutes_rounding() {
        assert_eq!(seconds_to_minutes(600.0), 10.0);
        assert_eq!(seconds_to_minutes(632.0), 10.5);
        assert_eq!(seconds_to_minutes(0.0), 0.0);
    }

    #[test]
    fn test_quarter_minutes_round_to_even() {
        let minutes: Vec<f64> = [15.0, 75.0, 915.0, 45.0]
            .into_iter()
            .map(seconds_to_minutes)
            .collect();
        assert_eq!(minutes, vec![0.2, 1.2, 15.2, 0.8]);
    }

    #[test]
    fn test_objective_values() {
        let etas = [10.0, 12.5, 7.25];
        assert_eq!(objective_value(Objective::MinSum, &etas), 29.75);
        assert_eq!(objective_value(Objective::MinMax, &etas), 12.5);
        assert_eq!(objective_value(Objective::MinSum, &[0.1, 0.2]), 0.3);
        assert_eq!(objective_value(Objective::MinMax, &[0.125]), 0.12);
    }

    #[test]
    fn test_budget_tolerance() {
        assert!(within_budget(&[15.5, 3.0], 15, 0.5));
        assert!(!within_budget(&[15.6, 3.0], 15, 0.5));
        assert!(within_budget(&[], 15, 0.5));
    }

    /// Duration grows with the origin's longitude so each participant differs.
    struct ByLongitude;

    #[async_trait]
    impl RoutingProvider for ByLongitude {
        async fn duration_seconds(
            &self,
            origin: Coordinate,
            _destination: Coordinate,
            _profile: TransportProfile,
        ) -> Result<f64> {
            tokio::time::sleep(std::time::Duration::from_millis((10.0 - origin.lng) as u64 * 5)).await;
            Ok(origin.lng * 300.0)
        }
    }

    #[tokio::test]
    async fn test_evaluate_keeps_participant_order() {
        let evaluator = FeasibilityEvaluator::new(&ByLongitude, TransportProfile::Walking, 0.5);
        let origins = [
            Coordinate::new(1.0, 0.0),
            Coordinate::new(4.0, 0.0),
            Coordinate::new(2.0, 0.0),
        ];

        let evaluation = evaluator
            .evaluate(Coordinate::new(0.0, 0.0), &origins, Objective::MinMax, 15)
            .await
            .unwrap();

        assert_eq!(evaluation.eta_minutes, vec![5.0, 20.0, 10.0]);
        assert_eq!(evaluation.objective_value, 20.0);
        assert!(!evaluation.reachable);
    }
}
