use crate::core::fanout::join_ordered;
use crate::core::geometry::{feasible_region, FeasibleRegion, Region};
use crate::domain::model::{Coordinate, TransportProfile};
use crate::domain::ports::ReachabilityProvider;
use crate::utils::error::{MeetError, Result};
use serde::{Deserialize, Serialize};

/// Bounds on how far the budget may be raised when no common region exists.
///
/// Every attempt costs one isochrone request per participant. The default of
/// a single escalation can report "no common region" where a further step
/// would have found one; raise `max_escalations` to search further.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EscalationPolicy {
    pub step: u32,
    pub ceiling: u32,
    pub max_escalations: u32,
}

impl Default for EscalationPolicy {
    fn default() -> Self {
        Self {
            step: crate::ESCALATION_STEP_MINUTES,
            ceiling: crate::MAX_MAX_MINUTES,
            max_escalations: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EscalationOutcome {
    Found(FeasibleRegion),
    /// No common region at any tried budget; `budget` is the last one tried.
    Exhausted { budget: u32 },
}

pub struct BudgetEscalator<'a, R: ReachabilityProvider> {
    provider: &'a R,
    policy: EscalationPolicy,
    profile: TransportProfile,
}

impl<'a, R: ReachabilityProvider> BudgetEscalator<'a, R> {
    pub fn new(provider: &'a R, policy: EscalationPolicy, profile: TransportProfile) -> Self {
        Self {
            provider,
            policy,
            profile,
        }
    }

    /// Finds the smallest tried budget, starting at `start`, whose feasible
    /// region is non-empty.
    pub async fn search(&self, coordinates: &[Coordinate], start: u32) -> Result<EscalationOutcome> {
        let mut budget = start;
        let mut escalations = 0;

        loop {
            let regions = self.fetch_regions(coordinates, budget).await?;
            if let Some(region) = feasible_region(&regions, budget)? {
                tracing::debug!(
                    "Feasible region found at {} min (area {:.3e})",
                    budget,
                    region.area()
                );
                return Ok(EscalationOutcome::Found(region));
            }

            let next = budget.saturating_add(self.policy.step).min(self.policy.ceiling);
            if next <= budget || escalations >= self.policy.max_escalations {
                tracing::info!("No common reachable region up to {} min", budget);
                return Ok(EscalationOutcome::Exhausted { budget });
            }

            tracing::info!(
                "No common reachable region at {} min, escalating to {} min",
                budget,
                next
            );
            budget = next;
            escalations += 1;
        }
    }

    async fn fetch_regions(&self, coordinates: &[Coordinate], minutes: u32) -> Result<Vec<Region>> {
        tracing::debug!(
            "Fetching {} isochrones at {} min",
            coordinates.len(),
            minutes
        );
        let requests = coordinates.iter().map(|&coordinate| async move {
            match self.provider.area_for(coordinate, minutes, self.profile).await {
                // An empty area just means nothing is shared at this budget.
                Err(MeetError::EmptyGeometry { context }) => {
                    tracing::debug!("Empty isochrone treated as empty region ({})", context);
                    Ok(Region::Empty)
                }
                other => other,
            }
        });
        join_ordered("isochrone", requests).await
    }
}
