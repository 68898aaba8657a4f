use crate::adapters::cache::GeocodeCache;
use crate::config::toml_config::EngineSettings;
use crate::core::escalation::{BudgetEscalator, EscalationOutcome};
use crate::core::evaluation::FeasibilityEvaluator;
use crate::core::fanout::join_ordered;
use crate::domain::address::{cache_key, deduplicate_addresses};
use crate::domain::model::{
    Coordinate, MeetingRequest, ParticipantOutcome, Resolution, ResolutionResult,
};
use crate::domain::ports::{GeocodingProvider, ReachabilityProvider, RoutingProvider};
use crate::utils::error::{MeetError, Result};

/// Resolves a fair meeting point for a group of addresses.
///
/// Stages run strictly one after another (geocoding, isochrones, candidate
/// selection, travel times); calls inside a stage run concurrently.
pub struct MeetingPointEngine<G, R, D>
where
    G: GeocodingProvider,
    R: ReachabilityProvider,
    D: RoutingProvider,
{
    geocoder: G,
    reachability: R,
    routing: D,
    cache: GeocodeCache,
    settings: EngineSettings,
}

impl<G, R, D> MeetingPointEngine<G, R, D>
where
    G: GeocodingProvider,
    R: ReachabilityProvider,
    D: RoutingProvider,
{
    pub fn new(
        geocoder: G,
        reachability: R,
        routing: D,
        cache: GeocodeCache,
        settings: EngineSettings,
    ) -> Self {
        Self {
            geocoder,
            reachability,
            routing,
            cache,
            settings,
        }
    }

    pub async fn resolve(&self, request: &MeetingRequest) -> Result<ResolutionResult> {
        let addresses = self.prepare_addresses(request)?;
        tracing::info!(
            "Resolving meeting point for {} participants ({}, {} min, {})",
            addresses.len(),
            request.profile,
            request.max_minutes,
            request.objective
        );

        let coordinates = self
            .geocode_all(&addresses, request.city_hint.as_deref())
            .await?;

        let escalator = BudgetEscalator::new(
            &self.reachability,
            self.settings.escalation,
            request.profile,
        );
        let region = match escalator.search(&coordinates, request.max_minutes).await? {
            EscalationOutcome::Found(region) => region,
            EscalationOutcome::Exhausted { budget } => {
                return Ok(ResolutionResult::NoCommonRegion {
                    effective_budget: budget,
                });
            }
        };

        let meeting_point = self.settings.candidate_strategy.select(&region)?;
        tracing::debug!("Meeting candidate {} at {} min", meeting_point, region.budget);

        let evaluator = FeasibilityEvaluator::new(
            &self.routing,
            request.profile,
            self.settings.tolerance_minutes,
        );
        let evaluation = evaluator
            .evaluate(meeting_point, &coordinates, request.objective, region.budget)
            .await?;

        let participants = addresses
            .into_iter()
            .zip(coordinates)
            .zip(evaluation.eta_minutes)
            .map(|((address, coordinate), eta_minutes)| ParticipantOutcome {
                address,
                coordinate,
                eta_minutes,
            })
            .collect();

        if !evaluation.reachable {
            tracing::info!(
                "Meeting point {} exceeds the {} min budget for at least one participant",
                meeting_point,
                region.budget
            );
        }

        Ok(ResolutionResult::Resolved(Resolution {
            meeting_point,
            participants,
            objective: request.objective,
            objective_value: evaluation.objective_value,
            effective_budget: region.budget,
            reachable: evaluation.reachable,
            region: region.polygon,
        }))
    }

    /// Validates the request and returns the deduplicated addresses.
    fn prepare_addresses(&self, request: &MeetingRequest) -> Result<Vec<String>> {
        let non_blank = request
            .addresses
            .iter()
            .filter(|a| !a.trim().is_empty())
            .count();
        if non_blank == 0 {
            return Err(MeetError::invalid_input("addresses", "addresses cannot be empty"));
        }
        if non_blank > self.settings.max_participants {
            return Err(MeetError::invalid_input(
                "addresses",
                format!(
                    "maximum {} addresses are supported",
                    self.settings.max_participants
                ),
            ));
        }

        let min = self.settings.min_budget;
        let max = self.settings.max_budget();
        if request.max_minutes < min || request.max_minutes > max {
            return Err(MeetError::invalid_input(
                "max_minutes",
                format!("must be between {} and {}", min, max),
            ));
        }

        let addresses = deduplicate_addresses(&request.addresses);
        if addresses.len() < non_blank {
            tracing::debug!(
                "Collapsed {} duplicate addresses",
                non_blank - addresses.len()
            );
        }
        Ok(addresses)
    }

    async fn geocode_all(
        &self,
        addresses: &[String],
        city_hint: Option<&str>,
    ) -> Result<Vec<Coordinate>> {
        let lookups = addresses
            .iter()
            .map(|address| self.geocode(address, city_hint));
        join_ordered("geocoding", lookups).await
    }

    async fn geocode(&self, address: &str, city_hint: Option<&str>) -> Result<Coordinate> {
        let key = cache_key(address, city_hint);
        if let Some(coordinate) = self.cache.get(&key).await {
            tracing::debug!("Geocode cache hit for '{}'", address);
            return Ok(coordinate);
        }

        let coordinate = self.geocoder.resolve(address, city_hint).await?;
        self.cache.insert(key, coordinate).await;
        Ok(coordinate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::tests::square;
    use crate::core::geometry::Region;
    use crate::domain::model::{Objective, Outcome, TransportProfile};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct Fixed {
        geocode_calls: AtomicUsize,
    }

    #[async_trait]
    impl GeocodingProvider for Fixed {
        async fn resolve(&self, address: &str, _city_hint: Option<&str>) -> Result<Coordinate> {
            self.geocode_calls.fetch_add(1, Ordering::SeqCst);
            Ok(Coordinate::new(address.len() as f64, 0.0))
        }
    }

    #[async_trait]
    impl ReachabilityProvider for Fixed {
        async fn area_for(
            &self,
            _coordinate: Coordinate,
            _minutes: u32,
            _profile: TransportProfile,
        ) -> Result<Region> {
            Ok(Region::from(square(0.0, 0.0, 1.0)))
        }
    }

    #[async_trait]
    impl RoutingProvider for Fixed {
        async fn duration_seconds(
            &self,
            _origin: Coordinate,
            _destination: Coordinate,
            _profile: TransportProfile,
        ) -> Result<f64> {
            Ok(600.0)
        }
    }

    type FixedEngine = MeetingPointEngine<Arc<Fixed>, Arc<Fixed>, Arc<Fixed>>;

    fn engine(provider: &Arc<Fixed>, cache: GeocodeCache) -> FixedEngine {
        MeetingPointEngine::new(
            provider.clone(),
            provider.clone(),
            provider.clone(),
            cache,
            EngineSettings::default(),
        )
    }

    #[tokio::test]
    async fn test_resolves_unit_square() {
        let provider = Arc::new(Fixed::default());
        let engine = engine(&provider, GeocodeCache::default());

        let result = engine
            .resolve(&MeetingRequest::new(["A st", "B street"]))
            .await
            .unwrap();

        assert_eq!(result.outcome(), Outcome::Resolved);
        let resolution = result.resolution().unwrap();
        assert!((resolution.meeting_point.lng - 0.5).abs() < 1e-9);
        assert!((resolution.meeting_point.lat - 0.5).abs() < 1e-9);
        assert_eq!(resolution.objective, Objective::MinSum);
        assert_eq!(resolution.objective_value, 20.0);
        assert_eq!(resolution.effective_budget, 15);
    }

    #[tokio::test]
    async fn test_cache_is_shared_across_resolutions() {
        let provider = Arc::new(Fixed::default());
        let cache = GeocodeCache::default();
        let engine = engine(&provider, cache.clone());
        let request = MeetingRequest::new(["A st", "B street"]).with_city_hint("Nowhere");

        engine.resolve(&request).await.unwrap();
        engine.resolve(&request).await.unwrap();

        assert_eq!(provider.geocode_calls.load(Ordering::SeqCst), 2);
        assert!(cache.get("a st|nowhere").await.is_some());
    }

    #[tokio::test]
    async fn test_rejects_invalid_requests() {
        let provider = Arc::new(Fixed::default());
        let engine = engine(&provider, GeocodeCache::default());

        let blank = MeetingRequest::new(["  ", ""]);
        let too_many = MeetingRequest::new((0..11).map(|i| format!("Street {}", i)));
        let too_short = MeetingRequest::new(["A st"]).with_max_minutes(4);
        let too_long = MeetingRequest::new(["A st"]).with_max_minutes(61);

        for request in [blank, too_many, too_short, too_long] {
            let err = engine.resolve(&request).await.unwrap_err();
            assert!(matches!(err, MeetError::InvalidInput { .. }), "{:?}", err);
        }
        assert_eq!(provider.geocode_calls.load(Ordering::SeqCst), 0);
    }
}
