use crate::core::geometry::Region;
use crate::domain::model::{Coordinate, TransportProfile};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Resolves a street address to a coordinate.
/// An empty match set must surface as `ProviderNotFound`.
#[async_trait]
pub trait GeocodingProvider: Send + Sync {
    async fn resolve(&self, address: &str, city_hint: Option<&str>) -> Result<Coordinate>;
}

/// Fetches the area reachable from a coordinate within `minutes`.
/// Zero-area answers surface as `EmptyGeometry`.
#[async_trait]
pub trait ReachabilityProvider: Send + Sync {
    async fn area_for(
        &self,
        coordinate: Coordinate,
        minutes: u32,
        profile: TransportProfile,
    ) -> Result<Region>;
}

#[async_trait]
pub trait RoutingProvider: Send + Sync {
    async fn duration_seconds(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        profile: TransportProfile,
    ) -> Result<f64>;
}

#[async_trait]
impl<T: GeocodingProvider + ?Sized> GeocodingProvider for std::sync::Arc<T> {
    async fn resolve(&self, address: &str, city_hint: Option<&str>) -> Result<Coordinate> {
        (**self).resolve(address, city_hint).await
    }
}

#[async_trait]
impl<T: ReachabilityProvider + ?Sized> ReachabilityProvider for std::sync::Arc<T> {
    async fn area_for(
        &self,
        coordinate: Coordinate,
        minutes: u32,
        profile: TransportProfile,
    ) -> Result<Region> {
        (**self).area_for(coordinate, minutes, profile).await
    }
}

#[async_trait]
impl<T: RoutingProvider + ?Sized> RoutingProvider for std::sync::Arc<T> {
    async fn duration_seconds(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        profile: TransportProfile,
    ) -> Result<f64> {
        (**self).duration_seconds(origin, destination, profile).await
    }
}
