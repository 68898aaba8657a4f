use crate::config::toml_config::MapboxSettings;
use crate::core::geometry::Region;
use crate::domain::geojson::GeoJsonGeometry;
use crate::domain::model::{Coordinate, TransportProfile};
use crate::domain::ports::{GeocodingProvider, ReachabilityProvider, RoutingProvider};
use crate::utils::error::{MeetError, Provider, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    features: Vec<GeocodingFeature>,
}

#[derive(Debug, Deserialize)]
struct GeocodingFeature {
    geometry: PointGeometry,
}

#[derive(Debug, Deserialize)]
struct PointGeometry {
    coordinates: (f64, f64),
}

#[derive(Debug, Deserialize)]
struct IsochroneResponse {
    #[serde(default)]
    features: Vec<IsochroneFeature>,
}

#[derive(Debug, Deserialize)]
struct IsochroneFeature {
    geometry: Option<GeoJsonGeometry>,
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    routes: Vec<Route>,
}

#[derive(Debug, Deserialize)]
struct Route {
    duration: Option<f64>,
}

/// Mapbox Geocoding, Isochrone and Directions behind the provider ports.
#[derive(Clone)]
pub struct MapboxClient {
    client: Client,
    base_url: Url,
    token: String,
}

impl MapboxClient {
    pub fn new(settings: &MapboxSettings, token: impl Into<String>) -> Result<Self> {
        let base_url = Url::parse(&settings.base_url).map_err(|e| MeetError::InvalidConfigValue {
            field: "mapbox.base_url".to_string(),
            value: settings.base_url.clone(),
            reason: e.to_string(),
        })?;
        let client = Client::builder().timeout(settings.timeout()).build()?;

        Ok(Self {
            client,
            base_url,
            token: token.into(),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| MeetError::Config {
                message: format!("base URL cannot carry a path: {}", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        provider: Provider,
        url: Url,
        params: &[(&str, String)],
        context: &str,
    ) -> Result<T> {
        tracing::debug!("Calling {} endpoint {}", provider, url.path());

        let response = self
            .client
            .get(url)
            .query(params)
            .query(&[("access_token", self.token.as_str())])
            .send()
            .await
            .map_err(|e| MeetError::ProviderUnavailable {
                provider,
                context: context.to_string(),
                message: e.to_string(),
            })?;

        check_status(provider, response.status(), context)?;

        response
            .json::<T>()
            .await
            .map_err(|e| MeetError::ProviderUnavailable {
                provider,
                context: context.to_string(),
                message: format!("malformed response: {}", e),
            })
    }
}

fn check_status(provider: Provider, status: StatusCode, context: &str) -> Result<()> {
    let context = context.to_string();
    match status {
        s if s.is_success() => Ok(()),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Err(MeetError::ProviderAuth { provider, context })
        }
        StatusCode::TOO_MANY_REQUESTS => Err(MeetError::ProviderRateLimited { provider, context }),
        StatusCode::NOT_FOUND => Err(MeetError::ProviderNotFound { provider, context }),
        s if s.is_server_error() => Err(MeetError::ProviderUnavailable {
            provider,
            context,
            message: format!("status {}", s.as_u16()),
        }),
        s => Err(MeetError::ProviderRejected {
            provider,
            status: s.as_u16(),
            context,
        }),
    }
}

#[async_trait]
impl GeocodingProvider for MapboxClient {
    async fn resolve(&self, address: &str, city_hint: Option<&str>) -> Result<Coordinate> {
        let query = crate::domain::address::geocoding_query(address, city_hint);
        let url = self.endpoint(&["geocoding", "v5", "mapbox.places", &format!("{}.json", query)])?;
        let context = format!("address '{}'", address);
        let params = [
            ("limit", "1".to_string()),
            ("autocomplete", "false".to_string()),
        ];

        let body: GeocodingResponse = self
            .get_json(Provider::Geocoding, url, &params, &context)
            .await?;

        let feature = body.features.into_iter().next().ok_or(MeetError::ProviderNotFound {
            provider: Provider::Geocoding,
            context,
        })?;
        let (lng, lat) = feature.geometry.coordinates;
        Ok(Coordinate::new(lng, lat))
    }
}

#[async_trait]
impl ReachabilityProvider for MapboxClient {
    async fn area_for(
        &self,
        coordinate: Coordinate,
        minutes: u32,
        profile: TransportProfile,
    ) -> Result<Region> {
        let location = format!("{},{}", coordinate.lng, coordinate.lat);
        let url = self.endpoint(&["isochrone", "v1", "mapbox", profile.as_str(), &location])?;
        let context = format!("coordinate {} at {} min", coordinate, minutes);
        let params = [
            ("contours_minutes", minutes.to_string()),
            ("polygons", "true".to_string()),
        ];

        let body: IsochroneResponse = self
            .get_json(Provider::Reachability, url, &params, &context)
            .await?;

        let geometry = body
            .features
            .into_iter()
            .next()
            .and_then(|f| f.geometry)
            .ok_or_else(|| MeetError::EmptyGeometry {
                context: context.clone(),
            })?;
        let region = geometry.to_region().ok_or_else(|| MeetError::ProviderUnavailable {
            provider: Provider::Reachability,
            context: context.clone(),
            message: "malformed isochrone geometry".to_string(),
        })?;

        if region.area() <= 0.0 {
            return Err(MeetError::EmptyGeometry { context });
        }
        Ok(region)
    }
}

#[async_trait]
impl RoutingProvider for MapboxClient {
    async fn duration_seconds(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        profile: TransportProfile,
    ) -> Result<f64> {
        let waypoints = format!(
            "{},{};{},{}",
            origin.lng, origin.lat, destination.lng, destination.lat
        );
        let url = self.endpoint(&["directions", "v5", "mapbox", profile.as_str(), &waypoints])?;
        let context = format!("route {} -> {}", origin, destination);
        let params = [
            ("overview", "false".to_string()),
            ("alternatives", "false".to_string()),
            ("annotations", "duration".to_string()),
            ("geometries", "geojson".to_string()),
        ];

        let body: DirectionsResponse = self
            .get_json(Provider::Routing, url, &params, &context)
            .await?;

        body.routes
            .into_iter()
            .next()
            .and_then(|r| r.duration)
            .ok_or(MeetError::MissingDuration { context })
    }
}
