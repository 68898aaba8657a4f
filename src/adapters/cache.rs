use crate::config::toml_config::CacheSettings;
use crate::domain::model::Coordinate;
use moka::future::Cache;
use std::time::Duration;

/// Process-wide address to coordinate cache, bounded in size and age.
///
/// Cloning is cheap and every clone shares the same entries. Two resolutions
/// racing on the same uncached address may both geocode it; the later insert
/// wins and both values are equal.
#[derive(Clone)]
pub struct GeocodeCache {
    entries: Cache<String, Coordinate>,
}

impl GeocodeCache {
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub fn from_settings(settings: &CacheSettings) -> Self {
        Self::new(settings.max_capacity, Duration::from_secs(settings.ttl_seconds))
    }

    pub async fn get(&self, key: &str) -> Option<Coordinate> {
        self.entries.get(key).await
    }

    pub async fn insert(&self, key: String, coordinate: Coordinate) {
        self.entries.insert(key, coordinate).await;
    }
}

impl Default for GeocodeCache {
    fn default() -> Self {
        Self::from_settings(&CacheSettings::default())
    }
}
