// Adapters layer: concrete implementations of the provider ports and the geocoding cache.

pub mod cache;
pub mod mapbox;
