pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

/// Upper bound on participants per request.
pub const MAX_PARTICIPANTS: usize = 10;
pub const DEFAULT_MAX_MINUTES: u32 = 15;
pub const MIN_MAX_MINUTES: u32 = 5;
/// Hard ceiling for the travel time budget, escalation included.
pub const MAX_MAX_MINUTES: u32 = 60;
pub const ESCALATION_STEP_MINUTES: u32 = 5;
/// Slack between isochrone-derived regions and routed travel times.
pub const BUDGET_TOLERANCE_MINUTES: f64 = 0.5;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{cache::GeocodeCache, mapbox::MapboxClient};
pub use config::toml_config::{EngineSettings, TomlConfig};
pub use core::engine::MeetingPointEngine;
pub use domain::model::{
    Coordinate, MeetingRequest, Objective, Outcome, ResolutionResult, TransportProfile,
};
pub use domain::response::MeetingPointResponse;
pub use utils::error::{MeetError, Result};
