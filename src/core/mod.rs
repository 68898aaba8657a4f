pub mod candidate;
pub mod engine;
pub mod escalation;
pub mod evaluation;
pub mod fanout;
pub mod geometry;

pub use crate::domain::model::{MeetingRequest, ResolutionResult};
pub use crate::domain::ports::{GeocodingProvider, ReachabilityProvider, RoutingProvider};
pub use crate::utils::error::Result;
