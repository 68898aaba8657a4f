use crate::core::geometry::FeasibleRegion;
use crate::domain::model::Coordinate;
use crate::utils::error::{MeetError, Result};
use geo::{Centroid, InteriorPoint};
use serde::{Deserialize, Serialize};

/// How a single meeting point is picked from the feasible polygon.
///
/// `Centroid` is the area-weighted centroid. It is cheap and reproducible but
/// can fall outside a concave polygon. `InteriorPoint` always lands inside
/// the polygon at a somewhat higher cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateStrategy {
    #[default]
    Centroid,
    InteriorPoint,
}

impl CandidateStrategy {
    pub fn select(&self, region: &FeasibleRegion) -> Result<Coordinate> {
        let point = match self {
            CandidateStrategy::Centroid => region.polygon.centroid(),
            CandidateStrategy::InteriorPoint => region.polygon.interior_point(),
        };
        point.map(Coordinate::from).ok_or_else(|| {
            MeetError::invariant("feasible region has no representative point")
        })
    }
}
