use crate::utils::error::MeetError;
use geo::Polygon;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lng: f64,
    pub lat: f64,
}

impl Coordinate {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lng, self.lat)
    }
}

impl From<Coordinate> for geo::Coord<f64> {
    fn from(c: Coordinate) -> Self {
        geo::Coord { x: c.lng, y: c.lat }
    }
}

impl From<geo::Point<f64>> for Coordinate {
    fn from(p: geo::Point<f64>) -> Self {
        Coordinate::new(p.x(), p.y())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportProfile {
    Walking,
}

impl TransportProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportProfile::Walking => "walking",
        }
    }
}

impl fmt::Display for TransportProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransportProfile {
    type Err = MeetError;

    /// Accepts bare names and the `mapbox/` prefixed form, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        let name = lowered.strip_prefix("mapbox/").unwrap_or(&lowered);
        match name {
            "walking" => Ok(TransportProfile::Walking),
            _ => Err(MeetError::invalid_input(
                "profile",
                "profile must be one of: walking",
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    MinSum,
    MinMax,
}

impl Objective {
    pub fn as_str(&self) -> &'static str {
        match self {
            Objective::MinSum => "min_sum",
            Objective::MinMax => "min_max",
        }
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Objective {
    type Err = MeetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "min_sum" => Ok(Objective::MinSum),
            "min_max" => Ok(Objective::MinMax),
            _ => Err(MeetError::invalid_input(
                "objective",
                "objective must be one of: min_max, min_sum",
            )),
        }
    }
}

/// One call to the resolve operation.
#[derive(Debug, Clone, PartialEq)]
pub struct MeetingRequest {
    pub addresses: Vec<String>,
    pub profile: TransportProfile,
    pub max_minutes: u32,
    pub objective: Objective,
    pub city_hint: Option<String>,
}

impl MeetingRequest {
    pub fn new<I, S>(addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            addresses: addresses.into_iter().map(Into::into).collect(),
            profile: TransportProfile::Walking,
            max_minutes: crate::DEFAULT_MAX_MINUTES,
            objective: Objective::MinSum,
            city_hint: None,
        }
    }

    pub fn with_max_minutes(mut self, minutes: u32) -> Self {
        self.max_minutes = minutes;
        self
    }

    pub fn with_objective(mut self, objective: Objective) -> Self {
        self.objective = objective;
        self
    }

    pub fn with_profile(mut self, profile: TransportProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_city_hint(mut self, hint: impl Into<String>) -> Self {
        self.city_hint = Some(hint.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticipantOutcome {
    pub address: String,
    pub coordinate: Coordinate,
    pub eta_minutes: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InfeasibilityReason {
    NoCommonReachableRegion,
    TravelTimeExceedsBudget,
}

impl InfeasibilityReason {
    pub fn code(&self) -> &'static str {
        match self {
            InfeasibilityReason::NoCommonReachableRegion => "no_common_reachable_region",
            InfeasibilityReason::TravelTimeExceedsBudget => "travel_time_exceeds_budget",
        }
    }
}

/// Terminal state of one resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Resolved,
    InfeasibleByTravelTime,
    InfeasibleByNoCommonRegion,
}

/// A meeting point with evaluated travel times. `reachable` may still be
/// false when a participant's routed time exceeds the budget.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub meeting_point: Coordinate,
    pub participants: Vec<ParticipantOutcome>,
    pub objective: Objective,
    pub objective_value: f64,
    pub effective_budget: u32,
    pub reachable: bool,
    pub region: Polygon<f64>,
}

impl Resolution {
    pub fn reason(&self) -> Option<InfeasibilityReason> {
        if self.reachable {
            None
        } else {
            Some(InfeasibilityReason::TravelTimeExceedsBudget)
        }
    }
}

#[derive(Debug, Clone)]
pub enum ResolutionResult {
    NoCommonRegion { effective_budget: u32 },
    Resolved(Resolution),
}

impl ResolutionResult {
    pub fn outcome(&self) -> Outcome {
        match self {
            ResolutionResult::NoCommonRegion { .. } => Outcome::InfeasibleByNoCommonRegion,
            ResolutionResult::Resolved(r) if r.reachable => Outcome::Resolved,
            ResolutionResult::Resolved(_) => Outcome::InfeasibleByTravelTime,
        }
    }

    pub fn effective_budget(&self) -> u32 {
        match self {
            ResolutionResult::NoCommonRegion { effective_budget } => *effective_budget,
            ResolutionResult::Resolved(r) => r.effective_budget,
        }
    }

    pub fn reason(&self) -> Option<InfeasibilityReason> {
        match self {
            ResolutionResult::NoCommonRegion { .. } => {
                Some(InfeasibilityReason::NoCommonReachableRegion)
            }
            ResolutionResult::Resolved(r) => r.reason(),
        }
    }

    pub fn resolution(&self) -> Option<&Resolution> {
        match self {
            ResolutionResult::Resolved(r) => Some(r),
            ResolutionResult::NoCommonRegion { .. } => None,
        }
    }
}
