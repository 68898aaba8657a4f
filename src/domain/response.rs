use crate::domain::geojson::GeoJsonGeometry;
use crate::domain::model::{InfeasibilityReason, Objective, ResolutionResult};
use crate::utils::error::Result;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticipantView {
    pub address: String,
    pub lat: f64,
    pub lng: f64,
    pub eta_minutes: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DebugInfo {
    pub intersection_polygons_geojson: GeoJsonGeometry,
    /// Always `null`; only one candidate is evaluated.
    pub candidate_points_geojson: Option<GeoJsonGeometry>,
}

/// Serialized form of a [`ResolutionResult`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeetingPointResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meeting_point: Option<LatLng>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub participants: Vec<ParticipantView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub objective: Option<Objective>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub objective_value: Option<f64>,
    pub max_minutes: u32,
    pub reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<InfeasibilityReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<DebugInfo>,
}

impl MeetingPointResponse {
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}

impl From<&ResolutionResult> for MeetingPointResponse {
    fn from(result: &ResolutionResult) -> Self {
        match result {
            ResolutionResult::NoCommonRegion { effective_budget } => Self {
                meeting_point: None,
                participants: Vec::new(),
                objective: None,
                objective_value: None,
                max_minutes: *effective_budget,
                reachable: false,
                reason: Some(InfeasibilityReason::NoCommonReachableRegion),
                debug: None,
            },
            ResolutionResult::Resolved(resolution) => Self {
                meeting_point: Some(LatLng {
                    lat: resolution.meeting_point.lat,
                    lng: resolution.meeting_point.lng,
                }),
                participants: resolution
                    .participants
                    .iter()
                    .map(|p| ParticipantView {
                        address: p.address.clone(),
                        lat: p.coordinate.lat,
                        lng: p.coordinate.lng,
                        eta_minutes: p.eta_minutes,
                    })
                    .collect(),
                objective: Some(resolution.objective),
                objective_value: Some(resolution.objective_value),
                max_minutes: resolution.effective_budget,
                reachable: resolution.reachable,
                reason: resolution.reason(),
                debug: Some(DebugInfo {
                    intersection_polygons_geojson: GeoJsonGeometry::from(&resolution.region),
                    candidate_points_geojson: None,
                }),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::tests::square;
    use crate::domain::model::{Coordinate, ParticipantOutcome, Resolution};
    use serde_json::json;

    #[test]
    fn test_no_common_region_shape() {
        let result = ResolutionResult::NoCommonRegion { effective_budget: 20 };
        let value = serde_json::to_value(MeetingPointResponse::from(&result)).unwrap();
        assert_eq!(
            value,
            json!({
                "max_minutes": 20,
                "reachable": false,
                "reason": "no_common_reachable_region"
            })
        );
    }

    #[test]
    fn test_resolved_shape() {
        let result = ResolutionResult::Resolved(Resolution {
            meeting_point: Coordinate::new(0.5, 0.25),
            participants: vec![ParticipantOutcome {
                address: "A st".to_string(),
                coordinate: Coordinate::new(1.0, 2.0),
                eta_minutes: 16.2,
            }],
            objective: Objective::MinMax,
            objective_value: 16.2,
            effective_budget: 15,
            reachable: false,
            region: square(0.0, 0.0, 1.0),
        });
        let value = serde_json::to_value(MeetingPointResponse::from(&result)).unwrap();

        assert_eq!(value["meeting_point"], json!({"lat": 0.25, "lng": 0.5}));
        assert_eq!(
            value["participants"][0],
            json!({"address": "A st", "lat": 2.0, "lng": 1.0, "eta_minutes": 16.2})
        );
        assert_eq!(value["objective"], "min_max");
        assert_eq!(value["reason"], "travel_time_exceeds_budget");
        assert_eq!(value["debug"]["intersection_polygons_geojson"]["type"], "Polygon");
        assert!(value["debug"]["candidate_points_geojson"].is_null());
        assert!(value["debug"].as_object().unwrap().contains_key("candidate_points_geojson"));
    }

    #[test]
    fn test_to_json_pretty_and_compact() {
        let result = ResolutionResult::NoCommonRegion { effective_budget: 15 };
        let response = MeetingPointResponse::from(&result);

        let compact = response.to_json(false).unwrap();
        assert!(!compact.contains('\n'));
        assert!(compact.contains("\"max_minutes\":15"));

        let pretty = response.to_json(true).unwrap();
        assert!(pretty.contains('\n'));
        let parsed: serde_json::Value = serde_json::from_str(&pretty).unwrap();
        assert_eq!(parsed["reason"], "no_common_reachable_region");
    }
}
