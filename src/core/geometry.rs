//! Intersection of reachability regions and reduction to one polygon.
//!
//! Regions are a closed variant so that normalization is a total function:
//! whatever a provider hands back, [`normalize`] yields either a single
//! polygon or [`Region::Empty`].

use crate::utils::error::{MeetError, Result};
use geo::{Area, BooleanOps, LineString, MultiPolygon, Point, Polygon};

#[derive(Debug, Clone, PartialEq)]
pub enum Region {
    Empty,
    Point(Point<f64>),
    Line(LineString<f64>),
    Polygon(Polygon<f64>),
    MultiPolygon(MultiPolygon<f64>),
    Collection(Vec<Region>),
}

impl Region {
    pub fn is_empty(&self) -> bool {
        match self {
            Region::Empty => true,
            Region::Point(_) => false,
            Region::Line(line) => line.0.is_empty(),
            Region::Polygon(p) => p.exterior().0.is_empty(),
            Region::MultiPolygon(mp) => mp.0.iter().all(|p| p.exterior().0.is_empty()),
            Region::Collection(members) => members.iter().all(Region::is_empty),
        }
    }

    /// Summed area of the polygonal members; points and lines count as zero.
    pub fn area(&self) -> f64 {
        match self {
            Region::Polygon(p) => p.unsigned_area(),
            Region::MultiPolygon(mp) => mp.unsigned_area(),
            Region::Collection(members) => members.iter().map(Region::area).sum(),
            Region::Empty | Region::Point(_) | Region::Line(_) => 0.0,
        }
    }

    /// The polygonal part of this region as one multi-polygon. Members of a
    /// collection are unioned so overlapping parts are not counted twice.
    pub fn areal(&self) -> MultiPolygon<f64> {
        match self {
            Region::Polygon(p) => MultiPolygon::new(vec![p.clone()]),
            Region::MultiPolygon(mp) => mp.clone(),
            Region::Collection(members) => members
                .iter()
                .map(Region::areal)
                .filter(|mp| !mp.0.is_empty())
                .reduce(|acc, mp| acc.union(&mp))
                .unwrap_or_else(|| MultiPolygon::new(vec![])),
            Region::Empty | Region::Point(_) | Region::Line(_) => MultiPolygon::new(vec![]),
        }
    }
}

impl From<Polygon<f64>> for Region {
    fn from(p: Polygon<f64>) -> Self {
        Region::Polygon(p)
    }
}

impl From<MultiPolygon<f64>> for Region {
    /// Drops zero-area slivers left behind by boolean operations.
    fn from(mp: MultiPolygon<f64>) -> Self {
        let parts: Vec<_> = mp.0.into_iter().filter(|p| p.unsigned_area() > 0.0).collect();
        if parts.is_empty() {
            Region::Empty
        } else {
            Region::MultiPolygon(MultiPolygon::new(parts))
        }
    }
}

/// Left-fold intersection of the regions in participant order.
///
/// Fails with an invariant violation when `regions` is empty; callers always
/// pass one region per participant and there is at least one participant.
pub fn reduce_regions(regions: &[Region]) -> Result<Region> {
    let (first, rest) = regions
        .split_first()
        .ok_or_else(|| MeetError::invariant("cannot intersect zero reachability regions"))?;

    let mut acc = first.areal();
    for region in rest {
        if acc.0.is_empty() {
            break;
        }
        acc = acc.intersection(&region.areal());
    }
    Ok(Region::from(acc))
}

/// Reduces any region to its largest polygonal component.
pub fn normalize(region: &Region) -> Region {
    if region.is_empty() {
        return region.clone();
    }
    match region {
        Region::Polygon(p) => Region::Polygon(p.clone()),
        Region::MultiPolygon(mp) => largest_component(&mp.0),
        Region::Collection(_) => largest_component(&region.areal().0),
        Region::Empty | Region::Point(_) | Region::Line(_) => Region::Empty,
    }
}

// Ties keep the first polygon encountered.
fn largest_component(polygons: &[Polygon<f64>]) -> Region {
    let mut best: Option<(&Polygon<f64>, f64)> = None;
    for polygon in polygons {
        let area = polygon.unsigned_area();
        match best {
            Some((_, best_area)) if best_area >= area => {}
            _ => best = Some((polygon, area)),
        }
    }
    best.map(|(p, _)| Region::Polygon(p.clone()))
        .unwrap_or(Region::Empty)
}

/// Normalized common region of all participants at one budget.
#[derive(Debug, Clone, PartialEq)]
pub struct FeasibleRegion {
    pub polygon: Polygon<f64>,
    pub budget: u32,
}

impl FeasibleRegion {
    pub fn area(&self) -> f64 {
        self.polygon.unsigned_area()
    }
}

/// Intersects and normalizes; `None` when no common area exists.
pub fn feasible_region(regions: &[Region], budget: u32) -> Result<Option<FeasibleRegion>> {
    let raw = reduce_regions(regions)?;
    match normalize(&raw) {
        Region::Polygon(polygon) if !polygon.exterior().0.is_empty() => {
            Ok(Some(FeasibleRegion { polygon, budget }))
        }
        _ => Ok(None),
    }
}
