//! Dyadic covariate change statistics.
//!
//! These read fixed per-node coordinates (latitude/longitude or x/y
//! continuous columns) and return a distance between the endpoints; the
//! graph structure itself plays no role. A missing coordinate on either
//! endpoint contributes zero.

use ergm_graph::{Digraph, NodeId};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Dyadic covariate statistic identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DyadicStat {
    GeoDistance,
    LogGeoDistance,
    EuclideanDistance,
}

impl DyadicStat {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "GeoDistance" => DyadicStat::GeoDistance,
            "LogGeoDistance" => DyadicStat::LogGeoDistance,
            "EuclideanDistance" => DyadicStat::EuclideanDistance,
            _ => return None,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            DyadicStat::GeoDistance => "GeoDistance",
            DyadicStat::LogGeoDistance => "LogGeoDistance",
            DyadicStat::EuclideanDistance => "EuclideanDistance",
        }
    }

    /// Change in the statistic for adding arc `i -> j`.
    pub fn change(&self, g: &Digraph, i: NodeId, j: NodeId) -> f64 {
        match self {
            DyadicStat::GeoDistance => geo_distance(g, i, j).unwrap_or(0.0),
            DyadicStat::LogGeoDistance => match geo_distance(g, i, j) {
                Some(d) if d > 0.0 => d.ln(),
                _ => 0.0,
            },
            DyadicStat::EuclideanDistance => euclidean_distance(g, i, j).unwrap_or(0.0),
        }
    }
}

/// Great-circle distance in kilometres between nodes `i` and `j`, from the
/// latitude/longitude columns (degrees). `None` if coordinates are absent
/// or missing.
fn geo_distance(g: &Digraph, i: NodeId, j: NodeId) -> Option<f64> {
    let lat = g.attrs.latitude_index?;
    let lon = g.attrs.longitude_index?;
    let (lat1, lon1) = (
        g.attrs.continuous_value(lat, i),
        g.attrs.continuous_value(lon, i),
    );
    let (lat2, lon2) = (
        g.attrs.continuous_value(lat, j),
        g.attrs.continuous_value(lon, j),
    );
    if lat1.is_nan() || lon1.is_nan() || lat2.is_nan() || lon2.is_nan() {
        return None;
    }
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let dphi = (lat2 - lat1).to_radians();
    let dlam = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlam / 2.0).sin().powi(2);
    Some(2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt()))
}

/// Planar distance between nodes `i` and `j` from the x/y columns.
fn euclidean_distance(g: &Digraph, i: NodeId, j: NodeId) -> Option<f64> {
    let xa = g.attrs.x_index?;
    let ya = g.attrs.y_index?;
    let dx = g.attrs.continuous_value(xa, i) - g.attrs.continuous_value(xa, j);
    let dy = g.attrs.continuous_value(ya, i) - g.attrs.continuous_value(ya, j);
    if dx.is_nan() || dy.is_nan() {
        return None;
    }
    Some((dx * dx + dy * dy).sqrt())
}
