//! GPS to local tangent-plane conversion.
//!
//! All planning happens in a metric 2D frame anchored at a reference GPS
//! point. The frame is a spherical-Earth approximation: good to O(d^2/R)
//! over the few kilometers a search grid spans.

use crate::geometry::Point;

/// Earth radius in meters (spherical approximation).
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

fn ecef(lon_rad: f64, lat_rad: f64) -> [f64; 3] {
    [
        EARTH_RADIUS_M * lat_rad.cos() * lon_rad.cos(),
        EARTH_RADIUS_M * lat_rad.cos() * lon_rad.sin(),
        EARTH_RADIUS_M * lat_rad.sin(),
    ]
}

fn cross3(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn dot3(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Local tangent frame at a reference GPS point.
///
/// `x` points east, `y` north, so CCW polygons in the plane stay CCW on
/// the ground. The frame is a plain value scoped to one planning
/// invocation; nothing here is process-global.
#[derive(Debug, Clone)]
pub struct TangentFrame {
    origin: [f64; 3],
    east: [f64; 3],
    north: [f64; 3],
}

impl TangentFrame {
    /// Build the frame at a reference point given in radians.
    pub fn new(lon_rad: f64, lat_rad: f64) -> Self {
        let origin = ecef(lon_rad, lat_rad);
        // Orthonormal basis: up is radial, east is the horizontal
        // longitude tangent, north completes the right-handed triple.
        let up = [
            origin[0] / EARTH_RADIUS_M,
            origin[1] / EARTH_RADIUS_M,
            origin[2] / EARTH_RADIUS_M,
        ];
        let east = [-lon_rad.sin(), lon_rad.cos(), 0.0];
        let north = cross3(up, east);
        Self {
            origin,
            east,
            north,
        }
    }

    /// Project a GPS point (radians) into the local frame.
    ///
    /// The basis is orthonormal, so the change of basis is two dot
    /// products; the residual up-component is O(d^2/R) and is discarded.
    pub fn to_local(&self, lon_rad: f64, lat_rad: f64) -> Point {
        let p = ecef(lon_rad, lat_rad);
        let d = [
            p[0] - self.origin[0],
            p[1] - self.origin[1],
            p[2] - self.origin[2],
        ];
        Point::new(dot3(d, self.east), dot3(d, self.north))
    }

    /// Map a local point back to GPS (radians).
    pub fn to_gps(&self, p: Point) -> (f64, f64) {
        let w = [
            self.origin[0] + p.x * self.east[0] + p.y * self.north[0],
            self.origin[1] + p.x * self.east[1] + p.y * self.north[1],
            self.origin[2] + p.x * self.east[2] + p.y * self.north[2],
        ];
        let lon = w[1].atan2(w[0]);
        let lat = (w[2] / EARTH_RADIUS_M).clamp(-1.0, 1.0).asin();
        (lon, lat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Flight line near El Monte, CA.
    const REF_LAT_DEG: f64 = 34.082729;
    const REF_LON_DEG: f64 = -117.931480;

    fn frame() -> TangentFrame {
        TangentFrame::new(REF_LON_DEG.to_radians(), REF_LAT_DEG.to_radians())
    }

    #[test]
    fn reference_maps_to_origin() {
        let f = frame();
        let p = f.to_local(REF_LON_DEG.to_radians(), REF_LAT_DEG.to_radians());
        assert!(p.x.abs() < 1e-9);
        assert!(p.y.abs() < 1e-9);
    }

    #[test]
    fn eastward_point_has_positive_x() {
        let f = frame();
        let p = f.to_local((REF_LON_DEG + 0.01).to_radians(), REF_LAT_DEG.to_radians());
        assert!(p.x > 0.0);
        assert!(p.y.abs() < p.x * 0.01);
        // 0.01 deg of longitude at 34N is roughly 920 m.
        assert!((p.x - 922.0).abs() < 5.0);
    }

    #[test]
    fn northward_point_has_positive_y() {
        let f = frame();
        let p = f.to_local(REF_LON_DEG.to_radians(), (REF_LAT_DEG + 0.01).to_radians());
        assert!(p.y > 0.0);
        assert!(p.x.abs() < p.y * 0.01);
    }

    #[test]
    fn round_trip_recovers_gps() {
        let f = frame();
        // A few km out in each quadrant; the discarded up-component costs
        // O(d^2/R), well under 1e-6 rad at this scale.
        for (dlat, dlon) in [(0.01, 0.02), (-0.02, 0.01), (0.015, -0.015), (-0.01, -0.02)] {
            let lon = (REF_LON_DEG + dlon).to_radians();
            let lat = (REF_LAT_DEG + dlat).to_radians();
            let (lon2, lat2) = f.to_gps(f.to_local(lon, lat));
            assert!((lon - lon2).abs() < 1e-6, "lon error {}", (lon - lon2).abs());
            assert!((lat - lat2).abs() < 1e-6, "lat error {}", (lat - lat2).abs());
        }
    }

    #[test]
    fn local_distances_are_metric() {
        let f = frame();
        let a = f.to_local(REF_LON_DEG.to_radians(), REF_LAT_DEG.to_radians());
        let b = f.to_local(REF_LON_DEG.to_radians(), (REF_LAT_DEG + 0.001).to_radians());
        // 0.001 deg latitude is ~111 m everywhere.
        assert!((a.distance_to(b) - 111.3).abs() < 1.0);
    }
}
