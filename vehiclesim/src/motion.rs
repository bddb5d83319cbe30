//! Dead-reckoning position update.
//!
//! The vehicle travels along a fixed bearing of 60° from true north. The
//! conversion from metres to degrees uses a flat-earth local approximation
//! (111195 m per degree of latitude), which is only valid for the small
//! per-tick steps this simulation takes; it is not geodesically exact.

/// Travel bearing, degrees clockwise from true north.
pub const HEADING_DEG: f64 = 60.0;

/// Metres per degree of latitude.
pub const METRES_PER_DEG_LAT: f64 = 111_195.0;

/// Advance `(lat, lon)` by the distance covered in one tick at `speed_kmh`.
pub fn displace(lat: f64, lon: f64, speed_kmh: f64) -> (f64, f64) {
    let speed_ms = speed_kmh * (1000.0 / 3600.0);
    let distance_m = speed_ms * crate::TICK_SECONDS;

    let heading = HEADING_DEG.to_radians();
    let d_lat = distance_m * heading.cos() / METRES_PER_DEG_LAT;
    let d_lon = distance_m * heading.sin() / (METRES_PER_DEG_LAT * lat.to_radians().cos());

    (lat + d_lat, lon + d_lon)
}
