use crate::models::LocationFix;

const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Great-circle distance in metres between two latitude/longitude pairs.
pub fn haversine_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_METERS * c
}

pub fn distance_between(from: &LocationFix, to: &LocationFix) -> f64 {
    haversine_meters(from.latitude, from.longitude, to.latitude, to.longitude)
}
