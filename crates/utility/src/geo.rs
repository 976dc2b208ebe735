pub const EARTH_RADIUS_KM: f64 = 6371.0;

fn to_radians(degrees: f64) -> f64 {
    degrees * std::f64::consts::PI / 180.0
}

/// Great-circle distance between two WGS84 coordinates in kilometers
/// (haversine formula).
///
/// Symmetric in its arguments and exactly `0.0` for identical points. The
/// haversine term is clamped to `[0, 1]`, so rounding near antipodal points
/// can not produce `NaN`.
pub fn great_circle_distance_km(
    latitude_1: f64,
    longitude_1: f64,
    latitude_2: f64,
    longitude_2: f64,
) -> f64 {
    if latitude_1 == latitude_2 && longitude_1 == longitude_2 {
        return 0.0;
    }

    let lat1_rad = to_radians(latitude_1);
    let lat2_rad = to_radians(latitude_2);

    let dlat = lat2_rad - lat1_rad;
    let dlon = to_radians(longitude_2 - longitude_1);

    let a = (dlat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (dlon / 2.0).sin().powi(2);
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Parses a decimal coordinate as entered by an operator. Blank, missing and
/// non-finite values yield `None`.
pub fn parse_coordinate(value: Option<&str>) -> Option<f64> {
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }
    value.parse::<f64>().ok().filter(|number| number.is_finite())
}
