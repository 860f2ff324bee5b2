//! Direction of the Kaaba from any point on Earth

use crate::config::Coordinates;

/// Location of the Kaaba in Makkah
pub const MAKKAH: Coordinates = Coordinates {
    latitude: 21.4225241,
    longitude: 39.8261818,
};

/// Initial great-circle bearing towards Makkah, degrees clockwise from north in `[0, 360)`
pub fn qibla(coordinates: Coordinates) -> f64 {
    let lat = coordinates.latitude.to_radians();
    let delta_lon = (MAKKAH.longitude - coordinates.longitude).to_radians();
    let makkah_lat = MAKKAH.latitude.to_radians();

    let y = delta_lon.sin();
    let x = lat.cos() * makkah_lat.tan() - lat.sin() * delta_lon.cos();
    let bearing = y.atan2(x).to_degrees().rem_euclid(360.0);
    if bearing >= 360.0 {
        0.0
    } else {
        bearing
    }
}
