use std::time::Duration;

use serde::Deserialize;

/// Bangalore city centre; all display distances are measured from here.
pub const BANGALORE_COORD: (f64, f64) = (12.9716, 77.5946);

const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/search";

#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
}

/// Best-effort geocoder for display-only distance estimates.
///
/// Every failure mode (network, timeout, HTTP error, empty result,
/// unparsable coordinates) degrades to `None`; the caller renders that
/// as "N/A". Nothing here may block or fail the prediction flow beyond
/// its own timeout.
pub struct Geocoder {
    client: reqwest::Client,
    timeout: Duration,
}

impl Geocoder {
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    pub async fn distance_from_bangalore_km(&self, location: &str) -> Option<f64> {
        let location = location.trim();
        if location.is_empty() {
            return None;
        }

        let response = self
            .client
            .get(NOMINATIM_URL)
            .query(&[("q", location), ("format", "json"), ("limit", "1")])
            .header(reqwest::header::USER_AGENT, "prep-predict/0.1")
            .timeout(self.timeout)
            .send()
            .await
            .ok()?;
        if !response.status().is_success() {
            return None;
        }

        let places: Vec<Place> = response.json().await.ok()?;
        let place = places.first()?;
        let lat = place.lat.parse::<f64>().ok()?;
        let lon = place.lon.parse::<f64>().ok()?;

        let km = haversine_km(BANGALORE_COORD, (lat, lon));
        Some((km * 10.0).round() / 10.0)
    }
}

/// Great-circle distance between two (lat, lon) points in km.
pub fn haversine_km(a: (f64, f64), b: (f64, f64)) -> f64 {
    const EARTH_RADIUS_KM: f64 = 6371.0;

    let (lat1, lon1) = (a.0.to_radians(), a.1.to_radians());
    let (lat2, lon2) = (b.0.to_radians(), b.1.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_to_self_is_zero() {
        assert!(haversine_km(BANGALORE_COORD, BANGALORE_COORD).abs() < 1e-9);
    }

    #[test]
    fn bangalore_to_chennai_is_about_290_km() {
        let chennai = (13.0827, 80.2707);
        let km = haversine_km(BANGALORE_COORD, chennai);
        assert!((260.0..320.0).contains(&km), "got {km}");
    }

    #[test]
    fn distance_is_symmetric() {
        let mysore = (12.2958, 76.6394);
        let there = haversine_km(BANGALORE_COORD, mysore);
        let back = haversine_km(mysore, BANGALORE_COORD);
        assert!((there - back).abs() < 1e-9);
    }

    #[tokio::test]
    async fn empty_location_short_circuits_to_none() {
        let geocoder = Geocoder::new(1);
        assert_eq!(geocoder.distance_from_bangalore_km("  ").await, None);
    }
}
