use reqwest::Client;
use serde_json::Value;

use litterview_domain::GeoPoint;

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeocodeOutcome {
	Found(GeoPoint),
	NotFound,
}

pub async fn geocode(
	client: &Client,
	cfg: &litterview_config::ProviderConfig,
	api_key: &str,
	address: &str,
) -> Result<GeocodeOutcome> {
	tracing::info!(%address, "Geocoding address.");

	let res = client
		.get(crate::endpoint(cfg))
		.query(&[("address", address), ("key", api_key)])
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_geocode_response(&json)
}

/// Interprets a geocoding response body. The first candidate wins when several match.
pub fn parse_geocode_response(json: &Value) -> Result<GeocodeOutcome> {
	let status = json.get("status").and_then(Value::as_str).unwrap_or("OK");

	match status {
		"OK" => {},
		"ZERO_RESULTS" => return Ok(GeocodeOutcome::NotFound),
		other => {
			let message = json
				.get("error_message")
				.and_then(Value::as_str)
				.unwrap_or("no error message")
				.to_string();

			return Err(Error::Upstream { status: other.to_string(), message });
		},
	}

	let results = json.get("results").and_then(Value::as_array).ok_or_else(|| {
		Error::InvalidResponse { message: "Geocode response is missing results array.".to_string() }
	})?;
	let Some(first) = results.first() else {
		return Ok(GeocodeOutcome::NotFound);
	};

	Ok(GeocodeOutcome::Found(extract_location(first)?))
}

/// Reads `geometry.location` of one geocode candidate.
pub fn extract_location(candidate: &Value) -> Result<GeoPoint> {
	let location = candidate.get("geometry").and_then(|geometry| geometry.get("location"));
	let coordinate = |axis: &str| {
		location.and_then(|location| location.get(axis)).and_then(Value::as_f64).ok_or_else(|| {
			Error::InvalidResponse {
				message: format!("Geocode candidate is missing geometry.location.{axis}."),
			}
		})
	};

	Ok(GeoPoint { lat: coordinate("lat")?, lng: coordinate("lng")? })
}
