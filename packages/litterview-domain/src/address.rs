/// Leading hundred-block number of an address, e.g. `100` for "100 MARKET ST".
///
/// Returns `None` for blocks such as "N/A MARKET ST" or an empty address.
pub fn leading_number(raw_address: &str) -> Option<i64> {
	raw_address.split_whitespace().next()?.parse().ok()
}

pub fn has_numeric_prefix(raw_address: &str) -> bool {
	leading_number(raw_address).is_some()
}

/// Query string sent to the geocoder.
pub fn geocoding_query(raw_address: &str, suffix: &str) -> String {
	format!("{}{suffix}", raw_address.trim())
}
