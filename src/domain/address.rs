use std::collections::HashSet;

/// Comparison key for an address: lowercased, with whitespace runs collapsed.
pub fn normalize_address(address: &str) -> String {
    address
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Key under which a geocoding answer is cached.
pub fn cache_key(address: &str, city_hint: Option<&str>) -> String {
    match city_hint.map(normalize_address).filter(|h| !h.is_empty()) {
        Some(hint) => format!("{}|{}", normalize_address(address), hint),
        None => normalize_address(address),
    }
}

/// Text sent to the geocoder.
pub fn geocoding_query(address: &str, city_hint: Option<&str>) -> String {
    match city_hint.map(str::trim).filter(|h| !h.is_empty()) {
        Some(hint) => format!("{}, {}", address, hint),
        None => address.to_string(),
    }
}

/// Trims entries, drops blanks and removes case/whitespace duplicates.
/// The first spelling of each address is kept, in input order.
pub fn deduplicate_addresses(addresses: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    addresses
        .iter()
        .map(|a| a.trim())
        .filter(|a| !a.is_empty())
        .filter(|a| seen.insert(normalize_address(a)))
        .map(str::to_string)
        .collect()
}
