use crate::data::CountsData;
use geojson::JsonObject;

/// Property names that may carry a country identifier, highest priority first
pub const CODE_FIELDS: [&str; 4] = ["ISO3166-1-Alpha-2", "iso_a2", "adm0_a3", "name"];

/// Resolve a feature's country identifier (lower-cased).
///
/// Walks [`CODE_FIELDS`] and takes the first field holding a non-empty
/// string. Boundary sets disagree on naming, so a feature with only a
/// `name` still resolves, just to a key that rarely matches the counts.
pub fn country_code(properties: Option<&JsonObject>) -> Option<String> {
    let props = properties?;
    CODE_FIELDS.iter().find_map(|field| {
        props
            .get(*field)
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    })
}

/// Node count for a feature; anything unresolved counts as zero
pub fn country_count(counts: &CountsData, properties: Option<&JsonObject>) -> u64 {
    country_code(properties)
        .and_then(|code| counts.countries.get(&code).copied())
        .unwrap_or(0)
}

/// Display name of a feature, if it has one
pub fn feature_name(properties: Option<&JsonObject>) -> Option<&str> {
    properties?
        .get("name")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
}
