//! Country name to ISO 3166-1 alpha-2 resolution.
//!
//! Orders store the country as a display name. Gateways want the two-letter
//! code. Names are matched case-insensitively against the ISO 3166 registry
//! from `rust_iso3166`, then against the common names shoppers actually type
//! where ISO uses a formal one ("United States", "South Korea").

/// Common names that differ from the ISO short name
const ALIASES: &[(&str, &str)] = &[
    ("united states", "US"),
    ("usa", "US"),
    ("united kingdom", "GB"),
    ("great britain", "GB"),
    ("czech republic", "CZ"),
    ("russia", "RU"),
    ("russian federation", "RU"),
    ("south korea", "KR"),
    ("north korea", "KP"),
    ("vietnam", "VN"),
    ("iran", "IR"),
    ("syria", "SY"),
    ("laos", "LA"),
    ("bolivia", "BO"),
    ("venezuela", "VE"),
    ("tanzania", "TZ"),
    ("moldova", "MD"),
    ("taiwan", "TW"),
    ("turkey", "TR"),
    ("netherlands", "NL"),
    ("ivory coast", "CI"),
    ("palestine", "PS"),
    ("micronesia", "FM"),
];

/// Resolve a country name to its alpha-2 code
pub fn alpha2_for_name(name: &str) -> Option<&'static str> {
    let needle = name.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }

    if let Some(country) = rust_iso3166::ALL
        .iter()
        .find(|country| country.name.to_lowercase() == needle)
    {
        return Some(country.alpha2);
    }

    ALIASES
        .iter()
        .find(|(alias, _)| *alias == needle)
        .and_then(|(_, code)| rust_iso3166::from_alpha2(code))
        .map(|country| country.alpha2)
}
