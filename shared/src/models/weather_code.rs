//! WMO weather interpretation codes

/// Label returned for codes outside the known table
pub const UNKNOWN_CONDITION: &str = "Unknown Condition";

/// Known codes and their human-readable conditions, in ascending code order
pub const WEATHER_CODES: [(i32, &str); 28] = [
    (0, "Clear sky"),
    (1, "Mainly clear"),
    (2, "Partly cloudy"),
    (3, "Overcast"),
    (45, "Fog"),
    (48, "Depositing rime fog"),
    (51, "Light drizzle"),
    (53, "Moderate drizzle"),
    (55, "Dense drizzle"),
    (56, "Light freezing drizzle"),
    (57, "Dense freezing drizzle"),
    (61, "Slight rain"),
    (63, "Moderate rain"),
    (65, "Heavy rain"),
    (66, "Light freezing rain"),
    (67, "Heavy freezing rain"),
    (71, "Slight snow fall"),
    (73, "Moderate snow fall"),
    (75, "Heavy snow fall"),
    (77, "Snow grains"),
    (80, "Slight rain showers"),
    (81, "Moderate rain showers"),
    (82, "Violent rain showers"),
    (85, "Slight snow showers"),
    (86, "Heavy snow showers"),
    (95, "Thunderstorm"),
    (96, "Thunderstorm with slight hail"),
    (99, "Thunderstorm with heavy hail"),
];

/// Look up the condition for a weather code
pub fn describe_weather_code(code: i32) -> Option<&'static str> {
    WEATHER_CODES
        .binary_search_by_key(&code, |(known, _)| *known)
        .ok()
        .map(|idx| WEATHER_CODES[idx].1)
}

/// Condition for a weather code, falling back to [`UNKNOWN_CONDITION`]
pub fn weather_condition(code: i32) -> &'static str {
    describe_weather_code(code).unwrap_or(UNKNOWN_CONDITION)
}

/// Whether `label` is one of the strings [`weather_condition`] can return
pub fn is_known_label(label: &str) -> bool {
    label == UNKNOWN_CONDITION || WEATHER_CODES.iter().any(|(_, known)| *known == label)
}
