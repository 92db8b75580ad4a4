//! Cache key builders for the `weather:` namespace.
//!
//! Keys are `namespace:operation:arg...` with every argument normalized first:
//! strings are lower-cased, numbers are printed with fixed 6-decimal precision
//! (about 0.1m for coordinates) with trailing zeros trimmed. Calls whose
//! arguments are equal after normalization share a key.

pub const NAMESPACE: &str = "weather";

/// Key for a geolocation lookup: `weather:coords:{city}:{country}`
pub fn city_coordinates(city: &str, country: &str) -> String {
    format!(
        "{NAMESPACE}:coords:{}:{}",
        normalize_text(city),
        normalize_text(country)
    )
}

/// Key for current conditions at a point: `weather:current:{lat}:{lon}`
pub fn current_by_coords(lat: f64, lon: f64) -> String {
    format!(
        "{NAMESPACE}:current:{}:{}",
        normalize_number(lat),
        normalize_number(lon)
    )
}

/// Key for a persisted weather record: `weather:current:uuid:{id}`
pub fn current_by_id(id: &str) -> String {
    format!("{NAMESPACE}:current:uuid:{}", normalize_text(id))
}

/// Lower-case a string argument.
///
/// `%` and the `:` delimiter are percent-escaped so an argument can never
/// spill into the next segment; ordinary place names are unchanged.
pub fn normalize_text(value: &str) -> String {
    let lower = value.to_lowercase();
    if !lower.contains(|c: char| c == ':' || c == '%') {
        return lower;
    }
    lower.replace('%', "%25").replace(':', "%3a")
}

/// Print a number at fixed precision, trimming trailing zeros.
///
/// `51.50720` becomes `51.5072`, `10.0` becomes `10` and `-0.0` becomes `0`,
/// which matches how the provider's coordinates are usually written.
pub fn normalize_number(value: f64) -> String {
    let fixed = format!("{:.6}", value);
    let trimmed = if fixed.contains('.') {
        fixed.trim_end_matches('0').trim_end_matches('.')
    } else {
        fixed.as_str()
    };
    match trimmed {
        "-0" => "0".to_string(),
        other => other.to_string(),
    }
}
