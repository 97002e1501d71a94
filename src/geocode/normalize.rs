//! Address cleanup before geocoding.

/// Building-type words that confuse the geocoder when left in the address.
const BUILDING_WORDS: &[&str] = &["빌딩", "아파트", "상가"];

/// Clean a raw station address for lookup.
///
/// Keeps only the text before the first `(` and then before the first `,`,
/// removes every building-type word, and trims the result.
pub fn normalize_address(raw: &str) -> String {
    let head = raw.split('(').next().unwrap_or("");
    let head = head.split(',').next().unwrap_or("");

    let mut cleaned = head.to_string();
    for word in BUILDING_WORDS {
        cleaned = cleaned.replace(word, "");
    }
    cleaned.trim().to_string()
}
