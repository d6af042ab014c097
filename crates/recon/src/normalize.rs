/// Canonical join key for a booking locator.
///
/// Surrounding whitespace is trimmed, everything that is not an ASCII letter
/// or digit is removed, and the rest is uppercased. An empty result is a
/// valid key. Absent locators must be filtered out before this point.
pub fn normalize_key(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}
