//! Text normalization shared by the categorical encoders.

/// Normalizes a categorical term: lowercase, ASCII letters only.
///
/// Returns `None` when nothing alphabetic remains.
///
/// # Examples
///
/// ```
/// use dropout_core::text::normalize_term;
///
/// assert_eq!(normalize_term("Diabetes Mellitus, Type 2"), Some("diabetesmellitustype".to_string()));
/// assert_eq!(normalize_term("Drug"), Some("drug".to_string()));
/// assert_eq!(normalize_term("1234 !"), None);
/// ```
pub fn normalize_term(raw: &str) -> Option<String> {
    let normalized: String = raw
        .to_lowercase()
        .chars()
        .filter(char::is_ascii_lowercase)
        .collect();
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

/// Case-insensitive prefix test on trimmed text.
pub fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.trim().to_lowercase().starts_with(prefix)
}
