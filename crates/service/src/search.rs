//! Search term handling shared by the services and the storage backends.

/// Trim and lowercase a product search term; `None` when nothing is left.
pub fn normalize_term(term: &str) -> Option<String> {
    let trimmed = term.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Build a `%term%` LIKE pattern with `\` as the escape character, so `%`
/// and `_` in user input match literally.
pub fn contains_pattern(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 2);
    out.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('%');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_terms_normalize_to_none() {
        assert_eq!(normalize_term(""), None);
        assert_eq!(normalize_term("  \t "), None);
        assert_eq!(normalize_term("  Phone "), Some("phone".to_string()));
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("tv"), "%tv%");
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(contains_pattern("a\\b"), "%a\\\\b%");
    }
}
