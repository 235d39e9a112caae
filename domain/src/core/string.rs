//! String utilities for the domain layer.

/// Truncate a string to a maximum length with ellipsis (UTF-8 safe)
///
/// Uses byte length for max_len but ensures truncation occurs at valid
/// UTF-8 character boundaries.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let target = max_len.saturating_sub(3);
        let mut end = target.min(s.len());
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}

/// Normalise a role or domain label: trimmed, lowercase, inner whitespace as `_`.
pub fn normalize_label(label: &str) -> String {
    label
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_ascii() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 8), "hello...");
    }

    #[test]
    fn test_truncate_multibyte() {
        // 'の' is 3 bytes; target=4 backs up to the boundary at 3
        assert_eq!(truncate("あのね", 7), "あ...");
        assert_eq!(truncate("あのね", 9), "あのね");
    }

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("  Auditor "), "auditor");
        assert_eq!(normalize_label("Distributed  Systems"), "distributed_systems");
        assert_eq!(normalize_label(""), "");
    }
}
