//! String utilities for the domain layer.

/// Truncate a string to at most `max_chars` characters, appending `…` when cut.
///
/// Counts characters rather than bytes so previews of non-ASCII tool output
/// never split a code point.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let kept: String = s.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", kept)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_input_unchanged() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello", 5), "hello");
    }

    #[test]
    fn test_truncate_ascii() {
        assert_eq!(truncate("hello world", 6), "hello…");
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate("あいうえお", 3), "あい…");
    }

    #[test]
    fn test_truncate_zero() {
        assert_eq!(truncate("abc", 0), "…");
    }
}
