//! Text helpers for reporting plugin reasoning.

/// Shorten `s` to at most `max_chars` characters, ending in "..." when cut.
///
/// Counts characters rather than bytes, so multi-byte text is never split.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut out: String = s.chars().take(keep).collect();
    out.push_str("...");
    out
}

/// Collapse all whitespace runs (including newlines) into single spaces.
///
/// Plugin reasoning is often multi-line LLM output; vote tables and log
/// lines want it on one line.
pub fn single_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_untouched() {
        assert_eq!(truncate("deep pool", 20), "deep pool");
        assert_eq!(truncate("", 0), "");
    }

    #[test]
    fn test_cut_with_ellipsis() {
        assert_eq!(truncate("slippage too high", 11), "slippage...");
        assert_eq!(truncate("abc", 2), "...");
    }

    #[test]
    fn test_counts_characters() {
        assert_eq!(truncate("ééééé", 5), "ééééé");
        assert_eq!(truncate("éééééé", 5), "éé...");
    }

    #[test]
    fn test_single_line() {
        assert_eq!(single_line("  risk\n is\tlow  "), "risk is low");
        assert_eq!(single_line(""), "");
    }
}
