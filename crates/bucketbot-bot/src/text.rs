//! Reply text helpers.

/// Truncate to at most `max_chars` characters, ending in `...` when cut.
pub fn truncate_message(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let cut = s.char_indices().nth(keep).map(|(i, _)| i).unwrap_or(s.len());
    format!("{}...", &s[..cut])
}

/// Escape text for Telegram's HTML parse mode.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape `s` and cut it to at most `max_chars`, never inside an entity.
pub fn escape_html_truncated(s: &str, max_chars: usize) -> String {
    let escaped = escape_html(s);
    if escaped.chars().count() <= max_chars {
        return escaped;
    }

    let keep = max_chars.saturating_sub(3);
    let mut cut = escaped
        .char_indices()
        .nth(keep)
        .map(|(i, _)| i)
        .unwrap_or(escaped.len());
    if let Some(amp) = escaped[..cut].rfind('&') {
        if !escaped[amp..cut].contains(';') {
            cut = amp;
        }
    }
    format!("{}...", &escaped[..cut])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_short() {
        assert_eq!(truncate_message("hello", 10), "hello");
        assert_eq!(truncate_message("", 5), "");
        assert_eq!(truncate_message("hello", 5), "hello");
    }

    #[test]
    fn truncate_long() {
        assert_eq!(truncate_message("hello world", 8), "hello...");
        assert_eq!(truncate_message("hello", 0), "...");
    }

    #[test]
    fn truncate_counts_characters_not_bytes() {
        assert_eq!(truncate_message("ééééé", 4), "é...");
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<a href="x">&</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;"
        );
    }

    #[test]
    fn truncated_escape_never_splits_an_entity() {
        let out = escape_html_truncated("ab<<<<", 9);
        assert_eq!(escape_html_truncated("ab<<<<", 8), "ab...");
        assert_eq!(out, "ab&lt;...");
        assert!(escape_html_truncated("plain", 10) == "plain");
    }
}
