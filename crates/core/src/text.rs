//! Small string helpers shared across the workspace: identifier slugs,
//! filename-safe labels, and character-bounded truncation.

/// Lowercase slug for change ids: `[a-z0-9-]` only, runs of dashes
/// collapsed, length-capped, never empty.
pub fn slug(text: &str, max_len: usize) -> String {
    let lowered = text.trim().to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut prev_dash = false;
    for ch in lowered.chars() {
        let mapped = match ch {
            'a'..='z' | '0'..='9' => Some(ch),
            ' ' | '\t' | '\n' | '\r' | '_' | '-' => Some('-'),
            _ => None,
        };
        match mapped {
            Some('-') => {
                if !prev_dash && !out.is_empty() {
                    out.push('-');
                    prev_dash = true;
                }
            }
            Some(c) => {
                out.push(c);
                prev_dash = false;
            }
            None => {}
        }
    }
    let trimmed: String = out.trim_matches('-').chars().take(max_len).collect();
    let trimmed = trimmed.trim_matches('-').to_string();
    if trimmed.is_empty() {
        "change".to_string()
    } else {
        trimmed
    }
}

/// Filesystem-safe token for snapshot filenames: alphanumeric, `-` and `_`
/// only, capped at 40 chars, falls back to "snapshot".
pub fn sanitize_label(label: &str) -> String {
    let kept: String = label
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
        .take(40)
        .collect();
    if kept.is_empty() {
        "snapshot".to_string()
    } else {
        kept
    }
}

/// Truncate to at most `max` characters, respecting char boundaries.
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_collapses_and_lowers() {
        assert_eq!(slug("Cache   the Build!!", 36), "cache-the-build");
        assert_eq!(slug("__lead_and_trail__", 36), "lead-and-trail");
    }

    #[test]
    fn slug_never_empty() {
        assert_eq!(slug("!!!", 36), "change");
        assert_eq!(slug("", 36), "change");
    }

    #[test]
    fn slug_is_length_capped() {
        let s = slug(&"x".repeat(100), 36);
        assert_eq!(s.len(), 36);
    }

    #[test]
    fn sanitize_label_strips_path_separators() {
        assert_eq!(sanitize_label("day0"), "day0");
        assert_eq!(sanitize_label("../../etc/passwd"), "etcpasswd");
        assert_eq!(sanitize_label(""), "snapshot");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }
}
