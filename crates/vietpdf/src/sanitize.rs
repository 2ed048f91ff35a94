//! Sanitization of client-supplied filenames before they touch the staging
//! directory.

/// Reduces a client-supplied filename to a safe base name: path components
/// are stripped (both separators, so Windows clients behave too) and names
/// that sanitize away entirely fall back to a placeholder.
pub fn sanitize_filename(raw: &str) -> String {
    let base = raw
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(raw)
        .trim()
        .trim_matches('.');

    let cleaned: String = base
        .chars()
        .filter(|c| !c.is_control())
        .collect();

    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_name_is_unchanged() {
        assert_eq!(sanitize_filename("sample.png"), "sample.png");
    }

    #[test]
    fn path_components_are_stripped() {
        assert_eq!(sanitize_filename("/etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("../../escape.png"), "escape.png");
        assert_eq!(sanitize_filename("C:\\Users\\a\\shot.png"), "shot.png");
    }

    #[test]
    fn dots_only_name_falls_back() {
        assert_eq!(sanitize_filename(".."), "upload");
        assert_eq!(sanitize_filename("."), "upload");
        assert_eq!(sanitize_filename(""), "upload");
    }

    #[test]
    fn control_characters_are_removed() {
        assert_eq!(sanitize_filename("a\x00b.png"), "ab.png");
    }

    #[test]
    fn hidden_file_prefix_is_trimmed() {
        assert_eq!(sanitize_filename(".hidden.png"), "hidden.png");
    }
}
