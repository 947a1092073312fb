//! Object key rules.
//!
//! Keys typed by the user are trimmed and lose a single leading slash. No
//! other sanitization happens here: backends treat keys as opaque strings and
//! rely on their own namespace rules.

/// Normalize a key typed in a command argument or caption.
pub fn normalize_key(input: &str) -> String {
    let trimmed = input.trim();
    trimmed.strip_prefix('/').unwrap_or(trimmed).to_string()
}

/// Pick the destination key for an uploaded attachment.
///
/// An empty or blank caption keeps the original file name. Otherwise the
/// normalized caption is the key, and a caption ending in `/` is treated as a
/// folder that receives the original file name. A caption that normalizes
/// to nothing (`/`) keeps the original file name too.
pub fn resolve_upload_key(caption: Option<&str>, original_file_name: &str) -> String {
    let key = caption.map(normalize_key).unwrap_or_default();
    if key.is_empty() {
        original_file_name.to_string()
    } else if key.ends_with('/') {
        format!("{}{}", key, original_file_name)
    } else {
        key
    }
}

/// Last path segment of a slash-separated path.
pub fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_trims_and_strips_one_leading_slash() {
        assert_eq!(normalize_key("  /docs/a.txt "), "docs/a.txt");
        assert_eq!(normalize_key("//double"), "/double");
        assert_eq!(normalize_key("plain"), "plain");
    }

    #[test]
    fn normalize_keeps_traversal_segments() {
        assert_eq!(normalize_key("../etc/passwd"), "../etc/passwd");
    }

    #[test]
    fn upload_key_defaults_to_original_name() {
        assert_eq!(resolve_upload_key(None, "photo.jpg"), "photo.jpg");
        assert_eq!(resolve_upload_key(Some("   "), "photo.jpg"), "photo.jpg");
    }

    #[test]
    fn upload_key_uses_caption_verbatim() {
        assert_eq!(
            resolve_upload_key(Some("docs/report.pdf"), "scan.pdf"),
            "docs/report.pdf"
        );
        assert_eq!(
            resolve_upload_key(Some(" /docs/report.pdf "), "scan.pdf"),
            "docs/report.pdf"
        );
    }

    #[test]
    fn upload_key_appends_name_to_folder_caption() {
        assert_eq!(
            resolve_upload_key(Some("archive/"), "notes.txt"),
            "archive/notes.txt"
        );
    }

    #[test]
    fn upload_key_is_never_empty() {
        assert_eq!(resolve_upload_key(Some("/"), "notes.txt"), "notes.txt");
        assert_eq!(resolve_upload_key(Some(" / "), "notes.txt"), "notes.txt");
    }

    #[test]
    fn base_name_takes_last_segment() {
        assert_eq!(base_name("photos/file_12.jpg"), "file_12.jpg");
        assert_eq!(base_name("file.bin"), "file.bin");
    }
}
