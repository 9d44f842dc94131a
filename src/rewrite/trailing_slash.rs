//! Trailing slash normalization.

use crate::rules::model::TrailingSlashMode;

/// Longest extension the file heuristic recognises.
const MAX_EXTENSION_LEN: usize = 10;

/// Whether the last segment of `path` looks like a file name.
///
/// A segment counts as a file when it ends in a dot followed by 1 to 10 ASCII
/// alphanumerics. Only the final extension is considered, so
/// `archive.tar.gz` is a file. Trailing slashes are ignored when picking the
/// last segment.
pub fn appears_to_be_file(path: &str) -> bool {
    let last_segment = path
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();

    match last_segment.rsplit_once('.') {
        Some((_, extension)) => {
            (1..=MAX_EXTENSION_LEN).contains(&extension.len())
                && extension.bytes().all(|b| b.is_ascii_alphanumeric())
        }
        None => false,
    }
}

/// Apply `mode` to `path`. File-like paths are returned unchanged.
pub fn normalize(path: &str, mode: TrailingSlashMode) -> String {
    if appears_to_be_file(path) {
        return path.to_string();
    }

    match mode {
        TrailingSlashMode::Add if !path.is_empty() && !path.ends_with('/') => format!("{path}/"),
        TrailingSlashMode::Remove if path != "/" && path.ends_with('/') => {
            path.trim_end_matches('/').to_string()
        }
        _ => path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_mode() {
        assert_eq!(normalize("/about", TrailingSlashMode::Add), "/about/");
        assert_eq!(normalize("/about/", TrailingSlashMode::Add), "/about/");
        assert_eq!(normalize("/", TrailingSlashMode::Add), "/");
        assert_eq!(normalize("", TrailingSlashMode::Add), "");
    }

    #[test]
    fn test_remove_mode() {
        assert_eq!(normalize("/about/", TrailingSlashMode::Remove), "/about");
        assert_eq!(normalize("/about///", TrailingSlashMode::Remove), "/about");
        assert_eq!(normalize("/", TrailingSlashMode::Remove), "/");
        assert_eq!(normalize("/about", TrailingSlashMode::Remove), "/about");
    }

    #[test]
    fn test_none_mode() {
        assert_eq!(normalize("/about", TrailingSlashMode::None), "/about");
        assert_eq!(normalize("/about/", TrailingSlashMode::None), "/about/");
    }

    #[test]
    fn test_files_are_left_alone() {
        for path in [
            "/report.pdf",
            "/image.jpg",
            "/script.js",
            "/downloads/reports/annual-report-2024.pdf",
            "/archive.tar.gz",
        ] {
            assert_eq!(normalize(path, TrailingSlashMode::Add), path);
        }
        assert_eq!(normalize("/download.zip", TrailingSlashMode::Remove), "/download.zip");
    }

    #[test]
    fn test_file_heuristic() {
        assert!(appears_to_be_file("/data.json"));
        assert!(appears_to_be_file("/a/b/file.HTML"));
        assert!(appears_to_be_file("/report.pdf/"));
        assert!(!appears_to_be_file("/about"));
        assert!(!appears_to_be_file("/v1.2-beta/notes"));
        assert!(!appears_to_be_file("/file."));
        assert!(!appears_to_be_file("/file.abcdefghijk"));
        assert!(!appears_to_be_file("/file.tar-gz"));
        assert!(!appears_to_be_file("/"));
        assert!(!appears_to_be_file(""));
    }
}
