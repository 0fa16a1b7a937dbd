//! Object key generation.
//!
//! Uploads never overwrite: each object gets a fresh UUID stem under the
//! directory of the caller's path hint, keeping a normalized extension.

use uuid::Uuid;

/// Replace anything outside `[A-Za-z0-9._-]` with `_`, collapsing runs.
pub(crate) fn sanitize_segment(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut prev_underscore = false;

    for ch in input.chars() {
        let keep = ch.is_ascii_alphanumeric() || ch == '.' || ch == '-' || ch == '_';
        if keep {
            out.push(ch);
            prev_underscore = false;
        } else if !prev_underscore {
            out.push('_');
            prev_underscore = true;
        }
    }

    let sanitized = out.trim_matches('_');
    if sanitized.is_empty() || sanitized.chars().all(|c| c == '.') {
        return "_".to_string();
    }
    sanitized.to_string()
}

/// Lowercased extension of `filename` with its dot, or one derived from
/// `mime_type` when the name has none.
pub(crate) fn extension_for(filename: &str, mime_type: &str) -> String {
    let ext = filename
        .rsplit_once('.')
        .map(|(stem, ext)| (stem, ext.trim()))
        .filter(|(stem, ext)| !stem.is_empty() && !ext.is_empty())
        .map(|(_, ext)| sanitize_segment(&ext.to_ascii_lowercase()));

    match ext {
        Some(ext) if ext != "_" => format!(".{ext}"),
        _ => mime_extension(mime_type).to_string(),
    }
}

fn mime_extension(mime_type: &str) -> &'static str {
    let mime = mime_type.to_ascii_lowercase();
    if mime.contains("pdf") {
        ".pdf"
    } else if mime.contains("wordprocessingml") || mime.contains("msword") {
        ".docx"
    } else {
        ".bin"
    }
}

/// Build the key for an upload: `<sanitized dir>/<uuid><ext>`.
pub(crate) fn object_key(path_hint: &str, mime_type: &str) -> String {
    let hint = path_hint.trim_matches('/');
    let (dir, filename) = hint.rsplit_once('/').unwrap_or(("", hint));
    let ext = extension_for(filename, mime_type);
    let stem = Uuid::new_v4().simple();

    let dir: Vec<String> = dir
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(sanitize_segment)
        .collect();
    if dir.is_empty() {
        format!("{stem}{ext}")
    } else {
        format!("{}/{stem}{ext}", dir.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Outline.PDF", "application/octet-stream", ".pdf")]
    #[case("notes.Docx", "application/pdf", ".docx")]
    #[case("README", "application/pdf", ".pdf")]
    #[case("README", "application/msword", ".docx")]
    #[case(
        "README",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        ".docx"
    )]
    #[case("README", "text/plain", ".bin")]
    #[case(".hidden", "text/plain", ".bin")]
    #[case("trailing.", "application/pdf", ".pdf")]
    fn extension_rules(#[case] name: &str, #[case] mime: &str, #[case] expected: &str) {
        assert_eq!(extension_for(name, mime), expected);
    }

    #[test]
    fn key_keeps_directory_and_replaces_stem() {
        let key = object_key("syllabi/7/versions/9/Course Outline.pdf", "application/pdf");
        let (dir, name) = key.rsplit_once('/').unwrap();
        assert_eq!(dir, "syllabi/7/versions/9");
        assert!(name.ends_with(".pdf"));
        assert_eq!(name.len(), 32 + ".pdf".len());
    }

    #[test]
    fn keys_are_unique_per_upload() {
        let a = object_key("syllabi/1/versions/1/a.pdf", "application/pdf");
        let b = object_key("syllabi/1/versions/1/a.pdf", "application/pdf");
        assert_ne!(a, b);
    }

    #[test]
    fn traversal_segments_are_neutralized() {
        let key = object_key("syllabi/../../etc/passwd", "text/plain");
        assert!(!key.split('/').any(|segment| segment == ".."));
    }
}
