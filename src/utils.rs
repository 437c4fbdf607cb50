//! Filename helpers for composing the assembled file's name
//!
//! Pure string utilities with no filesystem interaction. "Extension" is
//! defined as the substring after the last `.` of the final path segment —
//! so `a.b.tar.gz` has extension `gz`, and a name without a `.` is its own
//! extension (mirroring the behavior resumable.js clients were written
//! against).

/// Extension of `name`: everything after the last `.` of its final path
/// segment. A name with no `.` returns itself.
pub fn extension(name: &str) -> &str {
    let base = final_segment(name);
    match base.rsplit_once('.') {
        Some((_, ext)) => ext,
        None => base,
    }
}

/// Remove exactly one trailing `.<ext>` occurrence from `name`.
///
/// A name with no `.` is returned unchanged.
pub fn strip_extension(name: &str) -> String {
    let base = final_segment(name);
    match base.rsplit_once('.') {
        Some((_, ext)) => {
            // strip the last ".ext" from the full name, not just the segment
            let suffix = format!(".{ext}");
            match name.strip_suffix(suffix.as_str()) {
                Some(stripped) => stripped.to_string(),
                None => name.to_string(),
            }
        }
        None => name.to_string(),
    }
}

/// Compose `base` with the extension of `source`: `"<base>.<ext>"`.
///
/// Used when a caller overrides the assembled file's base name but keeps the
/// client-declared extension.
pub fn with_extension_of(base: &str, source: &str) -> String {
    format!("{base}.{ext}", ext = extension(source))
}

fn final_segment(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}
