//! Path resolution
//!
//! Pure functions mapping link tokens to candidate paths and computing the
//! display-relative paths inserted by completions. No I/O happens here.

use std::path::{Component, Path, PathBuf};

/// Group label for documents sitting directly under the collection root.
pub const ROOT_GROUP: &str = "root";

/// Resolve a link token to a candidate absolute path.
///
/// Tokens starting with `./` or `../` resolve against `current_dir`; all
/// others resolve against `root`. The document extension is appended and the
/// result lexically normalized. Returns `None` on an empty token or missing
/// context.
pub fn resolve_target(
    token: &str,
    current_dir: Option<&Path>,
    root: Option<&Path>,
    extension: &str,
) -> Option<PathBuf> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }

    let base = if token.starts_with("./") || token.starts_with("../") {
        current_dir?
    } else {
        root?
    };

    Some(normalize(&base.join(format!("{}.{}", token, extension))))
}

/// Forward-slash relative path from `from_dir` to `to`, extension stripped.
///
/// Always relative to the requesting document's directory, not the
/// collection root, so inserted links survive the collection being moved.
pub fn display_relative(from_dir: &Path, to: &Path, extension: &str) -> String {
    let from = normalize(from_dir);
    let to = normalize(&strip_extension(to, extension));

    let from_parts: Vec<Component> = from.components().collect();
    let to_parts: Vec<Component> = to.components().collect();

    let common = from_parts
        .iter()
        .zip(to_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut segments: Vec<String> = Vec::new();
    for _ in common..from_parts.len() {
        segments.push("..".to_string());
    }
    for part in &to_parts[common..] {
        segments.push(part.as_os_str().to_string_lossy().into_owned());
    }

    segments.join("/")
}

/// Parent directory of a root-relative path, for presentation grouping.
pub fn display_directory(relative: &Path) -> String {
    match relative.parent() {
        Some(parent) if parent.as_os_str().is_empty() => ROOT_GROUP.to_string(),
        Some(parent) => parent
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"),
        None => ROOT_GROUP.to_string(),
    }
}

/// Lexically fold `.` and `..` components without touching the filesystem.
pub(crate) fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn strip_extension(path: &Path, extension: &str) -> PathBuf {
    if path.extension().and_then(|e| e.to_str()) == Some(extension) {
        path.with_extension("")
    } else {
        path.to_path_buf()
    }
}
