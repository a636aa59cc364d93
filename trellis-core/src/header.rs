//! Header block extraction
//!
//! Documents may begin with a `---`-delimited block of `key: value` lines
//! supplying title/summary/date metadata.

use std::collections::HashMap;

/// Extract the header block anchored at the start of `raw`.
///
/// Returns `None` when the document does not open with a `---` line or the
/// block is never closed. Body lines split at the first colon; lines without
/// one are skipped.
pub fn extract(raw: &str) -> Option<HashMap<String, String>> {
    let mut lines = raw.lines();

    if lines.next().map(str::trim_end) != Some("---") {
        return None;
    }

    let mut fields = HashMap::new();
    for line in lines {
        if line.trim_end() == "---" {
            return Some(fields);
        }
        if let Some((key, value)) = line.split_once(':') {
            fields.insert(key.trim().to_string(), value.trim().to_string());
        }
    }

    // Unclosed block
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_fields() {
        let fields = extract("---\ntitle: Alpha\nsummary: test\n---\nbody\n").unwrap();
        assert_eq!(fields.get("title").unwrap(), "Alpha");
        assert_eq!(fields.get("summary").unwrap(), "test");
    }

    #[test]
    fn test_value_keeps_later_colons() {
        let fields = extract("---\nupdated: 2024-01-02T10:30:00\n---\n").unwrap();
        assert_eq!(fields.get("updated").unwrap(), "2024-01-02T10:30:00");
    }

    #[test]
    fn test_no_header() {
        assert!(extract("# Just a heading\n").is_none());
        assert!(extract("").is_none());
    }

    #[test]
    fn test_header_must_be_anchored() {
        assert!(extract("\n---\ntitle: x\n---\n").is_none());
    }

    #[test]
    fn test_unclosed_block() {
        assert!(extract("---\ntitle: x\nbody without closing\n").is_none());
    }

    #[test]
    fn test_lines_without_colon_skipped() {
        let fields = extract("---\ntitle: x\njust words\n---\n").unwrap();
        assert_eq!(fields.len(), 1);
    }

    #[test]
    fn test_empty_block() {
        let fields = extract("---\n---\nbody\n").unwrap();
        assert!(fields.is_empty());
    }
}
