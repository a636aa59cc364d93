//! Link resolution and completion
//!
//! Composes the path resolver and the collection index to answer "resolve
//! this link token to document metadata" and "suggest documents matching a
//! partial query." Every call lazily triggers index initialization and the
//! rate-limited rescan, so callers never manage the index lifecycle.

use crate::document::DocMetadata;
use crate::index::CollectionIndex;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A document suggestion for an in-progress link token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionItem {
    /// File stem, shown as the completion label
    pub label: String,
    /// Text to insert, relative to the requesting document's directory
    pub insert_text: String,
    pub sort_text: String,
    /// Parent directory of the document, for grouping
    pub group: String,
    /// Document metadata rendered as markdown; absent when the document
    /// could not be read (the item degrades to a bare label)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
}

/// Resolve a link token to document metadata.
///
/// Direct path resolution (relative markers against `current_dir`, plain
/// tokens against the collection root) takes precedence; tokens whose
/// candidate path is not on disk fall back to the lookup index. An
/// unresolved link yields not-found metadata rather than `None`; `None` is
/// reserved for missing context or an empty token.
pub fn resolve_link(
    index: &mut CollectionIndex,
    token: &str,
    current_dir: Option<&Path>,
) -> Option<DocMetadata> {
    let current_dir = current_dir?;
    let token = token.trim();
    if token.is_empty() {
        return None;
    }

    index.ensure_initialized();
    index.refresh_if_due();

    let extension = index.config().core.extension.clone();
    if let Some(candidate) =
        paths::resolve_target(token, Some(current_dir), Some(index.root()), &extension)
    {
        if candidate.is_file() {
            return Some(index.get_metadata(&candidate));
        }
    }

    if let Some(path) = index.lookup(token) {
        return Some(index.get_metadata(&path));
    }

    let label = token.rsplit(['/', '\\']).next().unwrap_or(token);
    Some(DocMetadata::not_found(label))
}

/// Suggest documents matching `query` for a completion request originating
/// in `current_document`.
///
/// A failure on a single document (deleted between indexing and this call)
/// degrades that item to a bare label; the list itself always comes back.
pub fn completions(
    index: &mut CollectionIndex,
    query: &str,
    current_document: &Path,
) -> Vec<CompletionItem> {
    let Some(current_dir) = current_document.parent() else {
        return Vec::new();
    };

    index.ensure_initialized();
    index.refresh_if_due();

    let extension = index.config().core.extension.clone();
    let hits = index.search(query);

    let mut items = Vec::with_capacity(hits.len());
    for hit in hits {
        let insert_text = paths::display_relative(current_dir, &hit.absolute, &extension);
        let group = paths::display_directory(&hit.relative);
        let metadata = index.get_metadata(&hit.absolute);
        let documentation = metadata.exists.then(|| metadata.to_markdown());

        items.push(CompletionItem {
            label: hit.name,
            sort_text: insert_text.clone(),
            insert_text,
            group,
            documentation,
        });
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_doc(root: &Path, rel: &str, content: &str) -> PathBuf {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    fn test_index(root: &Path) -> CollectionIndex {
        let mut config = Config::default();
        config.core.rescan_interval = "0s".to_string();
        CollectionIndex::new(root.to_path_buf(), config)
    }

    fn setup() -> (TempDir, CollectionIndex) {
        let dir = TempDir::new().unwrap();
        write_doc(dir.path(), "notes/a.md", "---\ntitle: Alpha\nsummary: test\n---\n");
        write_doc(dir.path(), "notes/b.md", "see [[a]]\n");
        write_doc(dir.path(), "outside.md", "---\ntitle: Outside\n---\n");
        let index = test_index(dir.path());
        (dir, index)
    }

    #[test]
    fn test_resolve_by_name() {
        let (dir, mut index) = setup();
        let from = dir.path().join("notes");

        let meta = resolve_link(&mut index, "a", Some(&from)).unwrap();
        assert!(meta.exists);
        assert_eq!(meta.title, "Alpha");
        assert_eq!(meta.summary.as_deref(), Some("test"));
    }

    #[test]
    fn test_resolve_relative_takes_precedence_over_root() {
        let (dir, mut index) = setup();
        let from = dir.path().join("notes");

        // outside.md lives one level above notes/; the ../ marker must hit
        // it through relative resolution, not root-relative lookup.
        let meta = resolve_link(&mut index, "../outside", Some(&from)).unwrap();
        assert!(meta.exists);
        assert_eq!(meta.title, "Outside");
    }

    #[test]
    fn test_resolve_same_name_prefers_current_dir_for_dot_marker() {
        let dir = TempDir::new().unwrap();
        write_doc(dir.path(), "x.md", "---\ntitle: Top\n---\n");
        write_doc(dir.path(), "notes/x.md", "---\ntitle: Nested\n---\n");
        let mut index = test_index(dir.path());
        let from = dir.path().join("notes");

        assert_eq!(resolve_link(&mut index, "./x", Some(&from)).unwrap().title, "Nested");
        assert_eq!(resolve_link(&mut index, "x", Some(&from)).unwrap().title, "Top");
    }

    #[test]
    fn test_resolve_falls_back_to_index_lookup() {
        let (dir, mut index) = setup();
        let from = dir.path().join("elsewhere");

        // No file at <root>/a.md, but the index knows notes/a.md by name.
        let meta = resolve_link(&mut index, "a", Some(&from)).unwrap();
        assert!(meta.exists);
        assert_eq!(meta.title, "Alpha");
    }

    #[test]
    fn test_unresolved_link_yields_not_found() {
        let (dir, mut index) = setup();
        let from = dir.path().join("notes");

        let meta = resolve_link(&mut index, "ghost", Some(&from)).unwrap();
        assert!(!meta.exists);
        assert_eq!(meta.title, "ghost");

        let meta = resolve_link(&mut index, "deep/ghost", Some(&from)).unwrap();
        assert!(!meta.exists);
        assert_eq!(meta.title, "ghost");
    }

    #[test]
    fn test_missing_context_returns_none() {
        let (_dir, mut index) = setup();
        assert!(resolve_link(&mut index, "a", None).is_none());

        let from = PathBuf::from("/somewhere");
        assert!(resolve_link(&mut index, "", Some(&from)).is_none());
        assert!(resolve_link(&mut index, "   ", Some(&from)).is_none());
    }

    #[test]
    fn test_completions_empty_query_lists_collection() {
        let (dir, mut index) = setup();
        let doc = dir.path().join("notes/b.md");

        let items = completions(&mut index, "", &doc);
        assert_eq!(items.len(), 3);
        for item in &items {
            assert!(!item.insert_text.is_empty());
            assert_eq!(item.sort_text, item.insert_text);
        }
    }

    #[test]
    fn test_completion_insert_text_relative_to_document() {
        let (dir, mut index) = setup();
        let doc = dir.path().join("notes/b.md");

        let items = completions(&mut index, "outside", &doc);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].insert_text, "../outside");
        assert_eq!(items[0].group, paths::ROOT_GROUP);
        assert!(items[0].documentation.as_deref().unwrap().contains("Outside"));
    }

    #[test]
    fn test_completion_grouping_label() {
        let (dir, mut index) = setup();
        let doc = dir.path().join("outside.md");

        let items = completions(&mut index, "notes/a", &doc);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].group, "notes");
        assert_eq!(items[0].insert_text, "notes/a");
    }

    #[test]
    fn test_completion_degrades_on_unreadable_document() {
        let dir = TempDir::new().unwrap();
        write_doc(dir.path(), "notes/b.md", "see [[outside]]\n");
        write_doc(dir.path(), "outside.md", "---\ntitle: Outside\n---\n");
        let doc = dir.path().join("notes/b.md");

        // Long interval keeps the rescan from noticing the deletion below.
        let mut config = Config::default();
        config.core.rescan_interval = "1h".to_string();
        let mut index = CollectionIndex::new(dir.path().to_path_buf(), config);
        index.ensure_initialized();

        // Delete between indexing and the completion call.
        fs::remove_file(dir.path().join("outside.md")).unwrap();

        let items = completions(&mut index, "outside", &doc);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].label, "outside");
        assert!(items[0].documentation.is_none());
    }

    #[test]
    fn test_completion_triggers_initialization() {
        let (dir, mut index) = setup();
        let doc = dir.path().join("notes/b.md");

        // No explicit ensure_initialized: the first completion call must do
        // the full walk itself.
        assert!(!index.status().initialized);
        let items = completions(&mut index, "", &doc);
        assert!(!items.is_empty());
        assert!(index.status().initialized);
    }
}
