//! Document metadata model

use crate::header;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Metadata derived from a document's header block.
///
/// `exists: false` is the "not found" sentinel for unresolved links; callers
/// get one of these instead of an error so they can render a consistent
/// not-found affordance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocMetadata {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    pub exists: bool,
}

impl DocMetadata {
    /// Build metadata from raw document text, falling back to the file's
    /// stem as title when there is no header or no title field.
    pub fn from_source(source: &str, path: &Path) -> Self {
        let fields = header::extract(source);
        let fallback = || stem_label(path);

        match fields {
            Some(mut fields) => Self {
                title: fields.remove("title").filter(|t| !t.is_empty()).unwrap_or_else(fallback),
                summary: fields.remove("summary"),
                created: fields.remove("created"),
                updated: fields.remove("updated"),
                exists: true,
            },
            None => Self {
                title: fallback(),
                summary: None,
                created: None,
                updated: None,
                exists: true,
            },
        }
    }

    /// The sentinel for a link that resolved to nothing on disk.
    pub fn not_found(label: impl Into<String>) -> Self {
        Self {
            title: label.into(),
            summary: None,
            created: None,
            updated: None,
            exists: false,
        }
    }

    /// Render as markdown for hover/completion documentation.
    pub fn to_markdown(&self) -> String {
        if !self.exists {
            return format!("**{}** _(not found)_", self.title);
        }

        let mut out = format!("**{}**", self.title);
        if let Some(summary) = &self.summary {
            out.push_str("\n\n");
            out.push_str(summary);
        }
        match (&self.created, &self.updated) {
            (Some(created), Some(updated)) => {
                out.push_str(&format!("\n\ncreated {} · updated {}", created, updated));
            }
            (Some(created), None) => out.push_str(&format!("\n\ncreated {}", created)),
            (None, Some(updated)) => out.push_str(&format!("\n\nupdated {}", updated)),
            (None, None) => {}
        }
        out
    }
}

/// File stem used as a display label (extension stripped).
pub(crate) fn stem_label(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
