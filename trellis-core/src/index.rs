//! Collection index and metadata cache
//!
//! Owns the lookup table from normalized tokens to absolute paths, the
//! per-file metadata cache with modification-time validity, and the scan
//! clock that rate-limits structural rescans. The index is an explicitly
//! owned value: mutating operations take `&mut self` and a rescan stages a
//! complete replacement table before swapping it in, so readers never
//! observe a partially built index.

use crate::config::Config;
use crate::document::{self, DocMetadata};
use globset::{GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Cached metadata plus the modification time it was computed against.
#[derive(Debug, Clone)]
struct CacheEntry {
    metadata: DocMetadata,
    mtime: SystemTime,
}

/// Mapping from normalized tokens to absolute paths.
///
/// Key order follows first insertion during the last rebuild; the stored
/// path for a colliding key is last-writer-wins.
#[derive(Debug, Default)]
struct LookupTable {
    order: Vec<String>,
    map: HashMap<String, PathBuf>,
}

impl LookupTable {
    fn insert(&mut self, key: String, path: PathBuf) {
        if self.map.insert(key.clone(), path).is_none() {
            self.order.push(key);
        }
    }

    fn get(&self, key: &str) -> Option<&PathBuf> {
        self.map.get(key)
    }

    fn iter(&self) -> impl Iterator<Item = (&str, &PathBuf)> {
        self.order
            .iter()
            .filter_map(|k| self.map.get(k).map(|p| (k.as_str(), p)))
    }

    fn len(&self) -> usize {
        self.order.len()
    }
}

/// Index status information
#[derive(Debug, Clone, Serialize)]
pub struct IndexStatus {
    pub cache_entries: usize,
    pub index_keys: usize,
    pub last_scan: Option<String>,
    pub initialized: bool,
}

/// A search match against the lookup table.
#[derive(Debug, Clone)]
pub struct SearchHit {
    /// File stem, extension stripped
    pub name: String,
    /// Path relative to the collection root
    pub relative: PathBuf,
    pub absolute: PathBuf,
}

/// In-memory index over a collection of documents.
pub struct CollectionIndex {
    root: PathBuf,
    config: Config,
    initialized: bool,
    lookup: LookupTable,
    cache: HashMap<PathBuf, CacheEntry>,
    last_scan: Option<Instant>,
    last_scan_wall: Option<SystemTime>,
    warned_missing_root: bool,
}

impl CollectionIndex {
    pub fn new(root: PathBuf, config: Config) -> Self {
        Self {
            root,
            config,
            initialized: false,
            lookup: LookupTable::default(),
            cache: HashMap::new(),
            last_scan: None,
            last_scan_wall: None,
            warned_missing_root: false,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// One-shot full walk with eager metadata extraction.
    ///
    /// Idempotent: only the first call for this index performs the walk.
    /// Failures (missing root, unreadable subtrees) are logged and leave the
    /// index empty; queries then degrade to "no match" instead of erroring.
    pub fn ensure_initialized(&mut self) {
        if self.initialized {
            return;
        }
        self.initialized = true;
        self.rescan(true);
    }

    /// Structural rescan, rate-limited to the configured interval.
    ///
    /// Rebuilds the lookup table from scratch (directory structure may have
    /// changed) without re-reading file contents; cache entries whose
    /// modification time changed are evicted and recomputed on the next
    /// `get_metadata`.
    pub fn refresh_if_due(&mut self) {
        if !self.initialized {
            self.ensure_initialized();
            return;
        }
        match self.last_scan {
            Some(at) if at.elapsed() < self.config.rescan_interval() => {}
            _ => self.rescan(false),
        }
    }

    fn rescan(&mut self, eager: bool) {
        let started = Instant::now();
        let files = self.walk_collection();

        let mut lookup = LookupTable::default();
        let mut seen: HashSet<PathBuf> = HashSet::with_capacity(files.len());

        for path in files {
            let rel = match path.strip_prefix(&self.root) {
                Ok(rel) => rel,
                Err(_) => continue,
            };

            lookup.insert(normalize_key(&document::stem_label(&path)), path.clone());
            let rel_key = rel
                .with_extension("")
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            lookup.insert(normalize_key(&rel_key), path.clone());

            if eager {
                self.load_into_cache(&path);
            } else if let Some(entry) = self.cache.get(&path) {
                match fs::metadata(&path).and_then(|m| m.modified()) {
                    Ok(mtime) if mtime == entry.mtime => {}
                    _ => {
                        self.cache.remove(&path);
                    }
                }
            }
            seen.insert(path);
        }

        // Entries whose file left the collection are unreachable via the new
        // table; drop them rather than letting them pin stale metadata.
        self.cache.retain(|path, _| seen.contains(path));

        self.lookup = lookup;
        self.last_scan = Some(Instant::now());
        self.last_scan_wall = Some(SystemTime::now());

        tracing::debug!(
            documents = seen.len(),
            keys = self.lookup.len(),
            eager,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "collection scan complete"
        );
    }

    /// Walk the collection root, honoring .gitignore and configured ignore
    /// patterns, collecting files with the recognized document extension.
    fn walk_collection(&mut self) -> Vec<PathBuf> {
        if !self.root.is_dir() {
            // Warn once; rescan retries would otherwise repeat this every
            // interval.
            if !self.warned_missing_root {
                tracing::warn!(root = %self.root.display(), "collection root missing; index left empty");
                self.warned_missing_root = true;
            }
            return Vec::new();
        }
        self.warned_missing_root = false;

        let ignore_set = self.build_ignore_set();

        let mut builder = WalkBuilder::new(&self.root);
        builder.hidden(false);
        builder.git_ignore(true);
        builder.git_global(true);
        builder.git_exclude(true);
        // Deterministic visit order makes name-collision resolution stable.
        builder.sort_by_file_name(|a, b| a.cmp(b));

        let mut files = Vec::new();
        for entry in builder.build() {
            let entry = match entry {
                Ok(e) => e,
                Err(err) => {
                    tracing::warn!(error = %err, "skipping unreadable entry");
                    continue;
                }
            };

            let path = entry.path();
            if path.is_dir() {
                continue;
            }

            let relative = path.strip_prefix(&self.root).unwrap_or(path);
            if ignore_set.is_match(relative) {
                continue;
            }

            if path.extension().and_then(|e| e.to_str()) != Some(self.config.core.extension.as_str())
            {
                continue;
            }

            files.push(path.to_path_buf());
        }

        files
    }

    fn build_ignore_set(&self) -> GlobSet {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.config.ignore.patterns {
            let glob_pattern = if pattern.contains('*') || pattern.contains('?') {
                pattern.clone()
            } else {
                format!("**/{}", pattern)
            };
            if let Ok(g) = globset::Glob::new(&glob_pattern) {
                builder.add(g);
            }
            if let Ok(g) = globset::Glob::new(&format!("**/{}/**", pattern)) {
                builder.add(g);
            }
        }
        builder.build().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "invalid ignore patterns; ignoring none");
            GlobSet::empty()
        })
    }

    /// Read, extract, and cache metadata for `path` keyed by its current
    /// modification time. An unreadable file evicts any entry and yields
    /// not-found metadata.
    fn load_into_cache(&mut self, path: &Path) -> DocMetadata {
        let loaded = fs::metadata(path)
            .and_then(|m| m.modified())
            .and_then(|mtime| fs::read_to_string(path).map(|source| (mtime, source)));

        match loaded {
            Ok((mtime, source)) => {
                let metadata = DocMetadata::from_source(&source, path);
                self.cache.insert(
                    path.to_path_buf(),
                    CacheEntry {
                        metadata: metadata.clone(),
                        mtime,
                    },
                );
                metadata
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "failed to read document");
                self.cache.remove(path);
                DocMetadata::not_found(document::stem_label(path))
            }
        }
    }

    /// Metadata for `path`, served from cache when the entry's recorded
    /// modification time still matches the live file.
    pub fn get_metadata(&mut self, path: &Path) -> DocMetadata {
        if let Some(entry) = self.cache.get(path) {
            if let Ok(mtime) = fs::metadata(path).and_then(|m| m.modified()) {
                if mtime == entry.mtime {
                    return entry.metadata.clone();
                }
            }
        }
        self.load_into_cache(path)
    }

    /// Exact lookup of a normalized token, falling back to the token's final
    /// path segment.
    pub fn lookup(&self, token: &str) -> Option<PathBuf> {
        let needle = normalize_key(token);
        if needle.is_empty() {
            return None;
        }
        if let Some(path) = self.lookup.get(&needle) {
            return Some(path.clone());
        }
        let base = needle.rsplit('/').next()?;
        self.lookup.get(base).cloned()
    }

    /// Case-insensitive substring search over index keys.
    ///
    /// An empty query matches every indexed document. Results are
    /// deduplicated by relative path (a document carries two keys), follow
    /// the insertion order of the last rebuild, and are truncated at the
    /// configured maximum.
    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        let needle = query.trim().to_lowercase();
        let mut seen: HashSet<PathBuf> = HashSet::new();
        let mut hits = Vec::new();

        for (key, path) in self.lookup.iter() {
            if !needle.is_empty() && !key.contains(&needle) {
                continue;
            }
            let relative = path.strip_prefix(&self.root).unwrap_or(path).to_path_buf();
            if !seen.insert(relative.clone()) {
                continue;
            }
            hits.push(SearchHit {
                name: document::stem_label(path),
                relative,
                absolute: path.clone(),
            });
            if hits.len() >= self.config.core.max_results {
                break;
            }
        }

        hits
    }

    /// Get index status
    pub fn status(&self) -> IndexStatus {
        let last_scan = self.last_scan_wall.map(|ts| {
            OffsetDateTime::from(ts)
                .format(&Rfc3339)
                .unwrap_or_else(|_| "unknown".to_string())
        });

        IndexStatus {
            cache_entries: self.cache.len(),
            index_keys: self.lookup.len(),
            last_scan,
            initialized: self.initialized,
        }
    }
}

/// Lower-cased, forward-slash form shared by index keys and query tokens.
fn normalize_key(token: &str) -> String {
    token.trim().replace('\\', "/").to_lowercase()
}
