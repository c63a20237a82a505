//! Source expression resolution.
//!
//! `IconFinder` turns the `config.sources` of a pack into concrete file
//! references. Every problem it meets (missing directory, disallowed
//! extension, bad glob, unsupported URL scheme) is logged and the source
//! contributes nothing; it never fails.
//!
//! Scanning is depth zero: each segment of an expression matches exactly one
//! path level, so a pack reaches deeper directories only by spelling out the
//! extra segments (`icons/*/{icon_id}.svg`).

mod pattern;

use crate::config::FinderConfig;
use pattern::{LocalPattern, PatternRejection};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use url::Url;

/// A resolved icon file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    /// Icon id derived from the filename.
    pub icon_id: String,
    /// Root-relative web path (`/icons/home.svg`) or the remote URL.
    pub source: String,
    /// File on disk, `None` for remote sources.
    pub absolute_path: Option<PathBuf>,
    /// Group extracted through `{group}`.
    pub group: Option<String>,
}

impl FileRef {
    pub fn is_remote(&self) -> bool {
        self.absolute_path.is_none()
    }
}

/// Whether `source` is a remote URL (scheme and `://`) rather than a path.
pub fn is_remote_source(source: &str) -> bool {
    source.contains("://") && Url::parse(source).is_ok()
}

/// Resolves source expressions against a root directory.
#[derive(Debug, Clone)]
pub struct IconFinder {
    root: PathBuf,
}

impl IconFinder {
    /// Create a finder; root-relative sources (`/icons/...`) resolve here.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve every source of a pack, keyed by icon id.
    ///
    /// Sources are resolved in order and the first file found for an id
    /// wins; later duplicates are dropped.
    pub fn get_files_from_sources(
        &self,
        sources: &[String],
        relative_path: &str,
    ) -> BTreeMap<String, FileRef> {
        let mut files: BTreeMap<String, FileRef> = BTreeMap::new();
        for source in sources {
            for file in self.resolve_source(source, relative_path, FinderConfig::ALLOWED_EXTENSIONS)
            {
                if let Some(existing) = files.get(&file.icon_id) {
                    debug!(
                        "Icon '{}' from {} already resolved from {}, keeping the first",
                        file.icon_id, file.source, existing.source
                    );
                    continue;
                }
                files.insert(file.icon_id.clone(), file);
            }
        }
        files
    }

    /// Resolve one source expression, in sorted path order.
    ///
    /// `relative_path` is the pack's directory relative to the root.
    pub fn resolve_source(
        &self,
        source: &str,
        relative_path: &str,
        allowed_extensions: &[&str],
    ) -> Vec<FileRef> {
        let source = source.trim();
        if source.is_empty() {
            warn!("Ignoring empty icon source");
            return Vec::new();
        }

        if is_remote_source(source) {
            return self.resolve_remote(source).into_iter().collect();
        }

        let (base, expression) = match source.strip_prefix('/') {
            Some(stripped) => (String::new(), stripped),
            None => {
                let base = relative_path.trim_matches('/');
                if base.is_empty() {
                    warn!(
                        "Ignoring relative icon source '{}': the pack has no base path",
                        source
                    );
                    return Vec::new();
                }
                (base.to_string(), source)
            }
        };

        let scan_root = if base.is_empty() {
            self.root.clone()
        } else {
            self.root.join(&base)
        };

        let pattern = match LocalPattern::parse(scan_root, expression, allowed_extensions) {
            Ok(pattern) => pattern,
            Err(PatternRejection::Empty) => {
                warn!("Ignoring icon source '{}': no filename", source);
                return Vec::new();
            }
            Err(PatternRejection::DisallowedExtension(ext)) => {
                warn!(
                    "Ignoring icon source '{}': extension '{}' is not one of {:?}",
                    source, ext, allowed_extensions
                );
                return Vec::new();
            }
        };

        self.scan(source, &pattern, allowed_extensions)
    }

    fn scan(&self, source: &str, pattern: &LocalPattern, allowed_extensions: &[&str]) -> Vec<FileRef> {
        let prefix = pattern.static_prefix();
        if !prefix.is_dir() {
            warn!(
                "Icon source '{}': directory {} does not exist",
                source,
                prefix.display()
            );
            return Vec::new();
        }

        let options = glob::MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: true,
        };
        let glob_pattern = pattern.glob_pattern();
        let paths = match glob::glob_with(&glob_pattern, options) {
            Ok(paths) => paths,
            Err(e) => {
                warn!("Icon source '{}': invalid pattern {}: {}", source, glob_pattern, e);
                return Vec::new();
            }
        };

        let mut files = Vec::new();
        for entry in paths {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    warn!("Icon source '{}': unreadable entry: {}", source, e);
                    continue;
                }
            };
            if !path.is_file() || !pattern.accepts_extension(&path, allowed_extensions) {
                continue;
            }
            let Some(icon_id) = pattern.icon_id_for(&path) else {
                continue;
            };
            files.push(FileRef {
                icon_id,
                source: self.web_path(&path),
                group: pattern.group_for(&path),
                absolute_path: Some(path),
            });
        }

        debug!(
            "Icon source '{}' matched {} files under {}",
            source,
            files.len(),
            pattern.scan_root().display()
        );
        files
    }

    fn resolve_remote(&self, source: &str) -> Option<FileRef> {
        let url = match Url::parse(source) {
            Ok(url) => url,
            Err(e) => {
                warn!("Ignoring icon source '{}': invalid URL: {}", source, e);
                return None;
            }
        };

        if !FinderConfig::REMOTE_SCHEMES.contains(&url.scheme()) || !url.has_host() {
            warn!(
                "Ignoring icon source '{}': scheme '{}' is not supported",
                source,
                url.scheme()
            );
            return None;
        }

        let filename = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .unwrap_or_default();
        let icon_id = Path::new(filename)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        if icon_id.is_empty() {
            warn!("Ignoring icon source '{}': URL has no filename", source);
            return None;
        }

        Some(FileRef {
            icon_id,
            source: url.to_string(),
            absolute_path: None,
            group: None,
        })
    }

    /// `/`-prefixed path relative to the root, forward slashes.
    fn web_path(&self, path: &Path) -> String {
        match path.strip_prefix(&self.root) {
            Ok(relative) => {
                let parts: Vec<String> = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect();
                format!("/{}", parts.join("/"))
            }
            Err(_) => path.to_string_lossy().into_owned(),
        }
    }
}
