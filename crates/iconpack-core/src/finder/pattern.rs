//! Source expression parsing.
//!
//! Turns `icons/{group}/prefix-{icon_id}.svg` into a glob pattern rooted at
//! the scan directory, plus what is needed to read the group and the icon id
//! back out of every matched path.

use crate::config::FinderConfig;
use regex::Regex;
use std::path::{Component, Path, PathBuf};

/// Why a local expression could not be turned into a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PatternRejection {
    Empty,
    DisallowedExtension(String),
}

/// Extension part of the filename segment.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ExtensionFilter {
    /// A literal extension from the expression, already allow-listed.
    Literal(String),
    /// Missing or wildcard: anything on the allow-list.
    AnyAllowed,
}

/// A parsed local source expression.
#[derive(Debug)]
pub(crate) struct LocalPattern {
    scan_root: PathBuf,
    /// Directory segments followed by the filename segment.
    segments: Vec<String>,
    group_index: Option<usize>,
    icon_id_matcher: Option<Regex>,
    extension: ExtensionFilter,
}

impl LocalPattern {
    /// Parse `expression` relative to `scan_root`.
    ///
    /// `expression` must already have any leading `/` stripped.
    pub(crate) fn parse(
        scan_root: PathBuf,
        expression: &str,
        allowed_extensions: &[&str],
    ) -> Result<Self, PatternRejection> {
        let segments: Vec<String> = expression
            .split('/')
            .filter(|s| !s.is_empty() && *s != ".")
            .map(collapse_recursive_wildcards)
            .collect();

        let Some(filename) = segments.last() else {
            return Err(PatternRejection::Empty);
        };

        let (stem, extension) = split_extension(filename);
        let extension = match extension {
            None => ExtensionFilter::AnyAllowed,
            Some(ext) if ext == "*" => ExtensionFilter::AnyAllowed,
            Some(ext) => {
                let lower = ext.to_lowercase();
                if !allowed_extensions.contains(&lower.as_str()) {
                    return Err(PatternRejection::DisallowedExtension(ext.to_string()));
                }
                ExtensionFilter::Literal(ext.to_string())
            }
        };

        let icon_id_matcher = build_icon_id_matcher(stem);

        let group_index = segments[..segments.len() - 1]
            .iter()
            .position(|s| s == FinderConfig::GROUP_PLACEHOLDER);

        let mut filename_pattern = glob_segment(stem);
        filename_pattern.push('.');
        match &extension {
            ExtensionFilter::Literal(ext) => filename_pattern.push_str(&glob::Pattern::escape(ext)),
            ExtensionFilter::AnyAllowed => filename_pattern.push('*'),
        }

        let mut glob_segments: Vec<String> = segments[..segments.len() - 1]
            .iter()
            .map(|s| glob_segment(s))
            .collect();
        glob_segments.push(filename_pattern);

        Ok(Self {
            scan_root,
            segments: glob_segments,
            group_index,
            icon_id_matcher,
            extension,
        })
    }

    pub(crate) fn scan_root(&self) -> &Path {
        &self.scan_root
    }

    /// Full glob pattern, the escaped scan root followed by the segments.
    pub(crate) fn glob_pattern(&self) -> String {
        let mut pattern = glob::Pattern::escape(&self.scan_root.to_string_lossy());
        for segment in &self.segments {
            if !pattern.ends_with('/') {
                pattern.push('/');
            }
            pattern.push_str(segment);
        }
        pattern
    }

    /// The deepest directory with no wildcard in it.
    ///
    /// Used to tell a missing directory apart from a pattern that simply
    /// matched nothing.
    pub(crate) fn static_prefix(&self) -> PathBuf {
        let mut dir = self.scan_root.clone();
        for segment in &self.segments[..self.segments.len() - 1] {
            if segment.contains(&['*', '[', '?'][..]) {
                break;
            }
            dir.push(segment);
        }
        dir
    }

    /// Whether a matched file has an acceptable extension.
    pub(crate) fn accepts_extension(&self, path: &Path, allowed_extensions: &[&str]) -> bool {
        let Some(ext) = path.extension().map(|e| e.to_string_lossy()) else {
            return false;
        };
        match &self.extension {
            ExtensionFilter::Literal(literal) => ext == literal.as_str(),
            ExtensionFilter::AnyAllowed => {
                allowed_extensions.contains(&ext.to_lowercase().as_str())
            }
        }
    }

    /// Group segment of a matched path, if the expression declares one.
    pub(crate) fn group_for(&self, path: &Path) -> Option<String> {
        let index = self.group_index?;
        let relative = path.strip_prefix(&self.scan_root).ok()?;
        relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                Component::ParentDir => Some("..".to_string()),
                _ => None,
            })
            .nth(index)
    }

    /// Icon id of a matched path.
    ///
    /// With `{icon_id}` in the filename the literal prefix and suffix are
    /// stripped; a filename that does not fit falls back to the raw stem.
    pub(crate) fn icon_id_for(&self, path: &Path) -> Option<String> {
        let stem = path.file_stem()?.to_string_lossy().into_owned();
        let icon_id = self
            .icon_id_matcher
            .as_ref()
            .and_then(|re| re.captures(&stem))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or(stem);
        (!icon_id.is_empty()).then_some(icon_id)
    }
}

/// Split `name.ext` into stem and extension.
///
/// An extension containing a placeholder is not an extension.
fn split_extension(filename: &str) -> (&str, Option<&str>) {
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !ext.is_empty() && !ext.contains(&['{', '}'][..]) => (stem, Some(ext)),
        _ => (filename, None),
    }
}

/// `**` would recurse; scanning is depth zero so it means `*` here.
fn collapse_recursive_wildcards(segment: &str) -> String {
    let mut out = segment.to_string();
    while out.contains("**") {
        out = out.replace("**", "*");
    }
    out
}

/// One glob segment: placeholders become `*`, every other glob
/// metacharacter except `*` is escaped.
fn glob_segment(segment: &str) -> String {
    let wild = collapse_recursive_wildcards(
        &segment
            .replace(FinderConfig::GROUP_PLACEHOLDER, "*")
            .replace(FinderConfig::ICON_ID_PLACEHOLDER, "*"),
    );
    wild.split('*')
        .map(glob::Pattern::escape)
        .collect::<Vec<_>>()
        .join("*")
}

/// Literal text around the icon id, with `*` kept as a wildcard.
fn regex_fragment(literal: &str) -> String {
    literal
        .replace(FinderConfig::GROUP_PLACEHOLDER, "*")
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*")
}

fn build_icon_id_matcher(stem: &str) -> Option<Regex> {
    let (prefix, suffix) = stem.split_once(FinderConfig::ICON_ID_PLACEHOLDER)?;
    let suffix = suffix.replace(FinderConfig::ICON_ID_PLACEHOLDER, "*");
    let pattern = format!(
        "^{}(.+){}$",
        regex_fragment(prefix),
        regex_fragment(&suffix)
    );
    Regex::new(&pattern).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALLOWED: &[&str] = &["svg", "png", "gif"];

    fn parse(expr: &str) -> LocalPattern {
        LocalPattern::parse(PathBuf::from("/srv/pack"), expr, ALLOWED).unwrap()
    }

    #[test]
    fn test_glob_pattern_with_placeholders() {
        let pattern = parse("icons/{group}/{icon_id}.svg");
        assert_eq!(pattern.glob_pattern(), "/srv/pack/icons/*/*.svg");
        assert_eq!(pattern.group_index, Some(1));
        assert_eq!(pattern.static_prefix(), PathBuf::from("/srv/pack/icons"));
    }

    #[test]
    fn test_missing_extension_defaults_to_allow_list() {
        let pattern = parse("icons/{icon_id}");
        assert_eq!(pattern.glob_pattern(), "/srv/pack/icons/*.*");
        assert!(pattern.accepts_extension(Path::new("/srv/pack/icons/a.png"), ALLOWED));
        assert!(!pattern.accepts_extension(Path::new("/srv/pack/icons/a.txt"), ALLOWED));
    }

    #[test]
    fn test_disallowed_extension_is_rejected() {
        let err = LocalPattern::parse(PathBuf::from("/srv"), "secrets/{icon_id}.php", ALLOWED)
            .unwrap_err();
        assert_eq!(err, PatternRejection::DisallowedExtension("php".into()));
    }

    #[test]
    fn test_recursive_wildcard_is_collapsed() {
        let pattern = parse("icons/**/{icon_id}.svg");
        assert_eq!(pattern.glob_pattern(), "/srv/pack/icons/*/*.svg");
    }

    #[test]
    fn test_glob_metacharacters_are_escaped() {
        let pattern = parse("icons [v2]/{icon_id}.svg");
        assert_eq!(pattern.glob_pattern(), "/srv/pack/icons [[]v2[]]/*.svg");
    }

    #[test]
    fn test_icon_id_prefix_and_suffix() {
        let pattern = parse("icons/ic_{icon_id}_24px.svg");
        let id = pattern.icon_id_for(Path::new("/srv/pack/icons/ic_home_24px.svg"));
        assert_eq!(id.as_deref(), Some("home"));

        // Does not fit the shape: raw stem.
        let id = pattern.icon_id_for(Path::new("/srv/pack/icons/other.svg"));
        assert_eq!(id.as_deref(), Some("other"));
    }

    #[test]
    fn test_group_position() {
        let pattern = parse("{group}/sub/{icon_id}.svg");
        let group = pattern.group_for(Path::new("/srv/pack/outline/sub/home.svg"));
        assert_eq!(group.as_deref(), Some("outline"));

        let pattern = parse("icons/{icon_id}.svg");
        assert_eq!(pattern.group_for(Path::new("/srv/pack/icons/home.svg")), None);
    }

    #[test]
    fn test_empty_expression() {
        let err = LocalPattern::parse(PathBuf::from("/srv"), "./", ALLOWED).unwrap_err();
        assert_eq!(err, PatternRejection::Empty);
    }
}
