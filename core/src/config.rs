//! Run configuration and credential handling.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::debug;

/// Content directories tried, relative to the working directory, when none is given.
pub const DEFAULT_CONTENT_DIRS: [&str; 2] = ["../content/posts", "./content/posts"];

pub const DEFAULT_RELATED_POSTS: usize = 5;
pub const DEFAULT_SUMMARY_LENGTH: usize = 150;
pub const DEFAULT_KEYWORD_COUNT: usize = 5;
/// Characters of post text handed to the enricher for color generation.
pub const DEFAULT_CONTENT_SAMPLE: usize = 1000;
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-haiku-20240307";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Content directory not found; tried: {}", format_paths(.0))]
    ContentDirNotFound(Vec<PathBuf>),

    #[error("Unknown embedder '{0}' (expected 'hashing' or 'placeholder')")]
    UnknownEmbedder(String),

    #[error("IO error")]
    Io(#[from] std::io::Error),
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Whether a credential-backed capability can be used.
#[derive(Debug, Clone)]
pub enum Capability {
    Enabled(SecretString),
    Disabled,
}

impl Capability {
    pub fn is_enabled(&self) -> bool {
        matches!(self, Capability::Enabled(_))
    }
}

impl From<Option<SecretString>> for Capability {
    /// Empty or whitespace-only keys count as missing.
    fn from(key: Option<SecretString>) -> Self {
        match key {
            Some(key) if !key.expose_secret().trim().is_empty() => Capability::Enabled(key),
            _ => Capability::Disabled,
        }
    }
}

/// Embedder used to index posts for related-post search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmbedderKind {
    #[default]
    Hashing,
    Placeholder,
}

impl FromStr for EmbedderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hashing" => Ok(EmbedderKind::Hashing),
            "placeholder" => Ok(EmbedderKind::Placeholder),
            other => Err(ConfigError::UnknownEmbedder(other.to_string())),
        }
    }
}

impl fmt::Display for EmbedderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmbedderKind::Hashing => f.write_str("hashing"),
            EmbedderKind::Placeholder => f.write_str("placeholder"),
        }
    }
}

/// Configuration of an enrichment run.
#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) content_dir: PathBuf,
    pub(crate) changed_only: bool,
    pub(crate) related_posts: usize,
    pub(crate) summary_length: usize,
    pub(crate) keyword_count: usize,
    pub(crate) content_sample: usize,
    pub(crate) embedder: EmbedderKind,
    pub(crate) model: String,
    pub(crate) anthropic_api_key: Option<SecretString>,
    pub(crate) unsplash_api_key: Option<SecretString>,
}

impl Config {
    pub fn new(content_dir: impl Into<PathBuf>) -> Self {
        Self {
            content_dir: content_dir.into(),
            changed_only: false,
            related_posts: DEFAULT_RELATED_POSTS,
            summary_length: DEFAULT_SUMMARY_LENGTH,
            keyword_count: DEFAULT_KEYWORD_COUNT,
            content_sample: DEFAULT_CONTENT_SAMPLE,
            embedder: EmbedderKind::default(),
            model: DEFAULT_ANTHROPIC_MODEL.to_string(),
            anthropic_api_key: None,
            unsplash_api_key: None,
        }
    }

    /// Only process files that git reports as changed.
    #[must_use]
    pub fn changed_only(mut self, changed_only: bool) -> Self {
        self.changed_only = changed_only;
        self
    }

    #[must_use]
    pub fn related_posts(mut self, count: usize) -> Self {
        self.related_posts = count;
        self
    }

    #[must_use]
    pub fn summary_length(mut self, max_chars: usize) -> Self {
        self.summary_length = max_chars;
        self
    }

    #[must_use]
    pub fn keyword_count(mut self, count: usize) -> Self {
        self.keyword_count = count;
        self
    }

    #[must_use]
    pub fn content_sample(mut self, max_chars: usize) -> Self {
        self.content_sample = max_chars;
        self
    }

    #[must_use]
    pub fn embedder(mut self, kind: EmbedderKind) -> Self {
        self.embedder = kind;
        self
    }

    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn anthropic_api_key(mut self, key: Option<SecretString>) -> Self {
        self.anthropic_api_key = key;
        self
    }

    #[must_use]
    pub fn unsplash_api_key(mut self, key: Option<SecretString>) -> Self {
        self.unsplash_api_key = key;
        self
    }

    pub fn content_dir(&self) -> &Path {
        &self.content_dir
    }

    pub fn is_changed_only(&self) -> bool {
        self.changed_only
    }

    pub fn related_post_count(&self) -> usize {
        self.related_posts
    }

    pub fn max_summary_length(&self) -> usize {
        self.summary_length
    }

    pub fn keywords(&self) -> usize {
        self.keyword_count
    }

    pub fn sample_length(&self) -> usize {
        self.content_sample
    }

    pub fn embedder_kind(&self) -> EmbedderKind {
        self.embedder
    }

    pub fn model_id(&self) -> &str {
        &self.model
    }

    pub fn anthropic(&self) -> Capability {
        self.anthropic_api_key.clone().into()
    }

    pub fn unsplash(&self) -> Capability {
        self.unsplash_api_key.clone().into()
    }

    /// Finds the content directory relative to the working directory.
    ///
    /// See [`Config::resolve_content_dir_from`].
    pub fn resolve_content_dir(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
        let cwd = std::env::current_dir()?;
        Self::resolve_content_dir_from(&cwd, explicit)
    }

    /// Returns `explicit` if given and it is a directory. Otherwise tries each of
    /// [`DEFAULT_CONTENT_DIRS`] under `base` in order.
    pub fn resolve_content_dir_from(
        base: &Path,
        explicit: Option<&Path>,
    ) -> Result<PathBuf, ConfigError> {
        let candidates = match explicit {
            Some(dir) => vec![base.join(dir)],
            None => DEFAULT_CONTENT_DIRS.iter().map(|dir| base.join(dir)).collect(),
        };

        for candidate in &candidates {
            if candidate.is_dir() {
                debug!(dir = %candidate.display(), "Using content directory");
                return Ok(candidate.clone());
            }
        }
        Err(ConfigError::ContentDirNotFound(candidates))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults() {
        let config = Config::new("posts");
        assert_eq!(config.content_dir(), Path::new("posts"));
        assert!(!config.is_changed_only());
        assert_eq!(config.related_post_count(), 5);
        assert_eq!(config.max_summary_length(), 150);
        assert_eq!(config.keywords(), 5);
        assert_eq!(config.sample_length(), 1000);
        assert_eq!(config.embedder_kind(), EmbedderKind::Hashing);
        assert_eq!(config.model_id(), "claude-3-haiku-20240307");
        assert!(!config.anthropic().is_enabled());
        assert!(!config.unsplash().is_enabled());
    }

    #[test]
    fn empty_keys_disable_capabilities() {
        let config = Config::new("posts")
            .anthropic_api_key(Some(SecretString::from("  ".to_string())))
            .unsplash_api_key(Some(SecretString::from("key".to_string())));
        assert!(!config.anthropic().is_enabled());
        assert!(config.unsplash().is_enabled());
    }

    #[test]
    fn embedder_kind_parses() {
        assert_eq!("hashing".parse::<EmbedderKind>().unwrap(), EmbedderKind::Hashing);
        assert_eq!("Placeholder".parse::<EmbedderKind>().unwrap(), EmbedderKind::Placeholder);
        assert!(matches!("bert".parse::<EmbedderKind>(), Err(ConfigError::UnknownEmbedder(_))));
        assert_eq!(EmbedderKind::Placeholder.to_string(), "placeholder");
    }

    #[test]
    fn content_dir_prefers_parent_then_local() {
        let root = tempdir().unwrap();
        let base = root.path().join("blog/scripts");
        std::fs::create_dir_all(&base).unwrap();

        assert!(matches!(
            Config::resolve_content_dir_from(&base, None),
            Err(ConfigError::ContentDirNotFound(tried)) if tried.len() == 2
        ));

        std::fs::create_dir_all(base.join("content/posts")).unwrap();
        let resolved = Config::resolve_content_dir_from(&base, None).unwrap();
        assert_eq!(resolved, base.join("./content/posts"));

        std::fs::create_dir_all(root.path().join("blog/content/posts")).unwrap();
        let resolved = Config::resolve_content_dir_from(&base, None).unwrap();
        assert_eq!(resolved, base.join("../content/posts"));
    }

    #[test]
    fn explicit_content_dir_must_exist() {
        let root = tempdir().unwrap();
        assert!(Config::resolve_content_dir_from(root.path(), Some(Path::new("missing"))).is_err());
        let resolved = Config::resolve_content_dir_from(root.path(), Some(root.path())).unwrap();
        assert_eq!(resolved, root.path());
    }
}
