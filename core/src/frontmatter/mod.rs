//! Reading and writing the YAML front matter of markdown posts.
//!
//! A post file consists of a metadata block delimited by `---` lines, followed by the
//! free-text body:
//!
//! ```text
//! ---
//! title: My post
//! tags: [rust]
//! ---
//! Body text...
//! ```
//!
//! Files without an opening delimiter are treated as having empty metadata; the whole file
//! is the body. TOML front matter (`+++`) is recognized but not supported.
//!
//! # Updating metadata
//!
//! [`write`] merges a set of updates into the metadata already on disk: keys present in the
//! updates overwrite existing values (keeping their position), new keys are appended, and
//! all other keys are retained. The body is written back byte-for-byte.
//!
//! There is no locking. Each file is expected to be touched by a single sequential pass,
//! and writes replace the whole file.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_yaml::{Mapping, Value};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, instrument};

/// Ordered key-value metadata of a post.
pub type Metadata = Mapping;

const YAML_DELIMITER: &str = "---";
const TOML_DELIMITER: &str = "+++";
const BYTE_ORDER_MARK: char = '\u{feff}';

pub const TITLE_KEY: &str = "title";
pub const UNTITLED: &str = "Untitled";

#[derive(Debug, Error)]
pub enum FrontMatterError {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("IO error")]
    Io(#[from] std::io::Error),

    #[error("Front matter is not valid YAML")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Front matter is opened but never closed: {0}")]
    Unterminated(PathBuf),

    #[error("Front matter is not a key-value mapping: {0}")]
    NotAMapping(PathBuf),

    #[error("Unsupported front matter format (only YAML is supported): {0}")]
    UnsupportedFormat(PathBuf),
}

pub type Result<T> = std::result::Result<T, FrontMatterError>;

/// A parsed post: metadata plus body.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    path: PathBuf,
    id: String,
    metadata: Metadata,
    content: String,
}

impl Post {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Identifier derived from the file name (`my-post.md` -> `my-post`).
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the `title` metadata value, or `"Untitled"` if missing or not a string.
    pub fn title(&self) -> &str {
        self.metadata
            .get(TITLE_KEY)
            .and_then(Value::as_str)
            .unwrap_or(UNTITLED)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }

    /// Merges `updates` into the metadata. Existing keys keep their position.
    pub fn merge(&mut self, updates: Metadata) {
        for (key, value) in updates {
            self.metadata.insert(key, value);
        }
    }
}

/// Derives a post identifier from its path.
pub fn post_id(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Builds a single-entry metadata update from any serializable value.
pub fn update<T: Serialize>(key: &str, value: &T) -> Result<Metadata> {
    let mut metadata = Metadata::new();
    metadata.insert(Value::String(key.to_string()), serde_yaml::to_value(value)?);
    Ok(metadata)
}

/// Reads a post and parses its front matter.
#[instrument(skip(path), fields(path = %path.display()))]
pub async fn read(path: &Path) -> Result<Post> {
    let text = fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            FrontMatterError::FileNotFound(path.to_path_buf())
        } else {
            FrontMatterError::Io(e)
        }
    })?;

    let (metadata, content) = parse(path, &text)?;
    debug!(keys = metadata.len(), "Front matter parsed");

    Ok(Post {
        path: path.to_path_buf(),
        id: post_id(path),
        metadata,
        content: content.to_string(),
    })
}

/// Merges `updates` into the post's metadata on disk, keeping the body intact.
#[instrument(skip(path, updates), fields(path = %path.display(), keys = updates.len()))]
pub async fn write(path: &Path, updates: Metadata) -> Result<()> {
    let mut post = read(path).await?;
    post.merge(updates);
    save(&post).await
}

/// Writes a post back to its path, replacing the whole file.
#[instrument(skip(post), fields(path = %post.path.display()))]
pub async fn save(post: &Post) -> Result<()> {
    let rendered = render(&post.metadata, &post.content)?;
    fs::write(&post.path, rendered).await?;
    debug!("Front matter saved");
    Ok(())
}

fn parse<'a>(path: &Path, text: &'a str) -> Result<(Metadata, &'a str)> {
    match split(text) {
        Split::Bare(body) => Ok((Metadata::new(), body)),
        Split::Yaml { yaml, body } => match serde_yaml::from_str::<Value>(yaml)? {
            Value::Null => Ok((Metadata::new(), body)),
            Value::Mapping(metadata) => Ok((metadata, body)),
            _ => Err(FrontMatterError::NotAMapping(path.to_path_buf())),
        },
        Split::Unterminated => Err(FrontMatterError::Unterminated(path.to_path_buf())),
        Split::Toml => Err(FrontMatterError::UnsupportedFormat(path.to_path_buf())),
    }
}

fn render(metadata: &Metadata, body: &str) -> Result<String> {
    let yaml = if metadata.is_empty() {
        String::new()
    } else {
        serde_yaml::to_string(metadata)?
    };
    Ok(format!("{YAML_DELIMITER}\n{yaml}{YAML_DELIMITER}\n{body}"))
}

#[derive(Debug, PartialEq, Eq)]
enum Split<'a> {
    Bare(&'a str),
    Yaml { yaml: &'a str, body: &'a str },
    Unterminated,
    Toml,
}

fn split(text: &str) -> Split<'_> {
    let text = text.strip_prefix(BYTE_ORDER_MARK).unwrap_or(text);
    let mut lines = text.split_inclusive('\n');

    let Some(first) = lines.next() else {
        return Split::Bare(text);
    };
    match first.trim_end() {
        YAML_DELIMITER => {}
        TOML_DELIMITER => return Split::Toml,
        _ => return Split::Bare(text),
    }

    let yaml_start = first.len();
    let mut offset = yaml_start;
    for line in lines {
        if line.trim_end() == YAML_DELIMITER {
            return Split::Yaml {
                yaml: &text[yaml_start..offset],
                body: &text[offset + line.len()..],
            };
        }
        offset += line.len();
    }
    Split::Unterminated
}
