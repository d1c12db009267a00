//! The enrichment job: indexes every post, then writes derived metadata into each target.
//!
//! A run has two passes over the content directory:
//!
//! 1. **Index.** Every post is read and added to the document store, so related-post search
//!    can see all of them.
//! 2. **Enrich.** Each target post (all posts, or only those git reports as changed) goes
//!    through four steps, each writing its own front-matter key:
//!    `related_posts`, `colors`, `suggested_image` and `summary`.
//!
//! Failures never abort the run. A post that cannot be read or written is skipped and listed
//! in the [`RunReport`]. A failing enricher or image searcher is replaced by its placeholder
//! value for that step.

mod related;

use std::error::Error as StdError;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use crate::config::Config;
use crate::discovery::{self, DiscoveryError};
use crate::embedding::Embedder;
use crate::enrich::{Enricher, PlaceholderEnricher};
use crate::frontmatter::{self, FrontMatterError, Post};
use crate::image::{ImageSearcher, ImageSuggestion};
use crate::markdown;
use crate::store::{DocumentStore, StoreError};

pub use related::{post_url, RelatedPost};

pub const RELATED_POSTS_KEY: &str = "related_posts";
pub const COLORS_KEY: &str = "colors";
pub const SUGGESTED_IMAGE_KEY: &str = "suggested_image";
pub const SUMMARY_KEY: &str = "summary";

/// Errors that stop a run before any post is processed.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("Failed to list posts")]
    Discovery(#[from] DiscoveryError),
}

/// Errors that end the processing of a single post.
#[derive(Debug, Error)]
pub enum StepError {
    #[error("Front matter error")]
    FrontMatter(#[from] FrontMatterError),

    #[error("Document store error")]
    Store(#[from] StoreError),
}

/// Outcome of [`EnrichmentJob::run`].
#[derive(Debug, Default)]
pub struct RunReport {
    /// Number of posts selected for enrichment.
    pub discovered: usize,
    /// Number of posts for which every step was written.
    pub enriched: usize,
    /// Posts (or steps) that failed, with a description of the error.
    pub failed: Vec<(PathBuf, String)>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct EnrichmentJob {
    config: Config,
    store: DocumentStore,
    enricher: Box<dyn Enricher>,
    image_searcher: Box<dyn ImageSearcher>,
}

impl EnrichmentJob {
    pub fn new(
        config: Config,
        embedder: Box<dyn Embedder>,
        enricher: Box<dyn Enricher>,
        image_searcher: Box<dyn ImageSearcher>,
    ) -> Self {
        Self {
            config,
            store: DocumentStore::new(embedder),
            enricher,
            image_searcher,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The document store, populated by the index pass of the last run.
    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    #[instrument(name = "enrichment_job", skip(self), fields(
        dir = %self.config.content_dir().display(),
        enricher = self.enricher.name(),
        image_searcher = self.image_searcher.name(),
        embedder = self.store.embedder().model_name(),
    ))]
    pub async fn run(&mut self) -> Result<RunReport, JobError> {
        let all_files = discovery::list_markdown_files(self.config.content_dir()).await?;
        let targets = self.select_targets(&all_files).await;

        let mut report = RunReport {
            discovered: targets.len(),
            ..RunReport::default()
        };
        info!("Found {} markdown files to process", targets.len());
        if targets.is_empty() {
            return Ok(report);
        }

        let (posts, unreadable) = self.index(&all_files).await;

        for target in &targets {
            info!("Processing: {}", target.display());
            let id = frontmatter::post_id(target);

            let Some(post) = posts.iter().find(|post| post.id() == id) else {
                let reason = unreadable
                    .iter()
                    .find(|(path, _)| frontmatter::post_id(path) == id)
                    .map(|(_, reason)| reason.clone())
                    .unwrap_or_else(|| "Post was not indexed".to_string());
                report.failed.push((target.clone(), reason));
                continue;
            };

            match self.enrich(post).await {
                Ok(()) => report.enriched += 1,
                Err(e) => {
                    error!(
                        path = %post.path().display(),
                        "Failed to enrich post: {}",
                        describe(&e)
                    );
                    report.failed.push((post.path().to_path_buf(), describe(&e)));
                }
            }
        }

        info!("Processing complete!");
        Ok(report)
    }

    /// Posts to enrich: all of them, or the changed ones if configured.
    async fn select_targets(&self, all_files: &[PathBuf]) -> Vec<PathBuf> {
        if !self.config.is_changed_only() {
            return all_files.to_vec();
        }
        match discovery::changed_markdown_files(self.config.content_dir()).await {
            Ok(changed) => changed,
            Err(e) => {
                warn!(
                    "Could not determine changed files, processing all posts: {}",
                    describe(&e)
                );
                all_files.to_vec()
            }
        }
    }

    /// Reads every post and adds it to the document store.
    async fn index(&mut self, files: &[PathBuf]) -> (Vec<Post>, Vec<(PathBuf, String)>) {
        let mut posts = Vec::with_capacity(files.len());
        let mut unreadable = Vec::new();

        for path in files {
            let post = match frontmatter::read(path).await {
                Ok(post) => post,
                Err(e) => {
                    warn!(path = %path.display(), "Skipping unreadable post: {}", describe(&e));
                    unreadable.push((path.clone(), describe(&e)));
                    continue;
                }
            };

            let metadata = related::index_metadata(
                post.title(),
                &path.display().to_string(),
                post.id(),
            );
            if let Err(e) = self.store.add(post.id(), &index_text(&post), metadata).await {
                warn!(path = %path.display(), "Failed to index post: {}", describe(&e));
                unreadable.push((path.clone(), describe(&e)));
                continue;
            }
            posts.push(post);
        }

        debug!(indexed = posts.len(), "Index pass complete");
        (posts, unreadable)
    }

    #[instrument(skip(self, post), fields(id = post.id()))]
    async fn enrich(&self, post: &Post) -> Result<(), StepError> {
        let path = post.path();
        let text = markdown::plain_text(post.content());

        let related = self.related_posts(post).await?;
        write(path, RELATED_POSTS_KEY, &related).await?;

        let colors = self.colors(post).await;
        write(path, COLORS_KEY, &colors).await?;

        let image = self.image(&text).await;
        write(path, SUGGESTED_IMAGE_KEY, &image).await?;

        let summary = self.summary(&text).await;
        write(path, SUMMARY_KEY, &summary).await?;

        Ok(())
    }

    async fn related_posts(&self, post: &Post) -> Result<Vec<RelatedPost>, StoreError> {
        let count = self.config.related_post_count();
        // One extra hit, since the post itself is usually the best match
        let hits = self.store.search(&index_text(post), count.saturating_add(1)).await?;
        let related = related::related_posts(hits, post.id(), count);
        debug!(count = related.len(), "Found related posts");
        Ok(related)
    }

    async fn colors(&self, post: &Post) -> Vec<String> {
        let sample = markdown::sample(post.content(), self.config.sample_length());
        match self.enricher.generate_color_scheme(post.title(), &sample).await {
            Ok(colors) => colors,
            Err(e) => {
                warn!(
                    enricher = self.enricher.name(),
                    "Color generation failed, using placeholder: {}",
                    describe(&e)
                );
                PlaceholderEnricher::colors()
            }
        }
    }

    async fn image(&self, text: &str) -> ImageSuggestion {
        let keywords = match self.enricher.extract_keywords(text, self.config.keywords()).await {
            Ok(keywords) => keywords,
            Err(e) => {
                warn!(
                    enricher = self.enricher.name(),
                    "Keyword extraction failed, using placeholder: {}",
                    describe(&e)
                );
                PlaceholderEnricher::keywords(self.config.keywords())
            }
        };

        match self.image_searcher.search(&keywords).await {
            Ok(Some(image)) => image,
            Ok(None) => {
                info!(keywords = ?keywords, "No image found, using placeholder");
                ImageSuggestion::placeholder()
            }
            Err(e) => {
                warn!(
                    image_searcher = self.image_searcher.name(),
                    "Image search failed, using placeholder: {}",
                    describe(&e)
                );
                ImageSuggestion::placeholder()
            }
        }
    }

    async fn summary(&self, text: &str) -> String {
        let max_length = self.config.max_summary_length();
        match self.enricher.generate_summary(text, max_length).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!(
                    enricher = self.enricher.name(),
                    "Summary generation failed, using placeholder: {}",
                    describe(&e)
                );
                PlaceholderEnricher::summary(max_length)
            }
        }
    }
}

/// Text a post is indexed and searched by.
fn index_text(post: &Post) -> String {
    format!("{}\n\n{}", post.title(), markdown::plain_text(post.content()))
}

async fn write<T: Serialize>(path: &Path, key: &str, value: &T) -> Result<(), FrontMatterError> {
    frontmatter::write(path, frontmatter::update(key, value)?).await?;
    debug!(key, "Wrote front matter key");
    Ok(())
}

/// Formats an error with its chain of sources.
fn describe(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
