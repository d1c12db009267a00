use anyhow::{Context, Result};
use tracing::{info, warn};

use flexiona_core::embedding::{Embedder, HashingEmbedder, PlaceholderEmbedder};
use flexiona_core::enrich::{Enricher, PlaceholderEnricher};
use flexiona_core::image::{ImageSearcher, PlaceholderImageSearcher};
use flexiona_core::{Capability, Config, EmbedderKind, EnrichmentJob, RunReport};
use flexiona_extensions::{AnthropicConfig, AnthropicEnricher, UnsplashClient, UnsplashConfig};

use crate::cli::Cli;

/// The application: a resolved configuration plus the capabilities it selects.
pub struct Flexiona {
    config: Config,
}

impl Flexiona {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Builds the configuration from command-line arguments.
    ///
    /// Fails if no content directory can be found.
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let content_dir = Config::resolve_content_dir(cli.content_dir.as_deref())
            .context("Content directory not found. Pass --content-dir or run from the blog root.")?;

        let config = Config::new(content_dir)
            .changed_only(cli.changed_only)
            .related_posts(cli.related_posts)
            .summary_length(cli.summary_length)
            .keyword_count(cli.keywords)
            .embedder(cli.embedder)
            .model(cli.model)
            .anthropic_api_key(cli.anthropic_api_key)
            .unsplash_api_key(cli.unsplash_api_key);
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn embedder(&self) -> Box<dyn Embedder> {
        match self.config.embedder_kind() {
            EmbedderKind::Hashing => Box::new(HashingEmbedder::default()),
            EmbedderKind::Placeholder => Box::new(PlaceholderEmbedder),
        }
    }

    pub fn enricher(&self) -> Result<Box<dyn Enricher>> {
        match self.config.anthropic() {
            Capability::Enabled(key) => {
                let config = AnthropicConfig::new(key)?.model(self.config.model_id());
                let enricher = AnthropicEnricher::new(config)
                    .context("Failed to create Anthropic client")?;
                Ok(Box::new(enricher))
            }
            Capability::Disabled => {
                warn!(
                    "ANTHROPIC_API_KEY not set, using placeholder colors, keywords and summaries"
                );
                Ok(Box::new(PlaceholderEnricher))
            }
        }
    }

    pub fn image_searcher(&self) -> Result<Box<dyn ImageSearcher>> {
        match self.config.unsplash() {
            Capability::Enabled(key) => {
                let client = UnsplashClient::new(UnsplashConfig::new(key)?)
                    .context("Failed to create Unsplash client")?;
                Ok(Box::new(client))
            }
            Capability::Disabled => {
                warn!("UNSPLASH_API_KEY not set, using placeholder images");
                Ok(Box::new(PlaceholderImageSearcher))
            }
        }
    }

    /// Runs the enrichment job. Per-post failures are logged and do not make the run fail.
    pub async fn run(self) -> Result<RunReport> {
        let embedder = self.embedder();
        let enricher = self.enricher()?;
        let image_searcher = self.image_searcher()?;

        let content_dir = self.config.content_dir().display().to_string();
        let mut job = EnrichmentJob::new(self.config, embedder, enricher, image_searcher);
        let report = job
            .run()
            .await
            .with_context(|| format!("Failed to process posts in {content_dir}"))?;

        for (path, reason) in &report.failed {
            warn!("Failed: {}: {}", path.display(), reason);
        }
        info!(
            "Enriched {} of {} posts ({} failed)",
            report.enriched,
            report.discovered,
            report.failed.len()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use flexiona_core::frontmatter;
    use tempfile::tempdir;

    fn cli(args: &[&str]) -> Cli {
        // Empty keys keep the run offline regardless of the environment
        let mut full = vec!["flexiona", "--anthropic-api-key", "", "--unsplash-api-key", ""];
        full.extend_from_slice(args);
        Cli::try_parse_from(full).unwrap()
    }

    #[test]
    fn missing_content_dir_fails() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing");
        let result = Flexiona::from_cli(cli(&["--content-dir", missing.to_str().unwrap()]));
        assert!(result.is_err());
    }

    #[test]
    fn empty_keys_select_placeholders() {
        let dir = tempdir().unwrap();
        let app =
            Flexiona::from_cli(cli(&["--content-dir", dir.path().to_str().unwrap()])).unwrap();
        assert_eq!(app.enricher().unwrap().name(), "placeholder");
        assert_eq!(app.image_searcher().unwrap().name(), "placeholder");
        assert_eq!(app.embedder().model_name(), "hashing-512");
    }

    #[test]
    fn keys_select_network_backends() {
        let dir = tempdir().unwrap();
        let app = Flexiona::from_cli(Cli::try_parse_from([
            "flexiona",
            "--content-dir",
            dir.path().to_str().unwrap(),
            "--anthropic-api-key",
            "sk-test",
            "--unsplash-api-key",
            "unsplash-test",
            "--embedder",
            "placeholder",
        ]).unwrap())
        .unwrap();
        assert_eq!(app.enricher().unwrap().name(), "anthropic");
        assert_eq!(app.image_searcher().unwrap().name(), "unsplash");
        assert_eq!(app.embedder().model_name(), "placeholder");
    }

    #[tokio::test]
    async fn run_enriches_posts_offline() {
        let dir = tempdir().unwrap();
        let post = dir.path().join("hello.md");
        tokio::fs::write(&post, "---\ntitle: Hello\n---\nHello, world.\n").await.unwrap();

        let app =
            Flexiona::from_cli(cli(&["--content-dir", dir.path().to_str().unwrap()])).unwrap();
        let report = app.run().await.unwrap();
        assert_eq!(report.discovered, 1);
        assert_eq!(report.enriched, 1);

        let post = frontmatter::read(&post).await.unwrap();
        for key in ["related_posts", "colors", "suggested_image", "summary"] {
            assert!(post.get(key).is_some(), "missing {key}");
        }
    }
}
