use std::convert::Infallible;
use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;
use secrecy::SecretString;

use flexiona_core::config::{
    DEFAULT_ANTHROPIC_MODEL, DEFAULT_KEYWORD_COUNT, DEFAULT_RELATED_POSTS, DEFAULT_SUMMARY_LENGTH,
};
use flexiona_core::EmbedderKind;

/// Flexiona: enrich Hugo blog posts with related posts, color schemes, images and summaries.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory containing the markdown posts [default: ../content/posts, then ./content/posts].
    #[arg(long, env = "FLEXIONA_CONTENT_DIR")]
    pub content_dir: Option<PathBuf>,

    /// Only process posts that git reports as modified, staged or untracked.
    #[arg(long)]
    pub changed_only: bool,

    /// Number of related posts to link from each post.
    #[arg(long, default_value_t = DEFAULT_RELATED_POSTS)]
    pub related_posts: usize,

    /// Maximum summary length, in characters.
    #[arg(long, default_value_t = DEFAULT_SUMMARY_LENGTH)]
    pub summary_length: usize,

    /// Number of keywords used for the image search.
    #[arg(long, default_value_t = DEFAULT_KEYWORD_COUNT)]
    pub keywords: usize,

    /// Embedder used to find related posts (hashing or placeholder).
    #[arg(long, default_value = "hashing", value_parser = EmbedderKind::from_str)]
    pub embedder: EmbedderKind,

    /// Anthropic model used for enrichment.
    #[arg(long, default_value = DEFAULT_ANTHROPIC_MODEL)]
    pub model: String,

    /// Anthropic API key. Placeholder values are used without it.
    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true, value_parser = parse_secret)]
    pub anthropic_api_key: Option<SecretString>,

    /// Unsplash access key. A placeholder image is used without it.
    #[arg(long, env = "UNSPLASH_API_KEY", hide_env_values = true, value_parser = parse_secret)]
    pub unsplash_api_key: Option<SecretString>,

    /// Increase verbosity (use multiple times for more).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

fn parse_secret(value: &str) -> Result<SecretString, Infallible> {
    Ok(SecretString::from(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use secrecy::ExposeSecret;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["flexiona"]).unwrap();
        assert!(!cli.changed_only);
        assert_eq!(cli.related_posts, 5);
        assert_eq!(cli.summary_length, 150);
        assert_eq!(cli.keywords, 5);
        assert_eq!(cli.embedder, EmbedderKind::Hashing);
        assert_eq!(cli.model, "claude-3-haiku-20240307");
        assert_eq!(cli.verbose, 0);
        assert!(!cli.quiet);
    }

    #[test]
    fn explicit_flags() {
        let cli = Cli::try_parse_from([
            "flexiona",
            "--content-dir",
            "site/content/posts",
            "--changed-only",
            "--related-posts",
            "3",
            "--embedder",
            "placeholder",
            "--anthropic-api-key",
            "sk-test",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.content_dir, Some(PathBuf::from("site/content/posts")));
        assert!(cli.changed_only);
        assert_eq!(cli.related_posts, 3);
        assert_eq!(cli.embedder, EmbedderKind::Placeholder);
        assert_eq!(cli.anthropic_api_key.unwrap().expose_secret(), "sk-test");
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn rejects_unknown_embedder_and_conflicting_verbosity() {
        assert!(Cli::try_parse_from(["flexiona", "--embedder", "bert"]).is_err());
        assert!(Cli::try_parse_from(["flexiona", "-v", "-q"]).is_err());
    }

    #[test]
    fn secrets_are_redacted_in_debug_output() {
        let cli = Cli::try_parse_from(["flexiona", "--unsplash-api-key", "very-secret"]).unwrap();
        assert!(!format!("{cli:?}").contains("very-secret"));
    }
}
