//! Core library of Flexiona, an agent that enriches the front matter of blog posts.
//!
//! For each markdown post, Flexiona writes related posts, a color palette, a suggested image
//! and a summary into the post's YAML front matter. The pieces:
//!
//! - [`frontmatter`]: reading posts and merging metadata updates back to disk
//! - [`store`]: an in-memory document store with similarity search over [`embedding`]s
//! - [`enrich`] and [`image`]: capability traits with placeholder implementations
//! - [`job`]: the orchestrator tying everything together
//!
//! Real backends for the capability traits live in the `flexiona_extensions` crate.

pub mod config;
pub mod discovery;
pub mod embedding;
pub mod enrich;
pub mod frontmatter;
pub mod image;
pub mod job;
pub mod markdown;
pub mod store;

pub use config::{Capability, Config, EmbedderKind};
pub use job::{EnrichmentJob, RunReport};
