//! Network-backed implementations of the Flexiona capability traits.

pub mod anthropic;
pub mod unsplash;

pub use anthropic::{AnthropicConfig, AnthropicEnricher, AnthropicError};
pub use unsplash::{UnsplashClient, UnsplashConfig, UnsplashError};
