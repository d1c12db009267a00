//! Image search backed by the Unsplash API.

mod client;
mod error;

pub use client::{UnsplashClient, UnsplashConfig};
pub use error::UnsplashError;
