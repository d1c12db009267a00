pub mod app;
pub mod cli;
pub mod logging;

pub use app::Flexiona;
