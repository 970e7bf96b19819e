pub mod config;
pub mod graph;
pub mod layout;
pub mod loader;
pub mod pipeline;
pub mod ranking;
pub mod render;
pub mod report;
pub mod stats;
pub mod summary;

pub use config::*;
pub use loader::FileSource;
pub use pipeline::*;
