// src/config/mod.rs
pub mod ai;

pub use crate::ingest::config::{load_sources_default, SourceConfig};
pub use ai::AiConfig;
