//! Shared types, error model, and configuration for inkpress.
//!
//! This crate is the foundation depended on by all other inkpress crates.
//! It provides:
//! - [`InkpressError`]: the unified document-level error type
//! - Domain types ([`Frontmatter`])
//! - Configuration ([`AppConfig`], [`PipelineConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ContentConfig, ImagesConfig, LinkCheckConfig, LinksConfig, PipelineConfig,
    RelocationConfig, config_dir, config_file_path, init_config, load_config, load_config_from,
    parse_upload_url,
};
pub use error::{InkpressError, Result};
pub use types::{Frontmatter, scalar_to_string};
