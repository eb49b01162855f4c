//! Embedded image relocation.
//!
//! This crate provides:
//! - [`scanner`]: finds `![alt](source)` references with byte spans
//! - [`ImageRelocator`]: resolves, verifies, and uploads every image
//!   concurrently, then rewrites the body in a single ordered pass
//! - [`ImageHost`]: the upload seam, with [`HttpImageHost`] for
//!   multipart endpoints

mod engine;
mod error;
mod host;
mod resolve;
pub mod scanner;

pub use engine::{ImageRelocator, RelocationOutcome, RelocationReport, apply_outcomes};
pub use error::ImageFailure;
pub use host::{HttpImageHost, ImageHost};
pub use resolve::{ImageResolver, ImageSource, VerifiedImage, verify_image};
pub use scanner::{ImageReference, scan_images};
