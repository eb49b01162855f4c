//! Document processing orchestration and the publishing boundary for inkpress.
//!
//! This crate ties together header parsing, validation, sanitization, image
//! relocation, and link checking into one pipeline ([`Orchestrator`]), and
//! defines what publishing integrations receive ([`Publisher`]).

pub mod pipeline;
pub mod publish;
pub mod report;
pub mod social;

pub use pipeline::{
    DOCUMENT_EXTENSIONS, Orchestrator, ProcessOptions, ProcessedDocument, ProgressReporter,
    SilentProgress, Stage, read_document, validate_file_path,
};
pub use publish::{
    FALLBACK_TITLE, PublishReceipt, PublishRequest, Publisher, Visibility, publish_document,
};
pub use report::{BrokenLink, ContentReport, check_content};
pub use social::compose_social_message;
