//! End-to-end document pipeline: path → checks → header → sanitize → images → verdict.
//!
//! Structural failures (path, encoding, frontmatter, validation) abort the
//! document. Image and link failures are absorbed by their stages, and a
//! negative content verdict is only logged.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info, instrument, warn};

use inkpress_content::{parse_frontmatter, sanitize, validate_frontmatter};
use inkpress_links::LinkChecker;
use inkpress_media::{ImageHost, ImageRelocator};
use inkpress_shared::{Frontmatter, InkpressError, PipelineConfig, Result};

use crate::report::{ContentReport, check_content};

/// File extensions accepted as documents (compared case-insensitively).
pub const DOCUMENT_EXTENSIONS: &[&str] = &["md", "markdown"];

// ---------------------------------------------------------------------------
// Stages and progress
// ---------------------------------------------------------------------------

/// Where a document is in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Raw,
    HeaderExtracted,
    HeaderValidated,
    Sanitized,
    ImagesResolved,
    ContentChecked,
    Ready,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::HeaderExtracted => "header-extracted",
            Self::HeaderValidated => "header-validated",
            Self::Sanitized => "sanitized",
            Self::ImagesResolved => "images-resolved",
            Self::ContentChecked => "content-checked",
            Self::Ready => "ready",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called each time the document reaches a new stage.
    fn stage(&self, stage: Stage);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn stage(&self, _stage: Stage) {}
}

// ---------------------------------------------------------------------------
// Options and output
// ---------------------------------------------------------------------------

/// Per-call switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessOptions {
    /// Move embedded images to the hosting destination (if one is configured).
    pub relocate_images: bool,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            relocate_images: true,
        }
    }
}

/// A fully processed document.
#[derive(Debug, Clone)]
pub struct ProcessedDocument {
    /// Validated frontmatter with `language` normalized.
    pub frontmatter: Frontmatter,
    /// Sanitized body with relocated image references.
    pub body: String,
    /// Advisory content verdict.
    pub report: ContentReport,
}

impl ProcessedDocument {
    /// The `(metadata, body)` pair handed to publishing integrations.
    pub fn into_parts(self) -> (Frontmatter, String) {
        (self.frontmatter, self.body)
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Runs documents through the pipeline with one fixed configuration.
pub struct Orchestrator {
    config: PipelineConfig,
    relocator: ImageRelocator,
    links: LinkChecker,
}

impl Orchestrator {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let relocator = ImageRelocator::new(&config.images)?;
        let links = LinkChecker::new(&config.links)?;
        Ok(Self {
            config,
            relocator,
            links,
        })
    }

    /// Use a custom image hosting destination.
    pub fn with_image_host(mut self, host: impl ImageHost + 'static) -> Self {
        self.relocator = self.relocator.with_host(host);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Process the document at `path`.
    pub async fn process(&self, path: &Path, options: &ProcessOptions) -> Result<ProcessedDocument> {
        self.process_with_progress(path, options, &SilentProgress).await
    }

    #[instrument(skip_all, fields(path = %path.display()))]
    pub async fn process_with_progress(
        &self,
        path: &Path,
        options: &ProcessOptions,
        progress: &dyn ProgressReporter,
    ) -> Result<ProcessedDocument> {
        let start = Instant::now();
        advance(progress, Stage::Raw);

        validate_file_path(path)?;
        let text = read_document(path).await?;

        let result = self
            .process_text(&text, &document_dir(path), options, progress)
            .await;

        match &result {
            Ok(doc) => info!(
                verdict = doc.report.verdict,
                body_len = doc.body.len(),
                duration_ms = start.elapsed().as_millis(),
                "document processed"
            ),
            Err(e) => warn!(kind = e.kind(), error = %e, "document processing failed"),
        }
        result
    }

    /// Process already-decoded document text. Relative image paths resolve
    /// against `base_dir`.
    pub async fn process_text(
        &self,
        text: &str,
        base_dir: &Path,
        options: &ProcessOptions,
        progress: &dyn ProgressReporter,
    ) -> Result<ProcessedDocument> {
        let (raw, body) = parse_frontmatter(text)?;
        advance(progress, Stage::HeaderExtracted);

        let frontmatter = validate_frontmatter(&raw, &self.config.content)?;
        advance(progress, Stage::HeaderValidated);

        let mut body = sanitize(body);
        advance(progress, Stage::Sanitized);

        if options.relocate_images {
            body = self.relocator.relocate(&body, base_dir).await.body;
        } else {
            debug!("image relocation not requested");
        }
        advance(progress, Stage::ImagesResolved);

        let report = check_content(&body, &self.config.content, &self.links).await;
        if !report.verdict {
            warn!(
                problems = ?report.problems(&self.config.content),
                "content validation failed"
            );
        }
        advance(progress, Stage::ContentChecked);
        advance(progress, Stage::Ready);

        Ok(ProcessedDocument {
            frontmatter,
            body,
            report,
        })
    }
}

fn advance(progress: &dyn ProgressReporter, stage: Stage) {
    debug!(%stage, "stage reached");
    progress.stage(stage);
}

// ---------------------------------------------------------------------------
// Input checks
// ---------------------------------------------------------------------------

/// The file must exist and carry a document extension.
pub fn validate_file_path(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(InkpressError::path(format!("File not found: {}", path.display())));
    }
    if !path.is_file() {
        return Err(InkpressError::path(format!("Not a file: {}", path.display())));
    }

    let recognized = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            DOCUMENT_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        });
    if !recognized {
        return Err(InkpressError::path(
            "Only markdown (.md, .markdown) files are supported",
        ));
    }
    Ok(())
}

/// Read `path` as non-empty UTF-8 text. A leading byte-order mark is dropped.
pub async fn read_document(path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| InkpressError::io(path, e))?;

    let text = String::from_utf8(bytes)
        .map_err(|_| InkpressError::encoding("File must be UTF-8 encoded"))?;
    let text = match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text,
    };

    if text.trim().is_empty() {
        return Err(InkpressError::encoding("File is empty"));
    }
    Ok(text)
}

fn document_dir(path: &Path) -> PathBuf {
    path.parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}
