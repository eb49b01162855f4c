//! Concurrent image relocation engine.
//!
//! Every embedded image is resolved, verified, and uploaded by its own task.
//! A failing task only affects its own image. Outcomes are collected in
//! document order and applied last-span-first, so the rewritten body does not
//! depend on which task finished first.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, StreamExt};
use reqwest::Client;
use tracing::{debug, info, instrument, warn};

use inkpress_shared::{InkpressError, RelocationConfig, Result};

use crate::error::ImageFailure;
use crate::host::{HttpImageHost, ImageHost};
use crate::resolve::{ImageResolver, verify_image_blocking};
use crate::scanner::{ImageReference, scan_images};

/// User-Agent string for image fetches and uploads.
const USER_AGENT: &str = concat!("inkpress/", env!("CARGO_PKG_VERSION"));

/// Replacement URL on success; the failure reason otherwise (span kept as-is).
pub type RelocationOutcome = std::result::Result<String, ImageFailure>;

// ---------------------------------------------------------------------------
// RelocationReport
// ---------------------------------------------------------------------------

/// Result of relocating the images of one body.
#[derive(Debug, Clone)]
pub struct RelocationReport {
    /// The rewritten body.
    pub body: String,
    /// Number of image references found.
    pub total: usize,
    /// Number of spans that now point at the hosting destination.
    pub rewritten: usize,
    /// Failed references by document index.
    pub failures: Vec<(usize, ImageFailure)>,
}

impl RelocationReport {
    fn unchanged(body: &str, total: usize) -> Self {
        Self {
            body: body.to_string(),
            total,
            rewritten: 0,
            failures: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// ImageRelocator
// ---------------------------------------------------------------------------

/// Moves embedded images to a managed hosting destination.
pub struct ImageRelocator {
    resolver: ImageResolver,
    host: Option<Arc<dyn ImageHost>>,
    max_concurrent: usize,
}

impl ImageRelocator {
    /// Build a relocator; without an `upload_url` it leaves bodies untouched.
    pub fn new(config: &RelocationConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(config.fetch_timeout)
            .build()
            .map_err(|e| InkpressError::Network(format!("failed to build HTTP client: {e}")))?;

        let host = config.upload_url.clone().map(|url| {
            Arc::new(HttpImageHost::new(client.clone(), url)) as Arc<dyn ImageHost>
        });

        Ok(Self {
            resolver: ImageResolver::new(client),
            host,
            max_concurrent: config.max_concurrent.max(1),
        })
    }

    /// Replace the hosting destination.
    pub fn with_host(mut self, host: impl ImageHost + 'static) -> Self {
        self.host = Some(Arc::new(host));
        self
    }

    /// Whether a hosting destination is configured.
    pub fn is_enabled(&self) -> bool {
        self.host.is_some()
    }

    /// Relocate every image in `body`. Relative paths resolve against `base_dir`.
    ///
    /// Never fails as a whole: per-image failures are logged and reported in
    /// [`RelocationReport::failures`].
    #[instrument(skip_all, fields(base_dir = %base_dir.display()))]
    pub async fn relocate(&self, body: &str, base_dir: &Path) -> RelocationReport {
        let refs = scan_images(body);
        if refs.is_empty() {
            debug!("no embedded images");
            return RelocationReport::unchanged(body, 0);
        }

        let Some(host) = self.host.as_deref() else {
            debug!(images = refs.len(), "no hosting destination configured, skipping");
            return RelocationReport::unchanged(body, refs.len());
        };

        let start = Instant::now();
        info!(
            images = refs.len(),
            max_concurrent = self.max_concurrent,
            "relocating images"
        );

        // Tasks finish in any order; each outcome carries its document index
        // and is put back in place before the rewrite.
        let mut indexed: Vec<(usize, RelocationOutcome)> = stream::iter(refs.iter().enumerate())
            .map(|(i, reference)| async move { (i, self.relocate_one(reference, host, base_dir).await) })
            .buffer_unordered(self.max_concurrent)
            .collect()
            .await;
        indexed.sort_unstable_by_key(|(i, _)| *i);
        let outcomes: Vec<RelocationOutcome> = indexed.into_iter().map(|(_, outcome)| outcome).collect();

        let body = apply_outcomes(body, &refs, &outcomes);
        let failures: Vec<(usize, ImageFailure)> = outcomes
            .into_iter()
            .enumerate()
            .filter_map(|(i, outcome)| outcome.err().map(|e| (i, e)))
            .collect();

        let report = RelocationReport {
            body,
            total: refs.len(),
            rewritten: refs.len() - failures.len(),
            failures,
        };

        info!(
            total = report.total,
            rewritten = report.rewritten,
            failed = report.failures.len(),
            duration_ms = start.elapsed().as_millis(),
            "image relocation completed"
        );

        report
    }

    /// Resolve, verify, and upload one image. Failures stop here.
    async fn relocate_one(
        &self,
        reference: &ImageReference,
        host: &dyn ImageHost,
        base_dir: &Path,
    ) -> RelocationOutcome {
        let outcome = async {
            let bytes = self.resolver.resolve(&reference.source, base_dir).await?;
            let image = verify_image_blocking(&reference.source, bytes).await?;
            host.upload(image).await
        }
        .await;

        match &outcome {
            Ok(url) => debug!(index = reference.index, source = %reference.source, %url, "image relocated"),
            Err(e) => warn!(
                index = reference.index,
                source = %reference.source,
                error = %e,
                "image relocation failed, keeping original"
            ),
        }

        outcome
    }
}

// ---------------------------------------------------------------------------
// Rewrite
// ---------------------------------------------------------------------------

/// Apply index-aligned outcomes to `body`, last span first.
///
/// Replacing from the end keeps every not-yet-applied span's offsets valid
/// regardless of how the replacement length differs from the original.
pub fn apply_outcomes(body: &str, refs: &[ImageReference], outcomes: &[RelocationOutcome]) -> String {
    debug_assert_eq!(refs.len(), outcomes.len());

    let mut pairs: Vec<(&ImageReference, &RelocationOutcome)> = refs.iter().zip(outcomes).collect();
    pairs.sort_by(|(a, _), (b, _)| b.span.start.cmp(&a.span.start));

    let mut rewritten = body.to_string();
    for (reference, outcome) in pairs {
        if let Ok(url) = outcome {
            rewritten.replace_range(reference.span.clone(), &reference.render_with(url));
        }
    }
    rewritten
}
