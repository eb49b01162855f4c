//! Publishing boundary.
//!
//! Integrations implement [`Publisher`] and receive a [`PublishRequest`]
//! built from a processed document. The pipeline does not know which
//! platform it is talking to.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use inkpress_shared::{InkpressError, Result};

use crate::pipeline::{Orchestrator, ProcessOptions, ProcessedDocument};

/// Title used when the document has none.
pub const FALLBACK_TITLE: &str = "New Article";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Draft,
}

/// Everything an integration needs to publish one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublishRequest {
    pub title: String,
    pub subtitle: Option<String>,
    pub tags: Vec<String>,
    pub language: String,
    pub visibility: Visibility,
    pub body: String,
}

impl PublishRequest {
    pub fn from_document(doc: &ProcessedDocument, visibility: Visibility) -> Self {
        let fm = &doc.frontmatter;
        Self {
            title: fm
                .get_str("title")
                .filter(|t| !t.is_empty())
                .unwrap_or(FALLBACK_TITLE)
                .to_string(),
            subtitle: fm
                .get_str("subtitle")
                .filter(|s| !s.is_empty())
                .map(String::from),
            tags: fm.tags(),
            language: fm.get_str("language").unwrap_or_default().to_string(),
            visibility,
            body: doc.body.clone(),
        }
    }
}

/// Confirmation returned by an integration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishReceipt {
    pub platform: String,
    /// Platform-side identifier, if the platform returns one.
    pub id: Option<String>,
    pub url: String,
}

#[async_trait]
pub trait Publisher: Send + Sync {
    /// Platform name used in logs and errors.
    fn name(&self) -> &str;

    async fn publish(&self, request: &PublishRequest) -> Result<PublishReceipt>;
}

/// Process `path` and hand the result to `publisher`.
///
/// Pipeline errors pass through unchanged; anything the publisher returns is
/// reported as [`InkpressError::Publishing`].
#[instrument(skip_all, fields(path = %path.display(), platform = publisher.name()))]
pub async fn publish_document(
    orchestrator: &Orchestrator,
    path: &Path,
    options: &ProcessOptions,
    publisher: &dyn Publisher,
    visibility: Visibility,
) -> Result<PublishReceipt> {
    let doc = orchestrator.process(path, options).await?;
    let request = PublishRequest::from_document(&doc, visibility);

    info!(title = %request.title, ?visibility, "publishing document");
    let receipt = publisher.publish(&request).await.map_err(|e| match e {
        InkpressError::Publishing { .. } => e,
        other => InkpressError::publishing(publisher.name(), other.to_string()),
    })?;

    info!(url = %receipt.url, "document published");
    Ok(receipt)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use inkpress_shared::PipelineConfig;

    use super::*;

    #[derive(Default)]
    struct RecordingPublisher {
        seen: Mutex<Vec<PublishRequest>>,
    }

    #[async_trait]
    impl Publisher for RecordingPublisher {
        fn name(&self) -> &str {
            "recording"
        }

        async fn publish(&self, request: &PublishRequest) -> Result<PublishReceipt> {
            self.seen.lock().unwrap().push(request.clone());
            Ok(PublishReceipt {
                platform: self.name().to_string(),
                id: Some("42".into()),
                url: "https://blog.test/posts/42".into(),
            })
        }
    }

    struct FailingPublisher;

    #[async_trait]
    impl Publisher for FailingPublisher {
        fn name(&self) -> &str {
            "failing"
        }

        async fn publish(&self, _request: &PublishRequest) -> Result<PublishReceipt> {
            Err(InkpressError::Network("connection reset".into()))
        }
    }

    fn document(dir: &Path, text: &str) -> std::path::PathBuf {
        let path = dir.join("post.md");
        std::fs::write(&path, text).unwrap();
        path
    }

    #[tokio::test]
    async fn request_is_built_from_processed_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = document(
            dir.path(),
            "---\ntitle: Hello\nsubtitle: World\ntags: [rust, async-io]\nlanguage: EN-us\n---\n# Hello\nA body that is comfortably longer than fifty characters.",
        );
        let orchestrator = Orchestrator::new(PipelineConfig::default()).unwrap();
        let publisher = RecordingPublisher::default();

        let receipt = publish_document(
            &orchestrator,
            &path,
            &ProcessOptions::default(),
            &publisher,
            Visibility::Draft,
        )
        .await
        .unwrap();

        assert_eq!(receipt.url, "https://blog.test/posts/42");
        let seen = publisher.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].title, "Hello");
        assert_eq!(seen[0].subtitle.as_deref(), Some("World"));
        assert_eq!(seen[0].tags, vec!["rust", "async-io"]);
        assert_eq!(seen[0].language, "en");
        assert_eq!(seen[0].visibility, Visibility::Draft);
        assert!(seen[0].body.starts_with("# Hello"));
    }

    #[tokio::test]
    async fn publisher_errors_become_publishing_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = document(dir.path(), "---\ntitle: Hi\n---\n# Hi\nBody.");
        let orchestrator = Orchestrator::new(PipelineConfig::default()).unwrap();

        let err = publish_document(
            &orchestrator,
            &path,
            &ProcessOptions::default(),
            &FailingPublisher,
            Visibility::Public,
        )
        .await
        .unwrap_err();

        assert_eq!(err.kind(), "publishing");
        assert_eq!(
            err.to_string(),
            "publishing error (failing): network error: connection reset"
        );
    }

    #[tokio::test]
    async fn pipeline_errors_pass_through() {
        let dir = tempfile::tempdir().unwrap();
        let path = document(dir.path(), "---\ntitle: ''\n---\n# Body\n");
        let orchestrator = Orchestrator::new(PipelineConfig::default()).unwrap();
        let publisher = RecordingPublisher::default();

        let err = publish_document(
            &orchestrator,
            &path,
            &ProcessOptions::default(),
            &publisher,
            Visibility::Public,
        )
        .await
        .unwrap_err();

        assert_eq!(err.kind(), "validation");
        assert!(publisher.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn visibility_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Visibility::Draft).unwrap(), "\"draft\"");
    }
}
