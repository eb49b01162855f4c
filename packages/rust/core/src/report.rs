//! Advisory content verdict.

use serde::Serialize;
use tracing::warn;

use inkpress_content::checks::{content_length, has_main_heading, meets_min_length};
use inkpress_links::LinkChecker;
use inkpress_shared::ContentConfig;

/// A link whose probe failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrokenLink {
    pub url: String,
    pub reason: String,
}

/// Outcome of the content checks. Never turns into an error by itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentReport {
    /// `true` only if every check passed.
    pub verdict: bool,
    pub too_short: bool,
    pub missing_heading: bool,
    pub broken_links: Vec<BrokenLink>,
}

impl ContentReport {
    /// Human-readable reasons for a negative verdict.
    pub fn problems(&self, rules: &ContentConfig) -> Vec<String> {
        let mut problems = Vec::new();
        if self.too_short {
            problems.push(format!(
                "content is too short (minimum {} characters)",
                rules.min_content_length
            ));
        }
        if self.missing_heading {
            problems.push("content is missing a main heading".to_string());
        }
        for link in &self.broken_links {
            problems.push(format!("broken link {}: {}", link.url, link.reason));
        }
        problems
    }
}

/// Run the structural checks, then probe links if those passed.
pub async fn check_content(body: &str, rules: &ContentConfig, links: &LinkChecker) -> ContentReport {
    let too_short = !meets_min_length(body, rules.min_content_length);
    let missing_heading = !has_main_heading(body);

    if too_short {
        warn!(
            length = content_length(body),
            minimum = rules.min_content_length,
            "content is too short"
        );
    }
    if missing_heading {
        warn!("content missing main heading");
    }

    // Probing is skipped once the verdict is already negative.
    let broken_links = if too_short || missing_heading {
        Vec::new()
    } else {
        links
            .check(body)
            .await
            .into_iter()
            .filter_map(|status| {
                status.outcome.err().map(|e| BrokenLink {
                    url: status.url.to_string(),
                    reason: e.to_string(),
                })
            })
            .collect()
    };

    ContentReport {
        verdict: !too_short && !missing_heading && broken_links.is_empty(),
        too_short,
        missing_heading,
        broken_links,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use inkpress_shared::LinkCheckConfig;

    use super::*;

    fn checker() -> LinkChecker {
        LinkChecker::new(&LinkCheckConfig {
            probe_timeout: Duration::from_secs(2),
            max_concurrent: 4,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn good_content_passes() {
        let body = "# Heading\nSome content here that is definitely long enough.";
        let report = check_content(body, &ContentConfig::default(), &checker()).await;
        assert!(report.verdict);
        assert!(report.problems(&ContentConfig::default()).is_empty());
    }

    #[tokio::test]
    async fn short_or_headless_content_fails() {
        let rules = ContentConfig::default();

        let short = check_content("# Hi\nShort.", &rules, &checker()).await;
        assert!(!short.verdict);
        assert!(short.too_short);

        let headless = check_content(
            "Some content without any heading but long enough to pass the length check.",
            &rules,
            &checker(),
        )
        .await;
        assert!(!headless.verdict);
        assert!(headless.missing_heading);
        assert!(!headless.too_short);
    }

    #[tokio::test]
    async fn broken_link_makes_verdict_negative() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("HEAD"))
            .and(wiremock::matchers::path("/ok"))
            .respond_with(wiremock::ResponseTemplate::new(200))
            .mount(&server)
            .await;
        wiremock::Mock::given(wiremock::matchers::method("HEAD"))
            .and(wiremock::matchers::path("/dead"))
            .respond_with(wiremock::ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let uri = server.uri();
        let body = format!(
            "# Links\n\nThis article links to [a page]({uri}/ok) and [another]({uri}/dead) for reference."
        );
        let report = check_content(&body, &ContentConfig::default(), &checker()).await;

        assert!(!report.verdict);
        assert_eq!(report.broken_links.len(), 1);
        assert_eq!(report.broken_links[0].url, format!("{uri}/dead"));
        assert_eq!(report.broken_links[0].reason, "HTTP 500");
    }

    #[tokio::test]
    async fn no_probes_after_structural_failure() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::any())
            .respond_with(wiremock::ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let body = format!("[x]({}/a)", server.uri());
        let report = check_content(&body, &ContentConfig::default(), &checker()).await;
        assert!(!report.verdict);
        assert!(report.broken_links.is_empty());
    }
}
