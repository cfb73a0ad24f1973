// Content moderation using Azure AI Content Safety
//
// Infrastructure implementation of BaseModeration. A failing or unreachable
// moderation service FAILS OPEN: the text is treated as clean and the
// failure is logged at error level. Operators must know this tradeoff: an
// outage admits unscreened questions rather than blocking the event.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{BaseModeration, ModerationVerdict};

const ANALYZE_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

const CATEGORIES: [&str; 4] = ["Hate", "SelfHarm", "Sexual", "Violence"];

#[derive(Debug, Serialize)]
struct AnalyzeRequest<'a> {
    text: &'a str,
    categories: Vec<&'static str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeResponse {
    categories_analysis: Vec<CategoryAnalysis>,
}

#[derive(Debug, Deserialize)]
struct CategoryAnalysis {
    category: String,
    severity: Option<i32>,
}

/// Azure AI Content Safety client
pub struct ContentSafetyClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl ContentSafetyClient {
    pub fn new(endpoint: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            api_key,
        }
    }

    async fn analyze(&self, text: &str) -> anyhow::Result<ModerationVerdict> {
        let url = format!(
            "{}/contentsafety/text:analyze?api-version=2023-10-01",
            self.endpoint.trim_end_matches('/')
        );

        let response = self
            .client
            .post(&url)
            .timeout(ANALYZE_TIMEOUT)
            .header("Ocp-Apim-Subscription-Key", &self.api_key)
            .json(&AnalyzeRequest {
                text,
                categories: CATEGORIES.to_vec(),
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Content Safety API error {}: {}", status, body);
        }

        let analysis: AnalyzeResponse = response.json().await?;
        Ok(verdict_from(&analysis.categories_analysis))
    }
}

/// Flag on the first category with severity above zero.
fn verdict_from(categories: &[CategoryAnalysis]) -> ModerationVerdict {
    for analysis in categories {
        if analysis.severity.unwrap_or(0) > 0 {
            return ModerationVerdict {
                flagged: true,
                reason: Some(reason_for(&analysis.category)),
            };
        }
    }
    ModerationVerdict::default()
}

fn reason_for(category: &str) -> String {
    match category {
        "Hate" => "Hate content detected".to_string(),
        "SelfHarm" => "Self-harm content detected".to_string(),
        "Sexual" => "Sexual content detected".to_string(),
        "Violence" => "Violence content detected".to_string(),
        other => format!("{} content detected", other),
    }
}

#[async_trait]
impl BaseModeration for ContentSafetyClient {
    async fn classify(&self, text: &str) -> ModerationVerdict {
        match self.analyze(text).await {
            Ok(verdict) => verdict,
            Err(e) => {
                // Fail open, but log
                tracing::error!(error = %e, "Moderation call failed; failing open");
                ModerationVerdict::default()
            }
        }
    }
}
