//! OpenAI-compatible chat-completions client.

use serde::Deserialize;
use serde_json::json;

use crate::catalog::Ecommerce;
use crate::core::config;
use crate::core::{AppError, AppResult};

use super::prompt;

/// One product the model recommended.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Recommendation {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct RecommendationList {
    products: Vec<Recommendation>,
}

/// Client for the recommendation model.
pub struct Recommender {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl Recommender {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        temperature: f32,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            temperature,
        }
    }

    /// Builds a client from the environment, or None when no API key is set.
    pub fn from_env() -> Option<Self> {
        let api_key = config::llm::API_KEY.clone()?;
        Some(Self::new(
            config::llm::BASE_URL.clone(),
            api_key,
            config::llm::MODEL.clone(),
            *config::llm::TEMPERATURE,
        ))
    }

    /// Asks the model to pick products for the shopper's request.
    ///
    /// Recommendations for ids that do not exist in the catalog are dropped;
    /// the model occasionally invents them.
    pub async fn recommend(
        &self,
        store: &dyn Ecommerce,
        user_request: &str,
    ) -> AppResult<Vec<Recommendation>> {
        let products = store.all_products().await?;
        let specs = prompt::build_product_specs(&products, store.currency());
        let content = self.complete(&prompt::build_prompt(&specs, user_request)).await?;

        let mut recommendations = parse_recommendations(&content)?;
        recommendations.retain(|r| {
            let known = products.iter().any(|p| p.id == r.id);
            if !known {
                log::warn!("Model recommended unknown product id {}", r.id);
            }
            known
        });
        Ok(recommendations)
    }

    /// Single chat-completions round trip, JSON mode.
    async fn complete(&self, user_message: &str) -> AppResult<String> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "user", "content": user_message },
            ],
            "response_format": { "type": "json_object" },
            "temperature": self.temperature,
        });

        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .timeout(config::network::timeout())
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            return Err(AppError::Llm(format!("HTTP {status}: {detail}")));
        }

        let payload: serde_json::Value = resp.json().await?;
        payload["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.trim().to_string())
            .ok_or_else(|| AppError::Llm("response has no message content".to_string()))
    }
}

/// Parses the model's JSON answer, tolerating a Markdown code fence around it.
fn parse_recommendations(content: &str) -> AppResult<Vec<Recommendation>> {
    let json_text = strip_code_fence(content);
    let list: RecommendationList = serde_json::from_str(json_text)
        .map_err(|e| AppError::Llm(format!("bad recommendation JSON: {e}")))?;
    Ok(list.products)
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the optional language tag on the opening fence.
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    rest.trim_end_matches('`').trim()
}
