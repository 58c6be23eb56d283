use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct ItemRequest<'a> {
    item: &'a str,
}

/// Response of `/categorize`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub item: String,
    pub tags: Vec<String>,
    /// False only when the server returned a partial result after a timeout.
    #[serde(default = "default_complete")]
    pub complete: bool,
}

fn default_complete() -> bool {
    true
}

/// One entry of `/categories`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub patterns: Vec<String>,
}

pub struct CategorizerClient {
    client: Client,
    base_url: String,
}

impl CategorizerClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Classify an item (JSON body).
    pub async fn classify(&self, item: &str) -> Result<Classification, Box<dyn std::error::Error>> {
        let resp = self.client
            .post(format!("{}/categorize", self.base_url))
            .json(&ItemRequest { item })
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(format!("Categorizer returned error status {}: {}", status, text).into());
        }

        Ok(serde_json::from_str::<Classification>(&text)?)
    }

    /// List the categories the server currently applies.
    pub async fn categories(&self) -> Result<Vec<Category>, reqwest::Error> {
        self.client
            .get(format!("{}/categories", self.base_url))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    /// Raw `/health` body.
    pub async fn health(&self) -> Result<serde_json::Value, reqwest::Error> {
        self.client
            .get(format!("{}/health", self.base_url))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }
}
