use async_trait::async_trait;
use reqwest::{Client, Response};
use tracing::debug;

use readerstats_core::{
    ContentId, CountSource, StatsError, StatsResult, ViewCounts, ViewEvent, ViewSink,
};

/// REST client for the hosted backend's view tables and count RPC.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn counts_url(&self) -> String {
        format!("{}/rest/v1/rpc/content_view_counts", self.base_url)
    }

    pub fn views_url(&self) -> String {
        format!("{}/rest/v1/content_views", self.base_url)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => req
                .header("apikey", key)
                .header("Authorization", format!("Bearer {}", key)),
            None => req,
        }
    }
}

async fn check_status(response: Response, what: &str) -> StatsResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StatsError::Unavailable(format!("{what} returned {status}: {body}")))
}

#[async_trait]
impl CountSource for HttpBackend {
    async fn fetch_counts(&self, content_id: &ContentId) -> StatsResult<ViewCounts> {
        debug!(%content_id, "Fetching view counts");
        let response = self
            .authorize(self.client.get(self.counts_url()))
            .query(&[("content_id", content_id.as_str())])
            .send()
            .await
            .map_err(|e| StatsError::Unavailable(format!("count request failed: {e}")))?;

        let response = check_status(response, "count RPC").await?;
        response
            .json::<ViewCounts>()
            .await
            .map_err(|e| StatsError::Parse(format!("count response: {e}")))
    }
}

#[async_trait]
impl ViewSink for HttpBackend {
    async fn record(&self, event: &ViewEvent) -> StatsResult<()> {
        let response = self
            .authorize(self.client.post(self.views_url()))
            .header("Prefer", "return=minimal")
            .json(event)
            .send()
            .await
            .map_err(|e| StatsError::Unavailable(format!("view insert failed: {e}")))?;

        check_status(response, "view insert").await?;
        debug!(content_id = %event.content_id, "View persisted");
        Ok(())
    }
}
