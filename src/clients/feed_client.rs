use chrono::Local;
use serenity::async_trait;

use crate::error::FetchError;
use crate::models::event::Snapshot;
use crate::service::feed_parser::parse_feed;

#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self) -> Result<Snapshot, FetchError>;
}

/// Calendar subscription fetched over HTTPS.
pub struct WebcalFeed {
    url: String,
    http: reqwest::Client,
}

impl WebcalFeed {
    pub fn new(url: &str) -> Self {
        Self {
            url: normalize_feed_url(url),
            http: reqwest::Client::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl FeedSource for WebcalFeed {
    async fn fetch(&self) -> Result<Snapshot, FetchError> {
        tracing::debug!(url = %self.url, "fetching calendar feed");
        let response = self.http.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let body = response.text().await?;
        parse_feed(&body, Local::now().date_naive())
    }
}

/// `webcal://` links are plain HTTPS subscriptions.
pub fn normalize_feed_url(url: &str) -> String {
    let url = url.trim();
    for scheme in ["webcals://", "webcal://"] {
        if let Some(rest) = url.strip_prefix(scheme) {
            return format!("https://{}", rest);
        }
    }
    url.to_string()
}
