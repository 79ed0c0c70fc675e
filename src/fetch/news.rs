use serde::Deserialize;

use super::{FetchError, HttpFetcher};

#[derive(Debug, Deserialize)]
struct NewsResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Article {
    #[serde(default)]
    pub title: Option<String>,
    pub url: String,
}

pub struct NewsClient {
    http: HttpFetcher,
    url: String,
    api_key: String,
}

impl NewsClient {
    pub fn new(http: HttpFetcher, url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
            api_key: api_key.into(),
        }
    }

    /// Articles matching a free-text query, newest provider order preserved.
    pub async fn search(&self, query: &str) -> Result<Vec<Article>, FetchError> {
        let response: NewsResponse = self
            .http
            .get_json(&self.url, &[("q", query), ("apiKey", self.api_key.as_str())])
            .await?;

        if response.status != "ok" {
            return Err(FetchError::Upstream(
                response.message.unwrap_or(response.status),
            ));
        }
        Ok(response.articles)
    }
}
