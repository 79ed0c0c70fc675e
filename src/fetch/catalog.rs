use serde::Deserialize;
use serde_json::Number;

use super::{FetchError, HttpFetcher};

#[derive(Debug, Clone, Deserialize)]
pub struct Product {
    pub image: String,
    pub title: String,
    pub price: Number,
    pub description: String,
    pub rating: Rating,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Rating {
    pub rate: Number,
    pub count: Number,
}

/// Fake Store product catalog
pub struct CatalogClient {
    http: HttpFetcher,
    base_url: String,
}

impl CatalogClient {
    pub fn new(http: HttpFetcher, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    pub async fn categories(&self) -> Result<Vec<String>, FetchError> {
        let url = self.endpoint(&["products", "categories"])?;
        self.http.get_json(url.as_str(), &[]).await
    }

    pub async fn products_in(&self, category: &str) -> Result<Vec<Product>, FetchError> {
        let url = self.endpoint(&["products", "category", category])?;
        self.http.get_json(url.as_str(), &[]).await
    }

    /// Append path segments to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<reqwest::Url, FetchError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}
