use super::{FetchError, HttpFetcher};

pub struct WordClient {
    http: HttpFetcher,
    url: String,
}

impl WordClient {
    pub fn new(http: HttpFetcher, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    pub async fn random_word(&self) -> Result<String, FetchError> {
        let words: Vec<String> = self.http.get_json(&self.url, &[]).await?;
        words.into_iter().next().ok_or(FetchError::Missing("word"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_returning(body: serde_json::Value) -> (MockServer, WordClient) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;
        let http = HttpFetcher::new(Duration::from_secs(5)).unwrap();
        let client = WordClient::new(http, server.uri());
        (server, client)
    }

    #[tokio::test]
    async fn test_first_word_used() {
        let (_server, client) = client_returning(json!(["ferrule", "ignored"])).await;
        assert_eq!(client.random_word().await.unwrap(), "ferrule");
    }

    #[tokio::test]
    async fn test_empty_list() {
        let (_server, client) = client_returning(json!([])).await;
        assert!(matches!(
            client.random_word().await,
            Err(FetchError::Missing("word"))
        ));
    }
}
