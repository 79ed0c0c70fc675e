use async_trait::async_trait;

use crate::bot::AppContext;
use crate::fetch::FetchError;
use crate::handler::FetchHandler;
use crate::reply::Reply;
use crate::router::Call;

/// `/randomword`
pub struct RandomWord;

#[async_trait]
impl FetchHandler for RandomWord {
    type Data = String;

    async fn fetch(&self, ctx: &AppContext, _call: &Call) -> Result<String, FetchError> {
        ctx.words.random_word().await
    }

    fn format(&self, _ctx: &AppContext, _call: &Call, word: String) -> Result<Reply, FetchError> {
        Ok(Reply::text(word).quoted())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{build_router, testing};
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_random_word() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/word"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(["quixotic"])))
            .mount(&server)
            .await;

        let ctx = testing::context(&server.uri());
        let router = build_router(&ctx, None).unwrap();
        assert_eq!(
            router.dispatch(&ctx, &testing::text("/randomword")).await,
            Some(Reply::text("quixotic").quoted())
        );
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_generic_failure() {
        let ctx = testing::context("http://127.0.0.1:9");
        let router = build_router(&ctx, None).unwrap();
        assert_eq!(
            router.dispatch(&ctx, &testing::text("/randomword")).await,
            Some(Reply::failure())
        );
    }
}
