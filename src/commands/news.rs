use async_trait::async_trait;

use crate::bot::AppContext;
use crate::fetch::news::Article;
use crate::fetch::FetchError;
use crate::handler::FetchHandler;
use crate::reply::Reply;
use crate::router::Call;

pub const USAGE: &str = "usage: /news <topic>";

const MAX_ARTICLES: usize = 3;

pub fn format_headlines(query: &str, articles: &[Article]) -> String {
    let mut text = format!("*** Latest news about '{}': ***\n", query);
    for article in articles.iter().take(MAX_ARTICLES) {
        text.push_str(&format!(
            "- {}\n  {}\n",
            article.title.as_deref().unwrap_or("(untitled)"),
            article.url
        ));
    }
    text
}

/// `/news <topic...>`
pub struct Headlines;

#[async_trait]
impl FetchHandler for Headlines {
    type Data = Vec<Article>;

    async fn fetch(&self, ctx: &AppContext, call: &Call) -> Result<Vec<Article>, FetchError> {
        ctx.news.search(&call.args.joined()).await
    }

    fn format(
        &self,
        _ctx: &AppContext,
        call: &Call,
        articles: Vec<Article>,
    ) -> Result<Reply, FetchError> {
        Ok(Reply::text(format_headlines(&call.args.joined(), &articles)).quoted())
    }
}
