use async_trait::async_trait;

use crate::bot::AppContext;
use crate::fetch::FetchError;
use crate::handler::FetchHandler;
use crate::reply::Reply;
use crate::router::Call;

pub const USAGE: &str = "usage: /prompt <prompt>";

/// `/prompt <text...>`: relay a chat completion.
pub struct Prompt;

#[async_trait]
impl FetchHandler for Prompt {
    type Data = String;

    async fn fetch(&self, ctx: &AppContext, call: &Call) -> Result<String, FetchError> {
        ctx.completion.complete(&call.args.joined()).await
    }

    fn format(&self, _ctx: &AppContext, _call: &Call, answer: String) -> Result<Reply, FetchError> {
        Ok(Reply::text(answer).quoted())
    }
}
