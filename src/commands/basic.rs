use teloxide::utils::html;
use tracing::debug;

use crate::bot::AppContext;
use crate::handler::{reply_with, FnReply};
use crate::reply::{Button, Keyboard, Reply};
use crate::router::Call;

pub const HI_USAGE: &str = "usage: /hi <name>";

const HELP: &str = "use '/fakestore' to list products from different categories
use '/hi <name>' to print 'hello, <name>'
use '/info' for information about the bot
use '/news <topic>' for news on <topic>
use '/pick' for an option selector
use '/picknum' for a number selector
use '/pickrequest' for a request selector
use '/prompt <prompt>' to ask a language model
use '/random <min> <max>' to get a button to generate a random number between <min> and <max> (inclusive)
use '/randomword' for a random word
use '/srandom' to generate a true random number between 0 and 255 (inclusive)
use '/weather <location>' for weather info on <location>";

/// Greeting with a hidden link so the client shows the image preview.
pub fn greeting(image_url: &str, full_name: &str) -> String {
    format!(
        "<a href=\"{}\">&#8203;</a> welcome {}\nuse '/help' for possible commands",
        html::escape(image_url),
        html::bold(&html::escape(full_name))
    )
}

pub fn start() -> FnReply<impl Fn(&AppContext, &Call) -> Reply + Send + Sync> {
    reply_with(|ctx: &AppContext, call: &Call| {
        Reply::html(greeting(&ctx.config.bot.greet_image_url, call.sender_name()))
    })
}

pub fn help() -> Reply {
    Reply::text(HELP)
}

pub fn hi() -> FnReply<impl Fn(&AppContext, &Call) -> Reply + Send + Sync> {
    reply_with(|_ctx: &AppContext, call: &Call| match call.args.get(0) {
        Some(name) => Reply::text(format!("hello, {}", name)),
        None => Reply::text(HI_USAGE),
    })
}

pub fn info(repo_url: &str, author_url: &str) -> Reply {
    Reply::keyboard(
        "visit the GitHub repo for info",
        Keyboard::inline(vec![vec![
            Button::url("GitHub repository", repo_url),
            Button::url("author", author_url),
        ]]),
    )
}

/// Echo text back verbatim; anything else is copied as-is.
pub fn echo() -> FnReply<impl Fn(&AppContext, &Call) -> Reply + Send + Sync> {
    reply_with(|_ctx: &AppContext, call: &Call| match call.text() {
        Some(text) => Reply::text(text),
        None => {
            debug!("Copying {:?} message back", call.attachment());
            Reply::copy_original()
        }
    })
}
