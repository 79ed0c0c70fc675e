pub mod basic;
pub mod catalog;
pub mod news;
pub mod pickers;
pub mod prompt;
pub mod random;
pub mod weather;
pub mod words;

use anyhow::{Context, Result};
use regex::Regex;

use crate::bot::AppContext;
use crate::handler::{guarded, Arity, Fetching, StaticReply};
use crate::router::{Matcher, Router};

fn command(name: &str) -> Matcher {
    Matcher::Command(name.to_string())
}

fn pattern(re: &str) -> Result<Matcher> {
    Ok(Matcher::TextPattern(
        Regex::new(re).with_context(|| format!("Invalid route pattern: {}", re))?,
    ))
}

/// Build the full command surface. Registration order is match order.
pub fn build_router(ctx: &AppContext, bot_username: Option<String>) -> Result<Router> {
    let bot = &ctx.config.bot;

    let mut router = Router::new(ctx.config.command_prefix())
        .with_bot_username(bot_username)
        .route("start", command("start"), basic::start())
        .route("help", command("help"), StaticReply::new(basic::help()))
        .route(
            "fakestore",
            command("fakestore"),
            Fetching(catalog::CategoryMenu),
        )
        .route(
            "hi",
            command("hi"),
            guarded(Arity::Exactly(1), basic::HI_USAGE, basic::hi()),
        )
        .route(
            "info",
            command("info"),
            StaticReply::new(basic::info(&bot.repo_url, &bot.author_url)),
        )
        .route(
            "prompt",
            command("prompt"),
            guarded(Arity::AtLeast(1), prompt::USAGE, Fetching(prompt::Prompt)),
        )
        .route(
            "news",
            command("news"),
            guarded(Arity::AtLeast(1), news::USAGE, Fetching(news::Headlines)),
        )
        .route("pick", command("pick"), StaticReply::new(pickers::pick()))
        .route("picknum", command("picknum"), StaticReply::new(pickers::picknum()))
        .route(
            "pickrequest",
            command("pickrequest"),
            StaticReply::new(pickers::pickrequest()),
        )
        .route(
            "random",
            command("random"),
            guarded(Arity::Exactly(2), random::USAGE, random::prompt()),
        )
        .route(
            "randomword",
            command("randomword"),
            Fetching(words::RandomWord),
        )
        .route("srandom", command("srandom"), random::secure())
        .route(
            "weather",
            command("weather"),
            guarded(Arity::Exactly(1), weather::USAGE, Fetching(weather::Forecast)),
        )
        .route(
            "fakestore-category",
            Matcher::TextIn(ctx.categories.clone()),
            Fetching(catalog::CategoryProducts),
        );

    for option in pickers::OPTIONS {
        router = router.route(
            "pick-answer",
            Matcher::Text(option.to_string()),
            pickers::option_answer(),
        );
    }

    router = router
        .route(
            "picknum-answer",
            pattern(pickers::NUMBER_PATTERN)?,
            pickers::number_answer(),
        )
        .route(
            "random-answer",
            Matcher::CallbackPattern(
                Regex::new(random::PAYLOAD_PATTERN).context("Invalid callback pattern")?,
            ),
            random::answer(),
        );

    if bot.echo_unmatched {
        router = router.fallback(basic::echo());
    }

    Ok(router)
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::reply::{ButtonAction, OutgoingReply, Reply};

    async fn dispatch(ctx: &AppContext, router: &Router, text: &str) -> Option<Reply> {
        router.dispatch(ctx, &testing::text(text)).await
    }

    #[tokio::test]
    async fn test_full_surface_registered() {
        let ctx = testing::context("http://127.0.0.1:9");
        let router = build_router(&ctx, None).unwrap();
        let names: Vec<&str> = router.routes().iter().map(|r| r.name).collect();
        for expected in [
            "start",
            "help",
            "fakestore",
            "hi",
            "info",
            "prompt",
            "news",
            "pick",
            "picknum",
            "pickrequest",
            "random",
            "randomword",
            "srandom",
            "weather",
            "fakestore-category",
            "pick-answer",
            "picknum-answer",
            "random-answer",
        ] {
            assert!(names.contains(&expected), "missing route {}", expected);
        }
    }

    #[tokio::test]
    async fn test_hi_examples() {
        let ctx = testing::context("http://127.0.0.1:9");
        let router = build_router(&ctx, None).unwrap();
        assert_eq!(
            dispatch(&ctx, &router, "/hi").await,
            Some(Reply::text("usage: /hi <name>"))
        );
        assert_eq!(
            dispatch(&ctx, &router, "/hi alice").await.unwrap().as_text(),
            Some("hello, alice")
        );
    }

    #[tokio::test]
    async fn test_random_then_callback() {
        let ctx = testing::context("http://127.0.0.1:9");
        let router = build_router(&ctx, None).unwrap();

        let reply = dispatch(&ctx, &router, "/random 1 10").await.unwrap();
        let OutgoingReply::Keyboard { keyboard, .. } = reply.body else {
            panic!("expected keyboard, got {:?}", reply.body);
        };
        let buttons: Vec<_> = keyboard.buttons().collect();
        assert_eq!(buttons.len(), 1);
        assert_eq!(buttons[0].action, ButtonAction::Callback("1,10".to_string()));

        for _ in 0..50 {
            let reply = router
                .dispatch(&ctx, &testing::callback("1,10"))
                .await
                .unwrap();
            let n: u64 = reply.as_text().unwrap().parse().unwrap();
            assert!((1..=10).contains(&n));
        }
    }

    #[tokio::test]
    async fn test_picker_answers_do_not_collide() {
        let ctx = testing::context("http://127.0.0.1:9");
        let router = build_router(&ctx, None).unwrap();
        assert_eq!(
            dispatch(&ctx, &router, "Option 3").await.unwrap().as_text(),
            Some("you chose the option Option 3")
        );
        assert_eq!(
            dispatch(&ctx, &router, "12").await.unwrap().as_text(),
            Some("you chose the number 12")
        );
        assert!(dispatch(&ctx, &router, "option 5").await.is_none());
        assert!(dispatch(&ctx, &router, "0").await.is_none());
    }

    #[tokio::test]
    async fn test_echo_only_when_enabled() {
        let ctx = testing::context("http://127.0.0.1:9");
        let router = build_router(&ctx, None).unwrap();
        assert!(dispatch(&ctx, &router, "hello there").await.is_none());

        let mut config = testing::config("http://127.0.0.1:9");
        config.bot.echo_unmatched = true;
        let ctx = AppContext::new(config).unwrap();
        let router = build_router(&ctx, None).unwrap();
        assert_eq!(
            dispatch(&ctx, &router, "hello there").await,
            Some(Reply::text("hello there"))
        );
        assert_eq!(
            dispatch(&ctx, &router, "/hi bob").await.unwrap().as_text(),
            Some("hello, bob")
        );
    }

    #[tokio::test]
    async fn test_custom_prefix() {
        let mut config = testing::config("http://127.0.0.1:9");
        config.bot.command_prefix = "!".to_string();
        let ctx = AppContext::new(config).unwrap();
        let router = build_router(&ctx, None).unwrap();
        assert!(dispatch(&ctx, &router, "!help").await.is_some());
        assert!(dispatch(&ctx, &router, "/help").await.is_none());
    }
}
