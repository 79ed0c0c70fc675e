use async_trait::async_trait;
use tracing::warn;

use crate::bot::AppContext;
use crate::fetch::FetchError;
use crate::reply::Reply;
use crate::router::Call;

/// Logic bound to one route. Always answers with exactly one reply.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, ctx: &AppContext, call: &Call) -> Reply;
}

/// Answers every call with the same reply
pub struct StaticReply(Reply);

impl StaticReply {
    pub fn new(reply: Reply) -> Self {
        Self(reply)
    }
}

#[async_trait]
impl Handler for StaticReply {
    async fn handle(&self, _ctx: &AppContext, _call: &Call) -> Reply {
        self.0.clone()
    }
}

/// Synchronous handler built from a closure
pub struct FnReply<F>(F);

pub fn reply_with<F>(f: F) -> FnReply<F>
where
    F: Fn(&AppContext, &Call) -> Reply + Send + Sync,
{
    FnReply(f)
}

#[async_trait]
impl<F> Handler for FnReply<F>
where
    F: Fn(&AppContext, &Call) -> Reply + Send + Sync,
{
    async fn handle(&self, ctx: &AppContext, call: &Call) -> Reply {
        (self.0)(ctx, call)
    }
}

/// Accepted argument counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exactly(n) => count == n,
            Arity::AtLeast(n) => count >= n,
        }
    }
}

/// Replies with `usage` unless the argument count fits, before running `inner`.
pub struct Guarded<H> {
    arity: Arity,
    usage: String,
    inner: H,
}

pub fn guarded<H: Handler>(arity: Arity, usage: impl Into<String>, inner: H) -> Guarded<H> {
    Guarded {
        arity,
        usage: usage.into(),
        inner,
    }
}

#[async_trait]
impl<H: Handler> Handler for Guarded<H> {
    async fn handle(&self, ctx: &AppContext, call: &Call) -> Reply {
        if !self.arity.accepts(call.args.count()) {
            return Reply::text(self.usage.clone());
        }
        self.inner.handle(ctx, call).await
    }
}

/// A handler that calls out to a provider and formats the result.
#[async_trait]
pub trait FetchHandler: Send + Sync {
    type Data: Send;

    async fn fetch(&self, ctx: &AppContext, call: &Call) -> Result<Self::Data, FetchError>;

    fn format(&self, ctx: &AppContext, call: &Call, data: Self::Data)
        -> Result<Reply, FetchError>;
}

/// Runs a [`FetchHandler`], collapsing any failure into the generic reply.
pub struct Fetching<H>(pub H);

#[async_trait]
impl<H: FetchHandler> Handler for Fetching<H> {
    async fn handle(&self, ctx: &AppContext, call: &Call) -> Reply {
        let result = match self.0.fetch(ctx, call).await {
            Ok(data) => self.0.format(ctx, call, data),
            Err(e) => Err(e),
        };
        match result {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Route '{}' failed ({}): {}", call.route, e.kind(), e);
                Reply::failure()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        calls: AtomicUsize,
        outcome: fn() -> Result<u32, FetchError>,
    }

    #[async_trait]
    impl FetchHandler for &'static Counting {
        type Data = u32;

        async fn fetch(&self, _ctx: &AppContext, _call: &Call) -> Result<u32, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.outcome)()
        }

        fn format(&self, _ctx: &AppContext, _call: &Call, data: u32) -> Result<Reply, FetchError> {
            if data == 0 {
                return Err(FetchError::Missing("value"));
            }
            Ok(Reply::text(format!("got {}", data)).quoted())
        }
    }

    fn leak(outcome: fn() -> Result<u32, FetchError>) -> &'static Counting {
        Box::leak(Box::new(Counting {
            calls: AtomicUsize::new(0),
            outcome,
        }))
    }

    #[test]
    fn test_arity() {
        assert!(Arity::Exactly(2).accepts(2));
        assert!(!Arity::Exactly(2).accepts(3));
        assert!(Arity::AtLeast(1).accepts(5));
        assert!(!Arity::AtLeast(1).accepts(0));
    }

    #[tokio::test]
    async fn test_guard_runs_before_fetch() {
        let ctx = testing::context("http://127.0.0.1:9");
        let counter = leak(|| Ok(1));
        let handler = guarded(Arity::Exactly(1), "usage: /x <y>", Fetching(counter));

        let reply = handler.handle(&ctx, &testing::call("/x", "")).await;
        assert_eq!(reply, Reply::text("usage: /x <y>"));
        assert_eq!(counter.calls.load(Ordering::SeqCst), 0);

        let reply = handler.handle(&ctx, &testing::call("/x", "y")).await;
        assert_eq!(reply.as_text(), Some("got 1"));
        assert_eq!(counter.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fetch_and_format_failures_collapse() {
        let ctx = testing::context("http://127.0.0.1:9");
        let failing = Fetching(leak(|| Err(FetchError::Status(500))));
        assert_eq!(
            failing.handle(&ctx, &testing::call("/x", "")).await,
            Reply::failure()
        );

        let bad_shape = Fetching(leak(|| Ok(0)));
        assert_eq!(
            bad_shape.handle(&ctx, &testing::call("/x", "")).await,
            Reply::failure()
        );
    }

    #[tokio::test]
    async fn test_static_reply_is_stable() {
        let ctx = testing::context("http://127.0.0.1:9");
        let handler = StaticReply::new(Reply::text("same"));
        let call = testing::call("/help", "");
        assert_eq!(
            handler.handle(&ctx, &call).await,
            handler.handle(&ctx, &call).await
        );
    }
}
