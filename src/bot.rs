use std::sync::Arc;

use anyhow::Result;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::fetch::catalog::CatalogClient;
use crate::fetch::completion::CompletionClient;
use crate::fetch::news::NewsClient;
use crate::fetch::weather::WeatherClient;
use crate::fetch::words::WordClient;
use crate::fetch::HttpFetcher;
use crate::platform::{ReplySink, UpdateSource};
use crate::reply::Reply;
use crate::router::{Router, TextSet};

/// Everything handlers need, constructed once at startup
pub struct AppContext {
    pub config: Config,
    pub weather: WeatherClient,
    pub news: NewsClient,
    pub catalog: CatalogClient,
    pub words: WordClient,
    pub completion: CompletionClient,
    /// Catalog categories offered by the last `/fakestore` keyboard
    pub categories: Arc<TextSet>,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self> {
        let http = HttpFetcher::new(config.http_timeout())?;
        let apis = &config.apis;

        let weather = WeatherClient::new(
            http.clone(),
            apis.weather_url.clone(),
            apis.openweathermap_api_key.clone(),
        );
        let news = NewsClient::new(http.clone(), apis.news_url.clone(), apis.newsapi_key.clone());
        let catalog = CatalogClient::new(http.clone(), apis.catalog_url.clone());
        let words = WordClient::new(http.clone(), apis.random_word_url.clone());
        let completion = CompletionClient::new(
            http,
            apis.openai_base_url.clone(),
            apis.openai_api_key.clone(),
            apis.openai_model.clone(),
        );

        Ok(Self {
            config,
            weather,
            news,
            catalog,
            words,
            completion,
            categories: Arc::new(TextSet::new()),
        })
    }

    /// Fill the category set up front so category buttons from an earlier run still work.
    pub async fn prime_categories(&self) {
        match self.catalog.categories().await {
            Ok(categories) => {
                self.categories.replace(categories);
                if self.categories.is_empty() {
                    warn!("Catalog offered no categories");
                } else {
                    info!("Loaded {} catalog categories", self.categories.len());
                }
            }
            Err(e) => warn!("Could not preload catalog categories: {}", e),
        }
    }
}

/// Pull events from `source` until it closes, answering each through `sink`.
///
/// Each matched event runs in its own task under the configured handler
/// timeout; a handler that overruns is answered with the generic failure.
pub async fn run<S, R>(
    mut source: S,
    sink: Arc<R>,
    ctx: Arc<AppContext>,
    router: Arc<Router>,
) -> Result<()>
where
    S: UpdateSource,
    R: ReplySink + 'static,
{
    let timeout = ctx.config.handler_timeout();
    let mut tasks = JoinSet::new();

    info!("Dispatch loop started with {} routes", router.routes().len());

    while let Some(event) = source.next_event().await {
        let origin = event.origin();
        let Some((handler, call)) = router.resolve(&event) else {
            debug!("No route for event in chat {}", origin.chat_id);
            continue;
        };

        let ctx = ctx.clone();
        let sink = sink.clone();
        tasks.spawn(async move {
            debug!("Dispatching to route '{}'", call.route);
            let reply = match tokio::time::timeout(timeout, handler.handle(&ctx, &call)).await {
                Ok(reply) => reply,
                Err(_) => {
                    warn!(
                        "Route '{}' timed out after {}s",
                        call.route,
                        timeout.as_secs()
                    );
                    Reply::failure()
                }
            };
            if let Err(e) = sink.send(origin, reply).await {
                error!("Failed to deliver reply for '{}': {:#}", call.route, e);
            }
        });

        while let Some(finished) = tasks.try_join_next() {
            if let Err(e) = finished {
                error!("Handler task failed: {}", e);
            }
        }
    }

    info!("Update source closed, waiting for {} pending handlers", tasks.len());
    while let Some(finished) = tasks.join_next().await {
        if let Err(e) = finished {
            error!("Handler task failed: {}", e);
        }
    }

    Ok(())
}
