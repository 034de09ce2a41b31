// src/main.rs
use std::sync::Arc;

use dotenv::dotenv;
use log::info;

use harmonic_trader::config::AppConfig;
use harmonic_trader::cycle::PipelineContext;
use harmonic_trader::dispatcher::TradeDispatcher;
use harmonic_trader::patterns::{DisabledMatcher, MatcherParams, PatternMatcher};
use harmonic_trader::store::TimeSeriesStore;
use harmonic_trader::subscriber::NotificationSubscriber;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("harmonic_trader=debug,info"));

    let config = AppConfig::from_env();
    info!(
        "Starting harmonic trader - store {}, trader {}, {} workers",
        config.redis_host, config.trader_url, config.worker_count
    );

    let store = TimeSeriesStore::connect(&config).await?;
    let dispatcher = TradeDispatcher::new(&config);
    // Integration point for the geometry engine; the pipeline only sees the
    // PatternMatcher trait.
    let matcher: Arc<dyn PatternMatcher> = Arc::new(DisabledMatcher::new());
    let params = MatcherParams {
        error_allowed: config.error_allowed,
        ..MatcherParams::default()
    };

    let ctx = Arc::new(PipelineContext {
        store,
        dispatcher,
        matcher,
        params,
    });

    let subscriber = NotificationSubscriber::new(ctx, config.worker_count);
    subscriber.run().await?;

    info!("Main finished");
    Ok(())
}
