//! Memoizes a slow lookup with a TTL cache and a background sweeper.
//!
//! Run with `RUST_LOG=lazycache=debug` to watch the sweeper work.

use std::time::Duration;

use chrono::TimeDelta;
use lazycache::{Cache, CacheBuilder};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

async fn slow_square(n: u64) -> anyhow::Result<u64> {
    tokio::time::sleep(Duration::from_millis(200)).await;
    n.checked_mul(n)
        .ok_or_else(|| anyhow::anyhow!("{n} squared overflows"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lazycache=info,memoize=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let shutdown = CancellationToken::new();
    let cache: Cache<u64, u64> = CacheBuilder::new()
        .capacity(64)
        .ttl(TimeDelta::seconds(1))
        .cleanup(shutdown.clone(), TimeDelta::milliseconds(500))
        .build()?;

    for round in 0..3 {
        for n in [3, 4, u64::MAX] {
            match cache.get(n, || slow_square(n)).await {
                Ok(square) => info!("round {}: {}^2 = {}", round, n, square),
                Err(err) => info!("round {}: {}", round, err),
            }
        }
        tokio::time::sleep(Duration::from_millis(700)).await;
    }

    let stats = cache.stats().await;
    info!(
        "hits={}, misses={}, refreshes={}, swept={}, hit_rate={:.2}",
        stats.hits,
        stats.misses,
        stats.refreshes,
        stats.swept,
        stats.hit_rate()
    );

    shutdown.cancel();
    Ok(())
}
