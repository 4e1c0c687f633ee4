//! Replaces the default rate-limit handler.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use ciberedev::{Client, LogRateLimit, RateLimitHandler};

#[derive(Default)]
struct Loud {
    hits: AtomicUsize,
}

#[async_trait]
impl RateLimitHandler for Loud {
    async fn on_ratelimit(&self, endpoint: &str) {
        let hits = self.hits.fetch_add(1, Ordering::SeqCst) + 1;
        println!("WE ARE BEING RATELIMITED ({hits}x), STOP MAKING STUPID API REQUESTS");

        // keep the library's own warning as well
        LogRateLimit.on_ratelimit(endpoint).await;
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    simple_logger::init_with_level(log::Level::Warn)?;

    let client = Client::builder().ratelimit_handler(Loud::default()).build();
    for _ in 0..20 {
        let words = client.get_random_words(1).await?;
        println!("{}", words.join(" "));
    }
    Ok(())
}
