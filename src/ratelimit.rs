use async_trait::async_trait;

/// Gets notified whenever the API answers with `429 Too Many Requests`.
///
/// The notification is spawned onto the runtime and never awaited by the
/// request that triggered it; the request sleeps and retries on its own
/// regardless of what the handler does.
///
/// ```
/// use async_trait::async_trait;
/// use ciberedev::{Client, RateLimitHandler};
///
/// struct Shout;
///
/// #[async_trait]
/// impl RateLimitHandler for Shout {
///     async fn on_ratelimit(&self, endpoint: &str) {
///         eprintln!("slow down! ({endpoint})");
///     }
/// }
///
/// let client = Client::builder().ratelimit_handler(Shout).build();
/// ```
#[async_trait]
pub trait RateLimitHandler: Send + Sync {
    /// Called with the path of the rate-limited endpoint, e.g. `/screenshot`.
    async fn on_ratelimit(&self, endpoint: &str);
}

/// Default handler: logs a warning.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogRateLimit;

#[async_trait]
impl RateLimitHandler for LogRateLimit {
    async fn on_ratelimit(&self, endpoint: &str) {
        log::warn!("We are being ratelimited at '{endpoint}'");
    }
}
