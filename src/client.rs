use std::{sync::Arc, time::Duration};

use reqwest::Client as ReqwestClient;

use crate::{
    authorization::Authorization,
    http::HttpClient,
    models::image::Image,
    ratelimit::{LogRateLimit, RateLimitHandler},
    result::Result,
    route::Route,
};

/// Base URL of the main API.
pub const DEFAULT_API_URL: &str = "https://api.cibere.dev";
/// Base URL of the paste host.
pub const DEFAULT_PASTE_URL: &str = "https://paste.cibere.dev";
/// Base URL of the website hosting embeds.
pub const DEFAULT_EMBED_URL: &str = "https://www.cibere.dev";
/// Base URL of Discord's REST API, without the version segment.
pub const DEFAULT_DISCORD_URL: &str = "https://discord.com/api";
/// Time waited before retrying a rate-limited or failed request.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Entry point of the library.
///
/// Every endpoint is an async method on the client. The client can be shared
/// between tasks behind an `Arc`.
///
/// ```no_run
/// # type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;
/// use ciberedev::Client;
///
/// #[tokio::main]
/// async fn main() -> Result<()> {
///     let client = Client::new();
///     for result in client.get_search_results("rust", 5).await? {
///         println!("{}: {}", result.title(), result.url());
///     }
///     client.close();
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct Client {
    pub(crate) http: HttpClient,
    api_url: String,
    paste_url: String,
    embed_url: String,
    discord_url: String,
    authorization: Authorization,
}

impl Client {
    /// A client with the default configuration.
    pub fn new() -> Client {
        Self::builder().build()
    }

    /// Starts configuring a client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// The request executor, for sending hand-built [`Route`]s.
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Number of HTTP attempts made by this client, retries included.
    pub fn requests(&self) -> u64 {
        self.http.requests()
    }

    /// Configured credentials.
    pub fn authorization(&self) -> &Authorization {
        &self.authorization
    }

    /// Tears down the underlying connection pool.
    ///
    /// The handle on a caller-supplied `reqwest::Client` is released as well.
    /// Using the client afterwards opens a fresh pool.
    pub fn close(&self) {
        self.http.close();
    }

    pub(crate) fn api_endpoint(&self, path: &str) -> String {
        join(&self.api_url, path)
    }

    pub(crate) fn paste_endpoint(&self, path: &str) -> String {
        join(&self.paste_url, path)
    }

    pub(crate) fn embed_endpoint(&self, path: &str) -> String {
        join(&self.embed_url, path)
    }

    pub(crate) fn discord_endpoint(&self, version: u8, path: &str) -> String {
        join(&format!("{}/v{}", self.discord_url, version), path)
    }

    /// Downloads the image behind `link`.
    pub(crate) async fn fetch_image(&self, link: &str) -> Result<Image> {
        let response = self.http.request(&Route::get(link)).await?;
        Ok(Image::new(link, response.into_bytes()))
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

fn join(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Configures a [`Client`].
///
/// ```
/// use std::time::Duration;
/// use ciberedev::Client;
///
/// let client = Client::builder()
///     .api_url("http://localhost:8080")
///     .retry_delay(Duration::from_millis(100))
///     .build();
/// assert_eq!(client.requests(), 0);
/// ```
pub struct ClientBuilder {
    api_url: String,
    paste_url: String,
    embed_url: String,
    discord_url: String,
    retry_delay: Duration,
    timeout: Option<Duration>,
    accept_invalid_certs: bool,
    authorization: Authorization,
    ratelimit: Arc<dyn RateLimitHandler>,
    http_client: Option<ReqwestClient>,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            paste_url: DEFAULT_PASTE_URL.to_string(),
            embed_url: DEFAULT_EMBED_URL.to_string(),
            discord_url: DEFAULT_DISCORD_URL.to_string(),
            retry_delay: DEFAULT_RETRY_DELAY,
            timeout: None,
            accept_invalid_certs: true,
            authorization: Authorization::default(),
            ratelimit: Arc::new(LogRateLimit),
            http_client: None,
        }
    }
}

impl ClientBuilder {
    /// Base URL of the main API.
    #[must_use]
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Base URL of the paste host.
    #[must_use]
    pub fn paste_url(mut self, url: impl Into<String>) -> Self {
        self.paste_url = url.into();
        self
    }

    /// Base URL of the website hosting embeds.
    #[must_use]
    pub fn embed_url(mut self, url: impl Into<String>) -> Self {
        self.embed_url = url.into();
        self
    }

    /// Base URL of Discord's REST API, without the version segment.
    #[must_use]
    pub fn discord_url(mut self, url: impl Into<String>) -> Self {
        self.discord_url = url.into();
        self
    }

    /// Time waited before retrying after a `429` or `500`.
    #[must_use]
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Per-request timeout of the transport. None by default.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Whether invalid TLS certificates are accepted.
    ///
    /// On by default because the API's hosts have historically served
    /// certificates that do not verify. Turn it off when pointing the client
    /// at other hosts.
    #[must_use]
    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Credentials for endpoints that need them.
    #[must_use]
    pub fn authorization(mut self, authorization: Authorization) -> Self {
        self.authorization = authorization;
        self
    }

    /// Replaces the default rate-limit handler, which only logs.
    #[must_use]
    pub fn ratelimit_handler(mut self, handler: impl RateLimitHandler + 'static) -> Self {
        self.ratelimit = Arc::new(handler);
        self
    }

    /// Uses an existing `reqwest::Client` instead of creating one on the first request.
    ///
    /// Its own TLS and timeout settings apply; [`ClientBuilder::timeout`] and
    /// [`ClientBuilder::accept_invalid_certs`] only affect transports the
    /// library creates.
    #[must_use]
    pub fn http_client(mut self, client: ReqwestClient) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Builds the client. No connection is opened until the first request.
    pub fn build(self) -> Client {
        let http = HttpClient::new(
            self.ratelimit,
            self.retry_delay,
            self.timeout,
            self.accept_invalid_certs,
            self.http_client,
        );
        Client {
            http,
            api_url: self.api_url,
            paste_url: self.paste_url,
            embed_url: self.embed_url,
            discord_url: self.discord_url,
            authorization: self.authorization,
        }
    }
}

impl std::fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("api_url", &self.api_url)
            .field("paste_url", &self.paste_url)
            .field("embed_url", &self.embed_url)
            .field("discord_url", &self.discord_url)
            .field("retry_delay", &self.retry_delay)
            .field("timeout", &self.timeout)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .field("authorization", &self.authorization)
            .finish_non_exhaustive()
    }
}
