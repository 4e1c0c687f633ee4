use std::{
    borrow::Cow,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, PoisonError,
    },
    time::Duration,
};

use bytes::Bytes;
use reqwest::{header::USER_AGENT, Client as ReqwestClient, Url};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::{
    error::Error,
    ratelimit::RateLimitHandler,
    result::Result,
    route::{Body, Route},
};

const USER_AGENT_VALUE: &str = concat!("CiberedevClient/", env!("CARGO_PKG_VERSION"));

/// Sends [`Route`]s and turns the answers into [`Response`]s or typed errors.
///
/// The underlying `reqwest` client is created on the first request and reused
/// until [`HttpClient::close`] is called.
///
/// | Status | Outcome |
/// |---|---|
/// | 2xx | [`Response`] |
/// | 429 | rate-limit handler notified, sleep, retry |
/// | 500 | sleep, retry |
/// | 502 / unreachable host | [`Error::ApiOffline`] |
/// | 400 | error from the route's error index, else [`Error::UnknownError`] |
/// | anything else | [`Error::UnknownStatusCode`] |
///
/// Retries are unlimited. A 2xx answer whose JSON body carries a
/// `status_code` field is classified by that field instead.
pub struct HttpClient {
    transport: Mutex<Option<ReqwestClient>>,
    requests: AtomicU64,
    ratelimit: Arc<dyn RateLimitHandler>,
    retry_delay: Duration,
    timeout: Option<Duration>,
    accept_invalid_certs: bool,
}

impl HttpClient {
    pub(crate) fn new(
        ratelimit: Arc<dyn RateLimitHandler>,
        retry_delay: Duration,
        timeout: Option<Duration>,
        accept_invalid_certs: bool,
        transport: Option<ReqwestClient>,
    ) -> Self {
        Self {
            transport: Mutex::new(transport),
            requests: AtomicU64::new(0),
            ratelimit,
            retry_delay,
            timeout,
            accept_invalid_certs,
        }
    }

    /// Number of HTTP attempts made so far, retries included.
    pub fn requests(&self) -> u64 {
        self.requests.load(Ordering::SeqCst)
    }

    /// Whether a transport currently exists.
    pub fn is_open(&self) -> bool {
        self.transport
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Drops the transport. The next request creates a new one.
    pub fn close(&self) {
        let closed = self
            .transport
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if closed.is_some() {
            log::debug!("transport closed");
        }
    }

    fn transport(&self) -> Result<ReqwestClient> {
        let mut slot = self
            .transport
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(transport) = slot.as_ref() {
            return Ok(transport.clone());
        }

        let mut builder =
            ReqwestClient::builder().danger_accept_invalid_certs(self.accept_invalid_certs);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let transport = builder.build()?;
        log::debug!("transport created");
        *slot = Some(transport.clone());
        Ok(transport)
    }

    /// Sends `route`, retrying on `429` and `500` until another answer arrives.
    ///
    /// # Errors
    ///
    /// See the table on [`HttpClient`]. Transport failures other than an
    /// unreachable host are returned as [`Error::Http`].
    pub async fn request(&self, route: &Route) -> Result<Response> {
        let url = route.url()?;
        let endpoint = route.path();

        log::debug!("Request URL: {url}");
        log::debug!("Request Headers: {:?}", route.headers());
        log::debug!("Request Query Params: {:?}", route.query_params());

        loop {
            let attempt = self.requests.fetch_add(1, Ordering::SeqCst) + 1;
            let transport = self.transport()?;

            let mut builder = transport
                .request(route.method().into(), url.clone())
                .header(USER_AGENT, USER_AGENT_VALUE);
            for (key, value) in route.headers().iter() {
                builder = builder.header(key, value);
            }
            builder = match route.body() {
                Some(Body::Json(body)) => builder.json(body),
                Some(Body::Form(form)) => builder.form(form),
                None => builder,
            };

            log::info!("request #{attempt} for {endpoint} dispatched");
            let response = match builder.send().await {
                Ok(response) => response,
                Err(e) if e.is_connect() => {
                    log::debug!("unable to reach {url}: {e}");
                    return Err(Error::ApiOffline(endpoint));
                }
                Err(e) => return Err(e.into()),
            };

            log::debug!("Received Status Code: {}", response.status());
            log::debug!("Received Headers: {:?}", response.headers());

            let response = Response::read(response, endpoint.clone()).await?;
            match Outcome::of(response.effective_status()) {
                Outcome::Success => return Ok(response),
                Outcome::RateLimited => {
                    let handler = Arc::clone(&self.ratelimit);
                    let path = endpoint.clone();
                    tokio::spawn(async move { handler.on_ratelimit(&path).await });
                    tokio::time::sleep(self.retry_delay).await;
                }
                Outcome::ServerError => {
                    log::warn!(
                        "API returned a 500 status code at '{}'. Retrying in {:?}",
                        endpoint,
                        self.retry_delay
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                Outcome::Offline => return Err(Error::ApiOffline(endpoint)),
                Outcome::Rejected => {
                    return Err(match response.error_message() {
                        Some(message) => route.error_for(message),
                        None => Error::UnknownError(response.text().into_owned()),
                    })
                }
                Outcome::Unknown(code) => return Err(Error::UnknownStatusCode(code)),
            }
        }
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("open", &self.is_open())
            .field("requests", &self.requests())
            .field("retry_delay", &self.retry_delay)
            .field("timeout", &self.timeout)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Success,
    RateLimited,
    ServerError,
    Offline,
    Rejected,
    Unknown(u16),
}

impl Outcome {
    fn of(status: u16) -> Self {
        match status {
            200..=299 => Outcome::Success,
            429 => Outcome::RateLimited,
            500 => Outcome::ServerError,
            502 => Outcome::Offline,
            400 => Outcome::Rejected,
            code => Outcome::Unknown(code),
        }
    }
}

/// A successful answer from the API.
///
/// The body is read once; [`Response::json`] holds it parsed as a JSON object,
/// or an empty map when it was not one (images, plain text).
#[derive(Debug, Clone)]
pub struct Response {
    status: u16,
    url: Url,
    endpoint: String,
    bytes: Bytes,
    json: Map<String, Value>,
}

impl Response {
    async fn read(response: reqwest::Response, endpoint: String) -> Result<Self> {
        let status = response.status().as_u16();
        let url = response.url().clone();
        let bytes = response.bytes().await?;
        Ok(Self::from_parts(status, url, endpoint, bytes))
    }

    pub(crate) fn from_parts(status: u16, url: Url, endpoint: String, bytes: Bytes) -> Self {
        let json = match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        log::debug!("Received Data: {json:?}");
        Self {
            status,
            url,
            endpoint,
            bytes,
            json,
        }
    }

    /// HTTP status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// URL the answer came from.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Path of the endpoint that was requested.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Parsed JSON body.
    pub fn json(&self) -> &Map<String, Value> {
        &self.json
    }

    /// Raw body.
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// Consumes the response, returning the raw body.
    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }

    /// Body decoded as UTF-8, with invalid sequences replaced.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }

    /// Returns the JSON field `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownDataReturned`] if the field is missing.
    pub fn field(&self, key: &str) -> Result<&Value> {
        self.json.get(key).ok_or_else(|| self.unknown_data())
    }

    /// Returns the JSON field `key` as a string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownDataReturned`] if the field is missing or not a string.
    pub fn str_field(&self, key: &str) -> Result<&str> {
        self.field(key)?.as_str().ok_or_else(|| self.unknown_data())
    }

    /// Deserializes the JSON field `key` into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownDataReturned`] if the field is missing or has the wrong shape.
    pub fn field_as<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let value = self.field(key)?.clone();
        serde_json::from_value(value).map_err(|e| {
            log::debug!("field '{}' of {} did not decode: {}", key, self.endpoint, e);
            self.unknown_data()
        })
    }

    /// Deserializes the whole body into `T`, for endpoints answering with a bare JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownDataReturned`] if the body has the wrong shape.
    pub fn body_as<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.bytes).map_err(|e| {
            log::debug!("body of {} did not decode: {}", self.endpoint, e);
            self.unknown_data()
        })
    }

    pub(crate) fn unknown_data(&self) -> Error {
        Error::UnknownDataReturned(self.endpoint.clone())
    }

    /// Status used for classification: the `status_code` field of a 2xx body
    /// when there is one, the HTTP status otherwise.
    fn effective_status(&self) -> u16 {
        if !(200..300).contains(&self.status) {
            return self.status;
        }
        self.json
            .get("status_code")
            .and_then(Value::as_u64)
            .and_then(|code| u16::try_from(code).ok())
            .unwrap_or(self.status)
    }

    fn error_message(&self) -> Option<&str> {
        self.json.get("error").and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &str) -> Response {
        let url = Url::parse("https://api.example/search").unwrap();
        Response::from_parts(status, url, "/search".into(), Bytes::from(body.to_owned()))
    }

    #[test]
    fn statuses_are_classified() {
        assert_eq!(Outcome::of(200), Outcome::Success);
        assert_eq!(Outcome::of(204), Outcome::Success);
        assert_eq!(Outcome::of(429), Outcome::RateLimited);
        assert_eq!(Outcome::of(500), Outcome::ServerError);
        assert_eq!(Outcome::of(502), Outcome::Offline);
        assert_eq!(Outcome::of(400), Outcome::Rejected);
        assert_eq!(Outcome::of(404), Outcome::Unknown(404));
        assert_eq!(Outcome::of(503), Outcome::Unknown(503));
    }

    #[test]
    fn invalid_json_gives_empty_body() {
        let res = response(200, "\u{89}PNG not json");
        assert!(res.json().is_empty());
        assert_eq!(res.effective_status(), 200);

        let res = response(200, "[1, 2, 3]");
        assert!(res.json().is_empty());
        assert_eq!(res.body_as::<Vec<u8>>().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn in_band_status_code_wins_on_success() {
        let res = response(200, r#"{"status_code": 400, "error": "Invalid URL Given"}"#);
        assert_eq!(res.effective_status(), 400);
        assert_eq!(res.error_message(), Some("Invalid URL Given"));

        let res = response(502, r#"{"status_code": 200}"#);
        assert_eq!(res.effective_status(), 502);
    }

    #[test]
    fn missing_field_names_the_endpoint() {
        let res = response(200, r#"{"status_code": 200, "results": "nope"}"#);

        let err = res.field("link").unwrap_err();
        assert!(matches!(err, Error::UnknownDataReturned(ref e) if e == "/search"));

        let err = res.field_as::<Vec<String>>("results").unwrap_err();
        assert!(matches!(err, Error::UnknownDataReturned(_)));

        assert_eq!(res.str_field("results").unwrap(), "nope");
    }

    #[test]
    fn text_is_lossy() {
        let res = response(200, "hello");
        assert_eq!(res.text(), "hello");
        assert_eq!(res.into_bytes(), Bytes::from_static(b"hello"));
    }
}
