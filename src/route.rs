use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    sync::Arc,
};

use reqwest::Url;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::{error::Error, result::Result};

/// HTTP methods used by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
}

impl Method {
    /// Returns the method name as it appears on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        }
    }
}

/// A string to string mapping used for query parameters, headers and form bodies.
///
/// Inserting an existing key replaces its value. Iteration is sorted by key,
/// which keeps built URLs reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Parameters {
    inner: BTreeMap<String, String>,
}

/// Query parameters of a [`Route`].
pub type QueryParams = Parameters;

/// Headers of a [`Route`].
pub type Headers = Parameters;

impl Parameters {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to `value`, returning the value it replaced.
    pub fn insert(&mut self, key: impl Into<String>, value: impl ToString) -> Option<String> {
        self.inner.insert(key.into(), value.to_string())
    }

    /// Returns the value stored for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.inner.get(key).map(String::as_str)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the mapping has no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterates over the entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Parameters::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

/// Request payload of a [`Route`].
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Sent as `application/json`.
    Json(Map<String, Value>),
    /// Sent as `application/x-www-form-urlencoded`.
    Form(Parameters),
}

type ErrorFactory = Arc<dyn Fn() -> Error + Send + Sync>;

/// Maps exact error messages reported by the server to typed errors.
#[derive(Clone, Default)]
pub struct ErrorIndex {
    inner: HashMap<String, ErrorFactory>,
}

impl ErrorIndex {
    /// Registers the error produced when the server reports `message`.
    pub fn insert<F>(&mut self, message: impl Into<String>, factory: F)
    where
        F: Fn() -> Error + Send + Sync + 'static,
    {
        self.inner.insert(message.into(), Arc::new(factory));
    }

    /// Builds the error registered for `message`, if any.
    pub fn lookup(&self, message: &str) -> Option<Error> {
        self.inner.get(message).map(|factory| factory())
    }

    /// Whether a mapping exists for `message`.
    pub fn contains(&self, message: &str) -> bool {
        self.inner.contains_key(message)
    }

    /// Number of registered messages.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether no message is registered.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl fmt::Debug for ErrorIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.inner.keys()).finish()
    }
}

/// Describes a single API call.
///
/// A route is assembled by value with the chained constructors below and is
/// only borrowed afterwards, so a built route never changes. Every call to the
/// API builds a fresh one.
///
/// ```
/// use ciberedev::route::{Method, Route};
///
/// let route = Route::get("https://api.cibere.dev/search")
///     .query("query", "cats")
///     .query("amount", 5);
///
/// assert_eq!(route.method(), Method::Get);
/// assert_eq!(
///     route.url().unwrap().as_str(),
///     "https://api.cibere.dev/search?amount=5&query=cats"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Route {
    method: Method,
    endpoint: String,
    headers: Headers,
    query_params: QueryParams,
    body: Option<Body>,
    error_index: ErrorIndex,
}

impl Route {
    /// Starts a route for `method` on the absolute URL `endpoint`.
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            headers: Headers::new(),
            query_params: QueryParams::new(),
            body: None,
            error_index: ErrorIndex::default(),
        }
    }

    /// Starts a `GET` route.
    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(Method::Get, endpoint)
    }

    /// Starts a `POST` route.
    pub fn post(endpoint: impl Into<String>) -> Self {
        Self::new(Method::Post, endpoint)
    }

    /// Adds a query parameter.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query_params.insert(key, value);
        self
    }

    /// Replaces all query parameters.
    #[must_use]
    pub fn with_query_params(mut self, query_params: QueryParams) -> Self {
        self.query_params = query_params;
        self
    }

    /// Adds a header.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.headers.insert(key, value);
        self
    }

    /// Replaces all headers.
    #[must_use]
    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    /// Sends `body` as a JSON object.
    #[must_use]
    pub fn json(mut self, body: Map<String, Value>) -> Self {
        self.body = Some(Body::Json(body));
        self
    }

    /// Sends `form` url-encoded.
    #[must_use]
    pub fn form(mut self, form: Parameters) -> Self {
        self.body = Some(Body::Form(form));
        self
    }

    /// Maps the server error `message` to the error built by `factory`.
    #[must_use]
    pub fn on_error<F>(mut self, message: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Error + Send + Sync + 'static,
    {
        self.error_index.insert(message, factory);
        self
    }

    /// The request method.
    pub fn method(&self) -> Method {
        self.method
    }

    /// The absolute endpoint URL, without query parameters.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The request headers.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// The query parameters.
    pub fn query_params(&self) -> &QueryParams {
        &self.query_params
    }

    /// The request body, if any.
    pub fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    /// The server error mapping.
    pub fn error_index(&self) -> &ErrorIndex {
        &self.error_index
    }

    /// Builds the wire URL: the endpoint followed by the url-encoded query parameters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEndpoint`] if the endpoint is not an absolute URL.
    pub fn url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.endpoint).map_err(|e| Error::InvalidEndpoint {
            endpoint: self.endpoint.clone(),
            reason: e.to_string(),
        })?;
        if !self.query_params.is_empty() {
            url.query_pairs_mut().extend_pairs(self.query_params.iter());
        }
        Ok(url)
    }

    /// The path part of the endpoint (e.g. `/screenshot`), used in errors and logs.
    pub fn path(&self) -> String {
        Url::parse(&self.endpoint)
            .map(|url| url.path().to_string())
            .unwrap_or_else(|_| self.endpoint.clone())
    }

    /// Error for a `400` carrying `message`.
    pub(crate) fn error_for(&self, message: &str) -> Error {
        self.error_index
            .lookup(message)
            .unwrap_or_else(|| Error::UnknownError(message.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_without_params_is_the_endpoint() {
        let route = Route::get("https://api.example/random/word");
        assert_eq!(route.url().unwrap().as_str(), "https://api.example/random/word");
    }

    #[test]
    fn url_encodes_params_in_key_order() {
        let route = Route::get("https://api.example/search")
            .query("query", "cats & dogs")
            .query("amount", 5);
        assert_eq!(
            route.url().unwrap().as_str(),
            "https://api.example/search?amount=5&query=cats+%26+dogs"
        );
    }

    #[test]
    fn duplicate_keys_keep_the_last_value() {
        let mut params = QueryParams::new();
        assert_eq!(params.insert("delay", 1), None);
        assert_eq!(params.insert("delay", 3), Some("1".to_string()));
        assert_eq!(params.get("delay"), Some("3"));
        assert_eq!(params.len(), 1);

        let route = Route::post("https://api.example/screenshot")
            .header("token", "a")
            .header("token", "b");
        assert_eq!(route.headers().get("token"), Some("b"));
    }

    #[test]
    fn parameters_collect_from_pairs() {
        let params: Parameters = [("b", 2), ("a", 1)].into_iter().collect();
        let pairs: Vec<_> = params.iter().collect();
        assert_eq!(pairs, vec![("a", "1"), ("b", "2")]);
    }

    #[test]
    fn relative_endpoint_is_rejected() {
        let err = Route::get("/search").url().unwrap_err();
        assert!(matches!(err, Error::InvalidEndpoint { endpoint, .. } if endpoint == "/search"));
    }

    #[test]
    fn path_strips_host() {
        assert_eq!(Route::post("https://api.example/image/add-text").path(), "/image/add-text");
        assert_eq!(Route::get("not a url").path(), "not a url");
    }

    #[test]
    fn error_index_maps_known_messages() {
        let route = Route::post("https://api.example/screenshot")
            .on_error("Invalid URL Given", || Error::InvalidUrl("x".into()));

        assert!(route.error_index().contains("Invalid URL Given"));
        assert!(matches!(
            route.error_for("Invalid URL Given"),
            Error::InvalidUrl(url) if url == "x"
        ));
        assert!(matches!(
            route.error_for("something else"),
            Error::UnknownError(msg) if msg == "something else"
        ));
    }

    #[test]
    fn json_body_is_kept() {
        let mut body = Map::new();
        body.insert("text".into(), Value::from("hi"));
        let route = Route::post("https://api.example/image/add-text").json(body.clone());
        assert_eq!(route.body(), Some(&Body::Json(body)));
        assert_eq!(Route::get("https://api.example").body(), None);
    }
}
