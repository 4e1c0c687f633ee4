use std::path::Path;

use bytes::Bytes;
use reqwest::Url;
use serde_json::{Map, Value};

use crate::{error::Error, result::Result, route::Route, Client};

/// An image hosted by the API, downloaded into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    url: String,
    bytes: Bytes,
}

impl Image {
    pub(crate) fn new(url: impl Into<String>, bytes: Bytes) -> Self {
        Self {
            url: url.into(),
            bytes,
        }
    }

    /// Where the image is hosted.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The image data.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consumes the image, returning its data.
    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }

    /// Writes the image data to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        tokio::fs::write(path, &self.bytes).await?;
        Ok(())
    }
}

/// Cleans up a user supplied URL: strips Discord-style `<...>` wrapping and
/// defaults the scheme to `http`.
fn normalize_url(url: &str) -> Result<String> {
    let trimmed = url.trim();
    let trimmed = trimmed.strip_prefix('<').unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix('>').unwrap_or(trimmed);

    let candidate = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    };

    let valid = Url::parse(&candidate).is_ok_and(|parsed| {
        matches!(parsed.scheme(), "http" | "https")
            && parsed
                .host_str()
                .is_some_and(|host| host.contains('.') || host == "localhost")
    });

    if valid {
        Ok(candidate)
    } else {
        Err(Error::InvalidUrl(url.to_string()))
    }
}

impl Client {
    /// Takes a screenshot of `url` after waiting `delay` seconds on the page.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidUrl`] if `url` is not a website address.
    /// - [`Error::UnableToConnect`] if the API could not open the website.
    /// - [`Error::InvalidAuthorization`] if the configured token was rejected.
    /// - Any error of [`HttpClient::request`](crate::http::HttpClient::request).
    pub async fn take_screenshot(&self, url: &str, delay: u32) -> Result<Image> {
        let url = normalize_url(url)?;

        let unreachable = url.clone();
        let invalid = url.clone();
        let mut route = Route::post(self.api_endpoint("screenshot"))
            .query("url", &url)
            .query("delay", delay)
            .on_error("I was unable to connect to the website.", move || {
                Error::UnableToConnect(unreachable.clone())
            })
            .on_error("Invalid URL Given", move || Error::InvalidUrl(invalid.clone()))
            .on_error("Invalid Authorization", || Error::InvalidAuthorization);
        if let Some(auth) = self.authorization().screenshot_auth() {
            route = route.header("token", auth.token());
        }

        let response = self.http.request(&route).await?;
        let link = response.str_field("link")?;
        self.fetch_image(link).await
    }

    /// Renders the image at `url` as ASCII art, optionally `width` characters wide.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidUrl`] if the API cannot use the URL, or any error of
    /// [`HttpClient::request`](crate::http::HttpClient::request).
    pub async fn convert_image_to_ascii(&self, url: &str, width: Option<u32>) -> Result<String> {
        let invalid = url.to_string();
        let mut route = Route::get(self.api_endpoint("image/ascii"))
            .query("url", url)
            .on_error("Invalid URL Given", move || Error::InvalidUrl(invalid.clone()));
        if let Some(width) = width {
            route = route.query("width", width);
        }

        let response = self.http.request(&route).await?;
        response.str_field("msg").map(ToString::to_string)
    }

    /// Writes `text` onto the image at `url` in `color`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidUrl`] if the API cannot use the URL, or any error of
    /// [`HttpClient::request`](crate::http::HttpClient::request).
    pub async fn add_text_to_image(&self, url: &str, text: &str, color: &str) -> Result<Image> {
        let mut body = Map::new();
        body.insert("url".into(), Value::from(url));
        body.insert("text".into(), Value::from(text));
        body.insert("color".into(), Value::from(color));

        let invalid = url.to_string();
        let route = Route::post(self.api_endpoint("image/add-text"))
            .json(body)
            .on_error("Invalid URL Given", move || Error::InvalidUrl(invalid.clone()));

        let response = self.http.request(&route).await?;
        let link = response.str_field("link")?;
        self.fetch_image(link).await
    }
}
