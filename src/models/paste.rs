use serde_json::Value;

use crate::{
    models::macros::str_opt_ref,
    result::Result,
    route::{Parameters, Route},
    Client,
};

/// A paste uploaded to the paste host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paste {
    url: String,
    code: Option<String>,
}

impl Paste {
    /// Where the paste can be viewed.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Short code identifying the paste, when the host returns one.
    pub fn code(&self) -> Option<&str> {
        str_opt_ref!(self.code)
    }
}

impl Client {
    /// Uploads `text` to the paste host.
    ///
    /// # Errors
    ///
    /// Any error of [`HttpClient::request`](crate::http::HttpClient::request), or
    /// [`Error::UnknownDataReturned`](crate::error::Error::UnknownDataReturned)
    /// if the answer carries no URL.
    pub async fn create_paste(&self, text: &str) -> Result<Paste> {
        let form: Parameters = [("text", text)].into_iter().collect();
        let route = Route::post(self.paste_endpoint("upload")).form(form);

        let response = self.http.request(&route).await?;
        let url = response.str_field("url")?.to_string();
        let code = response
            .json()
            .get("code")
            .and_then(Value::as_str)
            .map(ToString::to_string);
        Ok(Paste { url, code })
    }
}
