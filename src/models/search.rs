use serde::{Deserialize, Serialize};

use crate::{result::Result, route::Route, Client};

/// A single web search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    title: String,
    description: String,
    url: String,
}

impl SearchResult {
    /// Title of the page.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Snippet describing the page.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Link to the page.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Client {
    /// Searches the web for `query`, returning at most `amount` results.
    ///
    /// # Errors
    ///
    /// Any error of [`HttpClient::request`](crate::http::HttpClient::request), or
    /// [`Error::UnknownDataReturned`](crate::error::Error::UnknownDataReturned)
    /// if the results are missing from the answer.
    pub async fn get_search_results(&self, query: &str, amount: u32) -> Result<Vec<SearchResult>> {
        let route = Route::get(self.api_endpoint("search"))
            .query("query", query)
            .query("amount", amount);

        let response = self.http.request(&route).await?;
        response.field_as("results")
    }

    /// Returns `amount` random english words.
    ///
    /// # Errors
    ///
    /// Any error of [`HttpClient::request`](crate::http::HttpClient::request), or
    /// [`Error::UnknownDataReturned`](crate::error::Error::UnknownDataReturned)
    /// if the words are missing from the answer.
    pub async fn get_random_words(&self, amount: u32) -> Result<Vec<String>> {
        let route = Route::get(self.api_endpoint("random/word")).query("amount", amount);

        let response = self.http.request(&route).await?;
        response.field_as("words")
    }
}
