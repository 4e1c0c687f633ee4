#![deny(clippy::all, clippy::pedantic)]
#![deny(missing_docs)]
#![allow(clippy::must_use_candidate, clippy::module_name_repetitions)]
//! # ciberedev
//!
//! ciberedev is a wrapper library around the [cibere.dev](https://cibere.dev) API.
//!
//! This library can:
//! - take screenshots of websites
//! - search the web and fetch random words
//! - turn images into ASCII art and write text onto them
//! - upload pastes and create embed pages
//! - render [`checkers`] boards
//! - run a Discord OAuth flow through [`Client::discord_oauth`]
//!
//! Every call goes through one request pipeline that:
//! - retries rate-limited (`429`) and failing (`500`) requests every 5 seconds
//!   for as long as it takes, notifying a [`RateLimitHandler`] on each `429`.
//! - maps the API's error messages to typed [`Error`]s.
//!
//! ## Example: Searching the web.
//!
//! ```no_run
//! # type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;
//! use ciberedev::Client;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = Client::new();
//!
//!     let results = client.get_search_results("rust programming language", 3).await?;
//!     for result in &results {
//!         println!("{}\n  {}\n  {}", result.title(), result.description(), result.url());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! [`Error`]: crate::error::Error

/// Credentials for the endpoints that need them.
pub mod authorization;

/// Client module contains [`Client`] for calling the API.
pub mod client;

/// Contains [`Error`]s that can be thrown by the libary.
///
/// [`Error`]: crate::error::Error
pub mod error;

/// The request executor and the [`Response`](crate::http::Response) it returns.
pub mod http;

/// The rate-limit notification hook.
pub mod ratelimit;

/// [`Route`](crate::route::Route)s describe single API calls.
pub mod route;

pub(crate) mod models;

pub(crate) mod result;

pub use client::{Client, ClientBuilder};
pub use models::*;
pub use ratelimit::{LogRateLimit, RateLimitHandler};
pub use result::Result;
