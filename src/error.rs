use thiserror::Error;

/// Everything that can go wrong while talking to the API or
/// manipulating the values it returns.
#[derive(Debug, Error)]
pub enum Error {
    /// The API could not be reached, or reported itself as down (502).
    #[error("API is down. Aborting API request to '{0}'")]
    ApiOffline(String),

    /// The API rejected the request with a message this client does not know.
    #[error("An unknown error has occured: {0}")]
    UnknownError(String),

    /// The API answered with a status code the client does not handle.
    #[error("API returned an unknown status code: '{0}'")]
    UnknownStatusCode(u16),

    /// A successful response was missing data the client expected.
    #[error("API returned unknown data when making a request to '{0}'")]
    UnknownDataReturned(String),

    /// A route endpoint could not be turned into a URL.
    #[error("invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint {
        /// The offending endpoint.
        endpoint: String,
        /// Why it could not be parsed.
        reason: String,
    },

    /// The given URL is not a valid http(s) URL.
    #[error("Invalid URL Given: '{0}'")]
    InvalidUrl(String),

    /// The API could not connect to the given website.
    #[error("Unable to Connect to '{0}'")]
    UnableToConnect(String),

    /// The API rejected the configured credentials.
    #[error("the authorization given was rejected by the API")]
    InvalidAuthorization,

    /// The endpoint needs credentials that were not configured.
    #[error("no authorization was given for this endpoint")]
    NoAuthorizationGiven,

    /// Discord rejected an OAuth authorization code.
    #[error("invalid oauth2 code given: '{0}'")]
    InvalidCodeGiven(String),

    /// Discord rejected an OAuth refresh token.
    #[error("invalid oauth2 token given: '{0}'")]
    InvalidTokenGiven(String),

    /// A checkers pattern could not be decoded.
    #[error("{reason}")]
    InvalidPattern {
        /// How the pattern is invalid.
        reason: String,
        /// The pattern that was given.
        pattern: String,
    },

    /// A board location outside of `0..32`.
    #[error("the location must be in between 0 and 31, got '{0}'")]
    InvalidLocation(usize),

    /// There is no piece at the given location.
    #[error("there is no piece at '{0}'")]
    EmptyLocation(usize),

    /// An embed was given both a thumbnail and an image.
    #[error("Thumbnail and Image Fields given")]
    ThumbnailAndImage,

    /// A piece is already standing at the given location.
    #[error("There is already a piece at '{0}'")]
    LocationAlreadyTaken(usize),

    /// The piece is already a queen.
    #[error("This piece can not be promoted anymore")]
    UnableToPromote,

    /// The piece is not a queen.
    #[error("This piece can not be demoted anymore")]
    UnableToDemote,

    /// Transport failure other than an unreachable host.
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// Local file operation failed.
    #[error("{0}")]
    Io(#[from] std::io::Error),
}
