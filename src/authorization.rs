use std::fmt;

/// Discord API version used when none is configured.
pub const DEFAULT_DISCORD_API_VERSION: u8 = 10;

/// Every credential the [`Client`](crate::Client) may use. All are optional;
/// endpoints that need a missing one fail with
/// [`Error::NoAuthorizationGiven`](crate::error::Error::NoAuthorizationGiven).
#[derive(Debug, Clone, Default)]
pub struct Authorization {
    screenshot: Option<ScreenshotAuthorization>,
    discord_oauth: Option<DiscordOauthAuthorization>,
}

impl Authorization {
    /// No credentials at all.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the screenshot token.
    #[must_use]
    pub fn screenshot(mut self, auth: ScreenshotAuthorization) -> Self {
        self.screenshot = Some(auth);
        self
    }

    /// Sets the Discord application credentials.
    #[must_use]
    pub fn discord_oauth(mut self, auth: DiscordOauthAuthorization) -> Self {
        self.discord_oauth = Some(auth);
        self
    }

    /// The screenshot token, if configured.
    pub fn screenshot_auth(&self) -> Option<&ScreenshotAuthorization> {
        self.screenshot.as_ref()
    }

    /// The Discord application credentials, if configured.
    pub fn discord_oauth_auth(&self) -> Option<&DiscordOauthAuthorization> {
        self.discord_oauth.as_ref()
    }
}

/// Token sent with screenshot requests.
#[derive(Clone, PartialEq, Eq)]
pub struct ScreenshotAuthorization {
    token: String,
}

impl ScreenshotAuthorization {
    /// Wraps `token`.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub(crate) fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for ScreenshotAuthorization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScreenshotAuthorization")
            .field("token", &"<redacted>")
            .finish()
    }
}

/// A Discord application's OAuth credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct DiscordOauthAuthorization {
    client_id: u64,
    client_secret: String,
    redirect_url: String,
    api_version: u8,
}

impl DiscordOauthAuthorization {
    /// Credentials for API version [`DEFAULT_DISCORD_API_VERSION`].
    pub fn new(
        client_id: u64,
        client_secret: impl Into<String>,
        redirect_url: impl Into<String>,
    ) -> Self {
        Self {
            client_id,
            client_secret: client_secret.into(),
            redirect_url: redirect_url.into(),
            api_version: DEFAULT_DISCORD_API_VERSION,
        }
    }

    /// Targets another Discord API version.
    #[must_use]
    pub fn api_version(mut self, version: u8) -> Self {
        self.api_version = version;
        self
    }

    /// The application id.
    pub fn client_id(&self) -> u64 {
        self.client_id
    }

    /// The redirect URL registered with the application.
    pub fn redirect_url(&self) -> &str {
        &self.redirect_url
    }

    /// The targeted Discord API version.
    pub fn version(&self) -> u8 {
        self.api_version
    }

    pub(crate) fn client_secret(&self) -> &str {
        &self.client_secret
    }
}

impl fmt::Debug for DiscordOauthAuthorization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscordOauthAuthorization")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_url", &self.redirect_url)
            .field("api_version", &self.api_version)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secrets_stay_out_of_debug_output() {
        let auth = Authorization::new()
            .screenshot(ScreenshotAuthorization::new("hunter2"))
            .discord_oauth(DiscordOauthAuthorization::new(1, "s3cret", "https://x.dev/cb"));
        let debug = format!("{auth:?}");
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("s3cret"));
        assert!(debug.contains("https://x.dev/cb"));
    }

    #[test]
    fn discord_defaults_to_v10() {
        let auth = DiscordOauthAuthorization::new(1, "s", "r");
        assert_eq!(auth.version(), DEFAULT_DISCORD_API_VERSION);
        assert_eq!(auth.api_version(9).version(), 9);
    }
}
