use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    authorization::{DiscordOauthAuthorization, DEFAULT_DISCORD_API_VERSION},
    error::Error,
    models::{de_bool, de_snowflake, macros::str_opt_ref},
    result::Result,
    route::{Parameters, Route},
    Client,
};

/// An OAuth access token issued by Discord.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    access_token: String,
    token_type: String,
    refresh_token: Option<String>,
    scope: String,
    expires_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct RawToken {
    access_token: String,
    token_type: String,
    expires_in: i64,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    scope: String,
}

impl Token {
    /// `None` if `expires_in` puts the expiry outside of the representable range.
    fn from_raw(raw: RawToken, received: DateTime<Utc>) -> Option<Self> {
        let expires_at = Duration::try_seconds(raw.expires_in)
            .and_then(|lifetime| received.checked_add_signed(lifetime))?;
        Some(Self {
            access_token: raw.access_token,
            token_type: raw.token_type,
            refresh_token: raw.refresh_token,
            scope: raw.scope,
            expires_at,
        })
    }

    /// The access token itself.
    pub fn token(&self) -> &str {
        &self.access_token
    }

    /// Token type, usually `Bearer`.
    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    /// Token to pass to [`DiscordOauth::refresh_token`] once this one expires.
    pub fn refresh_token(&self) -> Option<&str> {
        str_opt_ref!(self.refresh_token)
    }

    /// Space separated scopes granted by the user.
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Scopes granted by the user.
    pub fn scopes(&self) -> impl Iterator<Item = &str> {
        self.scope.split_whitespace()
    }

    /// When the token stops working.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Whether the token has expired.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Whether the token is expired at `time`.
    pub fn is_expired_at(&self, time: DateTime<Utc>) -> bool {
        time >= self.expires_at
    }
}

/// The user who authorized the application (`identify` scope).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(deserialize_with = "de_snowflake")]
    id: u64,
    username: String,
    #[serde(default)]
    discriminator: Option<String>,
    #[serde(default)]
    global_name: Option<String>,
    #[serde(default)]
    avatar: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    verified: Option<bool>,
    #[serde(default)]
    locale: Option<String>,
    #[serde(default)]
    mfa_enabled: Option<bool>,
}

impl User {
    /// Snowflake id of the user.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Unique username.
    pub fn name(&self) -> &str {
        &self.username
    }

    /// Legacy four digit tag; `"0"` for migrated accounts.
    pub fn discriminator(&self) -> Option<&str> {
        str_opt_ref!(self.discriminator)
    }

    /// Display name, if set.
    pub fn global_name(&self) -> Option<&str> {
        str_opt_ref!(self.global_name)
    }

    /// Avatar hash, if the user has one.
    pub fn avatar(&self) -> Option<&str> {
        str_opt_ref!(self.avatar)
    }

    /// CDN URL of the avatar, if the user has one.
    pub fn avatar_url(&self) -> Option<String> {
        self.avatar
            .as_ref()
            .map(|hash| format!("https://cdn.discordapp.com/avatars/{}/{hash}.png", self.id))
    }

    /// Email address (`email` scope).
    pub fn email(&self) -> Option<&str> {
        str_opt_ref!(self.email)
    }

    /// Whether the email address is verified (`email` scope).
    pub fn verified(&self) -> Option<bool> {
        self.verified
    }

    /// Chosen language.
    pub fn locale(&self) -> Option<&str> {
        str_opt_ref!(self.locale)
    }

    /// Whether two factor authentication is on.
    pub fn mfa_enabled(&self) -> Option<bool> {
        self.mfa_enabled
    }
}

/// An account linked to the user's profile (`connections` scope).
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    id: String,
    name: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    verified: bool,
    #[serde(default)]
    friend_sync: bool,
    #[serde(default)]
    show_activity: bool,
    #[serde(default)]
    two_way_link: bool,
    #[serde(deserialize_with = "de_bool")]
    visibility: bool,
}

impl Connection {
    /// Id of the account on the connected service.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Account name on the connected service.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The connected service, e.g. `github`.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Whether the connection is verified.
    pub fn verified(&self) -> bool {
        self.verified
    }

    /// Whether friend sync is on.
    pub fn friend_sync(&self) -> bool {
        self.friend_sync
    }

    /// Whether activity from the service is shown in presence.
    pub fn show_activity(&self) -> bool {
        self.show_activity
    }

    /// Whether the connection has a two way link.
    pub fn two_way_link(&self) -> bool {
        self.two_way_link
    }

    /// `true` if everyone can see the connection, `false` if only the user can.
    pub fn visible(&self) -> bool {
        self.visibility
    }
}

/// A guild the user is a member of (`guilds` scope).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialGuild {
    #[serde(deserialize_with = "de_snowflake")]
    id: u64,
    name: String,
    #[serde(default)]
    icon: Option<String>,
    #[serde(default)]
    owner: bool,
    #[serde(deserialize_with = "de_snowflake")]
    permissions: u64,
    #[serde(default)]
    features: Vec<String>,
}

impl PartialGuild {
    /// Snowflake id of the guild.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Name of the guild.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Icon hash, if the guild has one.
    pub fn icon(&self) -> Option<&str> {
        str_opt_ref!(self.icon)
    }

    /// Whether the user owns the guild.
    pub fn owner(&self) -> bool {
        self.owner
    }

    /// The user's permission bit set in the guild.
    pub fn permissions(&self) -> u64 {
        self.permissions
    }

    /// Enabled guild features.
    pub fn features(&self) -> &[String] {
        &self.features
    }
}

/// Discord OAuth helpers, see [`Client::discord_oauth`].
#[derive(Debug, Clone, Copy)]
pub struct DiscordOauth<'a> {
    client: &'a Client,
}

impl Client {
    /// Discord OAuth helpers using this client's credentials and transport.
    pub fn discord_oauth(&self) -> DiscordOauth<'_> {
        DiscordOauth { client: self }
    }
}

impl DiscordOauth<'_> {
    fn credentials(&self) -> Result<&DiscordOauthAuthorization> {
        self.client
            .authorization()
            .discord_oauth_auth()
            .ok_or(Error::NoAuthorizationGiven)
    }

    fn endpoint(&self, path: &str) -> String {
        let version = self
            .client
            .authorization()
            .discord_oauth_auth()
            .map_or(DEFAULT_DISCORD_API_VERSION, DiscordOauthAuthorization::version);
        self.client.discord_endpoint(version, path)
    }

    async fn token(
        &self,
        grant_type: &str,
        key: &str,
        value: &str,
        rejected: fn(String) -> Error,
    ) -> Result<Token> {
        let credentials = self.credentials()?;
        let mut form = Parameters::new();
        form.insert("client_id", credentials.client_id());
        form.insert("client_secret", credentials.client_secret());
        form.insert("redirect_uri", credentials.redirect_url());
        form.insert("grant_type", grant_type);
        form.insert(key, value);

        let given = value.to_string();
        let route = Route::post(self.endpoint("oauth2/token"))
            .form(form)
            .on_error("invalid_grant", move || rejected(given.clone()));

        let response = self.client.http.request(&route).await?;
        let raw = response
            .body_as::<RawToken>()
            .map_err(|_| rejected(value.to_string()))?;
        Token::from_raw(raw, Utc::now()).ok_or_else(|| response.unknown_data())
    }

    /// Exchanges the `code` Discord redirected the user with for a token.
    ///
    /// # Errors
    ///
    /// - [`Error::NoAuthorizationGiven`] without Discord credentials.
    /// - [`Error::InvalidCodeGiven`] if Discord rejects the code.
    /// - Any error of [`HttpClient::request`](crate::http::HttpClient::request).
    pub async fn exchange_code(&self, code: &str) -> Result<Token> {
        self.token("authorization_code", "code", code, Error::InvalidCodeGiven)
            .await
    }

    /// Trades `refresh_token` for a fresh token.
    ///
    /// # Errors
    ///
    /// - [`Error::NoAuthorizationGiven`] without Discord credentials.
    /// - [`Error::InvalidTokenGiven`] if Discord rejects the refresh token.
    /// - Any error of [`HttpClient::request`](crate::http::HttpClient::request).
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<Token> {
        self.token(
            "refresh_token",
            "refresh_token",
            refresh_token,
            Error::InvalidTokenGiven,
        )
        .await
    }

    fn bearer(&self, path: &str, access_token: &str) -> Route {
        Route::get(self.endpoint(path)).header("Authorization", format!("Bearer {access_token}"))
    }

    /// The user that granted `access_token`.
    ///
    /// # Errors
    ///
    /// Any error of [`HttpClient::request`](crate::http::HttpClient::request), or
    /// [`Error::UnknownDataReturned`] if Discord's answer does not decode.
    pub async fn get_user_info(&self, access_token: &str) -> Result<User> {
        let route = self.bearer("users/@me", access_token);
        self.client.http.request(&route).await?.body_as()
    }

    /// Accounts linked to the profile of the user that granted `access_token`.
    ///
    /// # Errors
    ///
    /// Any error of [`HttpClient::request`](crate::http::HttpClient::request), or
    /// [`Error::UnknownDataReturned`] if Discord's answer does not decode.
    pub async fn get_user_connections(&self, access_token: &str) -> Result<Vec<Connection>> {
        let route = self.bearer("users/@me/connections", access_token);
        self.client.http.request(&route).await?.body_as()
    }

    /// Guilds of the user that granted `access_token`.
    ///
    /// # Errors
    ///
    /// Any error of [`HttpClient::request`](crate::http::HttpClient::request), or
    /// [`Error::UnknownDataReturned`] if Discord's answer does not decode.
    pub async fn get_user_guilds(&self, access_token: &str) -> Result<Vec<PartialGuild>> {
        let route = self.bearer("users/@me/guilds", access_token);
        self.client.http.request(&route).await?.body_as()
    }
}
