//! Exchanges an OAuth2 code and prints who authorized the application.
//!
//! Usage: `cargo run --example discord_oauth -- <client id> <client secret> <code>`

use ciberedev::{
    authorization::{Authorization, DiscordOauthAuthorization},
    Client,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    simple_logger::init_with_level(log::Level::Info)?;

    let mut args = std::env::args().skip(1);
    let (Some(id), Some(secret), Some(code)) = (args.next(), args.next(), args.next()) else {
        anyhow::bail!("usage: discord_oauth <client id> <client secret> <code>");
    };

    let auth = Authorization::new().discord_oauth(DiscordOauthAuthorization::new(
        id.parse()?,
        secret,
        "https://api.cibere.dev/discord_oauth",
    ));
    let client = Client::builder().authorization(auth).build();
    let oauth = client.discord_oauth();

    let mut token = oauth.exchange_code(&code).await?;
    if token.is_expired() {
        if let Some(refresh) = token.refresh_token() {
            token = oauth.refresh_token(refresh).await?;
        }
    }

    let user = oauth.get_user_info(token.token()).await?;
    println!("{} ({})", user.name(), user.id());
    for guild in oauth.get_user_guilds(token.token()).await? {
        println!("  in {}", guild.name());
    }
    Ok(())
}
