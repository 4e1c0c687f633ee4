pub mod checkers;
/// Discord OAuth helpers.
pub mod discord;
/// Embed pages.
pub mod embed;
/// Screenshots and image manipulation.
pub mod image;
/// Text pasting.
pub mod paste;
/// Web search and random words.
pub mod search;

use serde::Deserialize;

pub(crate) fn de_bool<'de, D>(d: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: u32 = serde::Deserialize::deserialize(d)?;
    Ok(value == 1)
}

/// Discord sends ids and permission sets as strings to dodge float precision,
/// older payloads as numbers.
pub(crate) fn de_snowflake<'de, D>(d: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Snowflake {
        Str(String),
        Num(u64),
    }

    match Snowflake::deserialize(d)? {
        Snowflake::Str(s) => s.parse().map_err(serde::de::Error::custom),
        Snowflake::Num(n) => Ok(n),
    }
}

pub(crate) mod macros {
    macro_rules! str_opt_ref {
        ($x:expr) => {
            $x.as_ref().map(|x| x.as_ref())
        };
    }

    pub(crate) use str_opt_ref;
}
