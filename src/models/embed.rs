use crate::{error::Error, result::Result, route::Route, Client};

/// Content of an embed page. Every field is optional, but an embed can show
/// either a thumbnail or a full image, not both.
///
/// ```
/// use ciberedev::embed::EmbedData;
///
/// let data = EmbedData::new()
///     .title("My Embeds Title")
///     .description("My Embeds Description")
///     .author("my embeds author");
/// assert_eq!(data.get_title(), Some("My Embeds Title"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmbedData {
    title: Option<String>,
    description: Option<String>,
    author: Option<String>,
    color: Option<String>,
    url: Option<String>,
    image: Option<String>,
    thumbnail: Option<String>,
}

macro_rules! embed_field {
    ($($field:ident / $getter:ident: $doc:literal),* $(,)?) => {
        impl EmbedData {
            $(
                #[doc = concat!("Sets the ", $doc, ".")]
                #[must_use]
                pub fn $field(mut self, value: impl Into<String>) -> Self {
                    self.$field = Some(value.into());
                    self
                }

                #[doc = concat!("The ", $doc, ", if set.")]
                pub fn $getter(&self) -> Option<&str> {
                    self.$field.as_deref()
                }
            )*
        }
    };
}

embed_field! {
    title / get_title: "title",
    description / get_description: "description",
    author / get_author: "author line",
    color / get_color: "accent color, e.g. `#ff0000`",
    url / get_url: "link the title points to",
    image / get_image: "URL of the large image",
    thumbnail / get_thumbnail: "URL of the thumbnail",
}

impl EmbedData {
    /// An embed without content.
    pub fn new() -> Self {
        Self::default()
    }

    fn params(&self) -> Result<Vec<(&'static str, &str)>> {
        if self.image.is_some() && self.thumbnail.is_some() {
            return Err(Error::ThumbnailAndImage);
        }

        let fields = [
            ("title", &self.title),
            ("desc", &self.description),
            ("author", &self.author),
            ("color", &self.color),
            ("url", &self.url),
            ("image", &self.image),
            ("thumbnail", &self.thumbnail),
        ];
        Ok(fields
            .into_iter()
            .filter_map(|(key, value)| value.as_deref().map(|v| (key, v)))
            .collect())
    }
}

/// An embed page hosted on the website.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Embed {
    url: String,
    data: EmbedData,
}

impl Embed {
    /// Link to the embed page.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// What the embed was created with.
    pub fn data(&self) -> &EmbedData {
        &self.data
    }
}

impl Client {
    /// Creates an embed page showing `data`.
    ///
    /// # Errors
    ///
    /// - [`Error::ThumbnailAndImage`] if both are set. No request is made.
    /// - Any error of [`HttpClient::request`](crate::http::HttpClient::request).
    pub async fn create_embed(&self, data: EmbedData) -> Result<Embed> {
        let mut route = Route::post(self.embed_endpoint("embed/upload"));
        for (key, value) in data.params()? {
            route = route.query(key, value);
        }

        let response = self.http.request(&route).await?;
        let url = response.str_field("url")?.to_string();
        Ok(Embed { url, data })
    }
}
