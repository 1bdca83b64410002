use std::fmt;

/// Pagination window for tag listings (`skip` entries, then at most `limit`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Page {
    pub skip: usize,
    pub limit: usize,
}

impl Page {
    pub fn new(skip: usize, limit: usize) -> Self {
        Self { skip, limit }
    }
}

/// Endpoint families exposed by a [`CatSource`](super::CatSource).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Cat,
    CatGif,
    CatByTag,
    CatSays,
    CatByTagSays,
    CatSaysStyled,
    CatMeta,
    Tags,
    CatsByTags,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Cat => "cat",
            Endpoint::CatGif => "cat_gif",
            Endpoint::CatByTag => "cat_by_tag",
            Endpoint::CatSays => "cat_says",
            Endpoint::CatByTagSays => "cat_by_tag_says",
            Endpoint::CatSaysStyled => "cat_says_styled",
            Endpoint::CatMeta => "cat_meta",
            Endpoint::Tags => "tags",
            Endpoint::CatsByTags => "cats_by_tags",
        }
    }
}

/// One call made against a data source, with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Cat,
    CatGif,
    CatByTag {
        tag: String,
    },
    CatSays {
        text: String,
    },
    CatByTagSays {
        tag: String,
        text: String,
    },
    CatSaysStyled {
        text: String,
        size: u32,
        color: String,
    },
    CatMeta,
    Tags,
    CatsByTags {
        tags: Vec<String>,
        page: Option<Page>,
    },
}

impl Request {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            Request::Cat => Endpoint::Cat,
            Request::CatGif => Endpoint::CatGif,
            Request::CatByTag { .. } => Endpoint::CatByTag,
            Request::CatSays { .. } => Endpoint::CatSays,
            Request::CatByTagSays { .. } => Endpoint::CatByTagSays,
            Request::CatSaysStyled { .. } => Endpoint::CatSaysStyled,
            Request::CatMeta => Endpoint::CatMeta,
            Request::Tags => Endpoint::Tags,
            Request::CatsByTags { .. } => Endpoint::CatsByTags,
        }
    }

    /// Path and query of the request on a cataas-style HTTP API.
    ///
    /// ```
    /// use chainvisor::source::{Page, Request};
    ///
    /// let r = Request::CatsByTags { tags: vec!["cute".into(), "orange".into()], page: Some(Page::new(10, 5)) };
    /// assert_eq!(r.path(), "/api/tags?tags=cute,orange&skip=10&limit=5");
    /// ```
    pub fn path(&self) -> String {
        match self {
            Request::Cat => "/cat".to_string(),
            Request::CatGif => "/cat/gif".to_string(),
            Request::CatByTag { tag } => format!("/cat/{tag}"),
            Request::CatSays { text } => format!("/cat/says/{text}"),
            Request::CatByTagSays { tag, text } => format!("/cat/{tag}/says/{text}"),
            Request::CatSaysStyled { text, size, color } => {
                format!("/cat/says/{text}?size={size}&color={color}")
            }
            Request::CatMeta => "/cat?json=true".to_string(),
            Request::Tags => "/api/tags".to_string(),
            Request::CatsByTags { tags, page } => {
                let mut path = format!("/api/tags?tags={}", tags.join(","));
                if let Some(p) = page {
                    path.push_str(&format!("&skip={}&limit={}", p.skip, p.limit));
                }
                path
            }
        }
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
