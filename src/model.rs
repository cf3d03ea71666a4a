use serde::{Deserialize, Serialize};

/// One taxonomy item (author or theme) from the site navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub name: String,
    /// Absolute listing URL.
    pub url: String,
}

/// Both navigation menus of the root page.
#[derive(Debug, Default)]
pub struct Menus {
    pub authors: Vec<MenuEntry>,
    pub themes: Vec<MenuEntry>,
}

/// A poem as seen on a listing page, before its themes are known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoemStub {
    pub title: String,
    pub url: String,
    pub comment_count: u32,
}

/// A fully resolved record of the persisted dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poem {
    pub title: String,
    pub url: String,
    #[serde(rename = "comments")]
    pub comment_count: u32,
    pub author: String,
    #[serde(rename = "categories")]
    pub themes: Vec<String>,
}

impl Poem {
    pub fn from_stub(stub: PoemStub, author: &str, themes: Vec<String>) -> Self {
        Poem {
            title: stub.title,
            url: stub.url,
            comment_count: stub.comment_count,
            author: author.to_string(),
            themes,
        }
    }
}

/// A dataset record with the poem body attached by `enrich`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedPoem {
    #[serde(flatten)]
    pub poem: Poem,
    pub content: String,
}
