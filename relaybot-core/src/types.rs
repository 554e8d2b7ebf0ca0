use serde::{Deserialize, Serialize};

/// A candidate post fetched from a subreddit listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: String,
    pub domain: String,
    pub subreddit: String,
    pub author: String,
    pub permalink: String,
    pub title: String,
    pub url: String,
    pub score: i64,
    pub is_adult: bool,
    pub is_self_post: bool,
}

impl Item {
    /// Returns a copy of the item carrying `title` in place of its own.
    pub fn with_title(&self, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..self.clone()
        }
    }

    /// Markdown body of the comment that links a repost back to this item.
    pub fn source_comment(&self) -> String {
        format!(
            "Source Post: [reddit.com/{}](https://reddit.com{})",
            self.id, self.permalink
        )
    }
}

/// A subreddit accepted items are republished to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    pub subreddit: String,
    /// Replaces the source title when set.
    #[serde(default)]
    pub title: Option<String>,
}

impl Destination {
    pub fn new(subreddit: impl Into<String>) -> Self {
        Self {
            subreddit: subreddit.into(),
            title: None,
        }
    }

    pub fn with_title(subreddit: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            subreddit: subreddit.into(),
            title: Some(title.into()),
        }
    }

    /// The item as it should be submitted to this destination.
    pub fn retarget(&self, item: &Item) -> Item {
        match &self.title {
            Some(title) => item.with_title(title.clone()),
            None => item.clone(),
        }
    }
}
