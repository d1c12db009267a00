use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::frontmatter::{Metadata, TITLE_KEY, UNTITLED};
use crate::store::SearchHit;

pub(crate) const PATH_KEY: &str = "path";
pub(crate) const URL_KEY: &str = "url";

/// A link to another post, stored under the `related_posts` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedPost {
    pub title: String,
    pub url: String,
}

/// Site URL of a post.
pub fn post_url(id: &str) -> String {
    format!("/posts/{id}/")
}

/// Metadata snapshot stored alongside a post in the document store.
pub(crate) fn index_metadata(title: &str, path: &str, id: &str) -> Metadata {
    let mut metadata = Metadata::new();
    metadata.insert(TITLE_KEY.into(), title.into());
    metadata.insert(PATH_KEY.into(), path.into());
    metadata.insert(URL_KEY.into(), post_url(id).into());
    metadata
}

/// Turns search hits into related posts, skipping the post itself.
pub(crate) fn related_posts(hits: Vec<SearchHit>, own_id: &str, count: usize) -> Vec<RelatedPost> {
    hits.into_iter()
        .filter(|hit| hit.id != own_id)
        .take(count)
        .map(|hit| {
            let title = match hit.metadata.get(TITLE_KEY).and_then(Value::as_str) {
                Some(title) if !title.trim().is_empty() => title.to_string(),
                _ => UNTITLED.to_string(),
            };
            RelatedPost {
                title,
                url: post_url(&hit.id),
            }
        })
        .collect()
}
