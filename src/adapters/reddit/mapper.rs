//! Map Reddit listing JSON to domain entities.
//!
//! Comment trees are flattened breadth-first; `more` stubs are dropped (no expansion).

use crate::domain::RawComment;
use serde::Deserialize;
use std::collections::VecDeque;

/// Generic Reddit listing envelope: `{"kind": "Listing", "data": {"children": [...]}}`.
#[derive(Debug, Deserialize)]
pub struct Listing<T> {
    pub data: ListingData<T>,
}

#[derive(Debug, Deserialize)]
pub struct ListingData<T> {
    pub children: Vec<T>,
}

/// `t3` thing from a subreddit listing.
#[derive(Debug, Deserialize)]
pub struct PostThing {
    pub data: PostData,
}

#[derive(Debug, Deserialize)]
pub struct PostData {
    pub id: String,
    #[serde(default)]
    pub title: String,
}

/// Child of a comment listing: a real comment (`t1`) or a `more` placeholder.
#[derive(Debug, Deserialize)]
pub struct CommentThing {
    pub kind: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct CommentData {
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub created_utc: f64,
    /// `""` when a comment has no replies, otherwise a nested listing.
    #[serde(default)]
    pub replies: Replies,
}

#[derive(Debug, Default, Deserialize)]
#[serde(untagged)]
pub enum Replies {
    Listing(Listing<CommentThing>),
    #[default]
    None,
    Empty(String),
}

/// `GET /comments/{id}` returns `[post listing, comment listing]`.
#[derive(Debug, Deserialize)]
pub struct CommentsResponse(
    pub serde_json::Value,
    pub Listing<CommentThing>,
);

/// Post ids and titles from a subreddit listing.
pub fn listing_to_posts(listing: Listing<PostThing>) -> Vec<PostData> {
    listing.data.children.into_iter().map(|t| t.data).collect()
}

/// Flatten a comment listing breadth-first (top-level first, then each level of replies).
pub fn flatten_comments(
    listing: Listing<CommentThing>,
    source_group: &str,
) -> Result<Vec<RawComment>, serde_json::Error> {
    let mut out = Vec::new();
    let mut queue: VecDeque<CommentThing> = listing.data.children.into();

    while let Some(thing) = queue.pop_front() {
        if thing.kind != "t1" {
            continue;
        }
        let data: CommentData = serde_json::from_value(thing.data)?;
        if let Replies::Listing(replies) = data.replies {
            queue.extend(replies.data.children);
        }
        out.push(RawComment {
            body: data.body,
            created_utc: data.created_utc.floor() as i64,
            source_group: source_group.to_string(),
        });
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const THREAD: &str = r#"[
      {"kind": "Listing", "data": {"children": [{"kind": "t3", "data": {"id": "abc", "title": "Patch notes"}}]}},
      {"kind": "Listing", "data": {"children": [
        {"kind": "t1", "data": {
          "body": "top one", "created_utc": 1704067200.0,
          "replies": {"kind": "Listing", "data": {"children": [
            {"kind": "t1", "data": {"body": "reply to one", "created_utc": 1704067260.7, "replies": ""}},
            {"kind": "more", "data": {"count": 3, "children": ["x", "y", "z"]}}
          ]}}
        }},
        {"kind": "t1", "data": {"body": "top two", "created_utc": 1704067300, "replies": ""}},
        {"kind": "more", "data": {"count": 12, "children": ["q"]}}
      ]}}
    ]"#;

    #[test]
    fn test_flatten_breadth_first_skips_more() {
        let parsed: CommentsResponse = serde_json::from_str(THREAD).unwrap();
        let comments = flatten_comments(parsed.1, "BrawlStars").unwrap();

        let bodies: Vec<&str> = comments.iter().map(|c| c.body.as_str()).collect();
        assert_eq!(bodies, vec!["top one", "top two", "reply to one"]);
        assert_eq!(comments[0].created_utc, 1_704_067_200);
        assert_eq!(comments[2].created_utc, 1_704_067_260);
        assert!(comments.iter().all(|c| c.source_group == "BrawlStars"));
    }

    #[test]
    fn test_listing_to_posts() {
        let raw = r#"{"kind": "Listing", "data": {"after": null, "children": [
            {"kind": "t3", "data": {"id": "p1", "title": "Hello", "score": 10}},
            {"kind": "t3", "data": {"id": "p2", "title": "World"}}
        ]}}"#;
        let listing: Listing<PostThing> = serde_json::from_str(raw).unwrap();
        let posts = listing_to_posts(listing);
        let ids: Vec<&str> = posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p2"]);
        assert_eq!(posts[0].title, "Hello");
    }

    #[test]
    fn test_empty_thread() {
        let raw = r#"[{"kind": "Listing", "data": {"children": []}},
                      {"kind": "Listing", "data": {"children": []}}]"#;
        let parsed: CommentsResponse = serde_json::from_str(raw).unwrap();
        assert!(flatten_comments(parsed.1, "rust").unwrap().is_empty());
    }
}
