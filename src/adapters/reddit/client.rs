//! Implements ForumGateway against the Reddit OAuth API.
//!
//! Authenticates once per run with the script-app password grant and caches the bearer
//! token. Hot posts come from `/r/{sub}/hot`, comment trees from `/comments/{id}`.

use crate::adapters::reddit::mapper::{self, CommentsResponse, Listing, PostThing};
use crate::domain::{DomainError, Post};
use crate::ports::ForumGateway;
use crate::shared::config::RedditCredentials;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};

const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
const API_BASE: &str = "https://oauth.reddit.com";

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Reddit gateway adapter.
pub struct RedditGateway {
    client: Client,
    credentials: RedditCredentials,
    /// Bearer token, fetched lazily on first request.
    token: Mutex<Option<String>>,
}

impl RedditGateway {
    pub fn new(credentials: RedditCredentials, timeout: Duration) -> Result<Self, DomainError> {
        let client = Client::builder()
            .user_agent(credentials.user_agent.clone())
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::Forum(format!("HTTP client init failed: {}", e)))?;
        Ok(Self {
            client,
            credentials,
            token: Mutex::new(None),
        })
    }

    /// Return the cached token, authenticating first if needed.
    async fn access_token(&self) -> Result<String, DomainError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            return Ok(token.clone());
        }

        let creds = &self.credentials;
        let res = self
            .client
            .post(TOKEN_URL)
            .basic_auth(&creds.client_id, Some(&creds.client_secret))
            .form(&[
                ("grant_type", "password"),
                ("username", creds.username.as_str()),
                ("password", creds.password.as_str()),
            ])
            .send()
            .await
            .map_err(|e| DomainError::Auth(format!("token request failed: {}", e)))?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(DomainError::Auth(format!(
                "Reddit token endpoint returned {}: {}",
                status,
                text.chars().take(200).collect::<String>()
            )));
        }

        let body: TokenResponse = res
            .json()
            .await
            .map_err(|e| DomainError::Auth(format!("invalid token response: {}", e)))?;
        let token = body.access_token.ok_or_else(|| {
            DomainError::Auth(body.error.unwrap_or_else(|| "no access_token returned".into()))
        })?;

        info!(username = %creds.username, "authenticated with Reddit");
        *cached = Some(token.clone());
        Ok(token)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, DomainError> {
        let token = self.access_token().await?;
        let url = format!("{}{}", API_BASE, path);
        debug!(url = %url, "GET");

        let res = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await
            .map_err(|e| DomainError::Forum(format!("request to {} failed: {}", path, e)))?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(DomainError::Forum(format!(
                "{} returned {}: {}",
                path,
                status,
                text.chars().take(200).collect::<String>()
            )));
        }

        res.json()
            .await
            .map_err(|e| DomainError::Forum(format!("invalid JSON from {}: {}", path, e)))
    }
}

#[async_trait]
impl ForumGateway for RedditGateway {
    async fn hot_posts(&self, source: &str, limit: u32) -> Result<Vec<Post>, DomainError> {
        let listing: Listing<PostThing> = self
            .get_json(
                &format!("/r/{}/hot", source),
                &[("limit", limit.to_string()), ("raw_json", "1".into())],
            )
            .await?;

        let mut posts = Vec::new();
        for post in mapper::listing_to_posts(listing)
            .into_iter()
            .take(limit as usize)
        {
            let thread: CommentsResponse = self
                .get_json(
                    &format!("/comments/{}", post.id),
                    &[("raw_json", "1".into())],
                )
                .await?;
            let comments = mapper::flatten_comments(thread.1, source).map_err(|e| {
                DomainError::Forum(format!("malformed comment in post {}: {}", post.id, e))
            })?;
            debug!(source, post = %post.id, comments = comments.len(), "fetched thread");
            posts.push(Post {
                id: post.id,
                title: post.title,
                comments,
            });
        }

        Ok(posts)
    }
}
