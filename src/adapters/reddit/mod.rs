//! Reddit adapter. Implements ForumGateway over the OAuth API.

pub mod client;
pub mod mapper;

pub use client::RedditGateway;
