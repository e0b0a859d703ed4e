//! Port traits. API boundaries for the hexagon.
//!
//! Outbound only: the application calls into forum, AI and export infrastructure.
//! The binary drives the use case directly.

pub mod outbound;

pub use outbound::{AiPort, ExportPort, ForumGateway};
