//! Infrastructure adapters. Implement outbound ports.
//!
//! Reddit, OpenAI-compatible AI, filesystem export. Map errors to DomainError.

pub mod ai;
pub mod export;
pub mod reddit;
