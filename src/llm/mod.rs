//! Language-model clients and the retrying gateway.
//!
//! The generation capability itself is behind the [`ChatModel`] trait so the
//! orchestration flows never talk to a concrete provider. [`gemini`] is the
//! production implementation; tests substitute scripted fakes.

pub mod client;
pub mod gateway;
pub mod gemini;

pub use client::{ChatModel, ModelReply};
pub use gateway::{ModelGateway, RetryPolicy};
pub use gemini::GeminiClient;
