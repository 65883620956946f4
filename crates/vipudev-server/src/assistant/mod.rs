//! Assistant adapters: thin pass-through calls to the hosted chat-completion
//! and image-generation APIs, plus the conversation-memory prompt builder.
//! No retry, no caching, no rate limiting.

pub mod client;
pub mod memory;

pub use client::{AssistantClient, WireMessage};
pub use memory::build_messages;
