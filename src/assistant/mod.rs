//! Conversational assistant grounded in the visible organizations

pub mod bridge;
pub mod client;
pub mod conversation;
pub mod task;

pub use bridge::{AssistantBridge, EMPTY_REPLY_FALLBACK, SERVICE_ERROR_FALLBACK};
pub use client::{AnswerService, GeminiClient, GenerationRequest};
pub use conversation::{ChatMessage, ConversationLog, Role};
pub use task::{AssistantSession, AssistantSlot, SubmitRejected};
