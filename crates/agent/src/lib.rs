//! Bookstore agent runtime: turns customer messages into journey steps,
//! tool calls and guideline answers.
//!
//! # Architecture
//!
//! Each message goes through a fixed loop:
//! 1. **Intent extraction** (`conversation`) - keyword rules produce a `CustomerIntent`
//! 2. **Journey driving** (`runtime`) - the purchase journey advances and calls `tools`
//! 3. **Guidelines** (`guidelines`) - store questions are answered from glossary facts
//! 4. **Rephrasing** (`llm`, `prompt`) - an optional LLM rewrites the scripted reply
//!
//! The LLM only rewords text. Stock, titles and order dates always come from
//! the inventory through the tool registry.

pub mod agent;
pub mod conversation;
pub mod guidelines;
pub mod llm;
pub mod prompt;
pub mod runtime;
pub mod session;
pub mod tools;

pub use agent::{AgentBlueprint, AgentDescription};
pub use runtime::{AgentReply, AgentRuntime, Clock, FixedClock, SystemClock, ToolCall};
pub use session::{Session, SessionLimits, SessionStore};
