//! Concrete LLM provider implementations

#[cfg(feature = "gemini")]
pub mod gemini;
#[cfg(feature = "groq")]
pub mod openai_compat;

#[cfg(feature = "gemini")]
pub use gemini::{GeminiConfig, GeminiProvider};
#[cfg(feature = "groq")]
pub use openai_compat::{OpenAICompatConfig, OpenAICompatProvider};
