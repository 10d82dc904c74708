//! Prompt templates for LLM-backed plugins

pub mod template;

pub use template::PromptTemplate;
