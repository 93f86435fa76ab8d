//! LLM integration module

pub mod assembler;
pub mod client;
pub mod examples;
pub mod generator;
pub mod prompts;
