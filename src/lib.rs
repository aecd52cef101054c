//! Syntax Brawlers - real-time boxing between LLM-driven fighters

pub mod ai;
pub mod arena;
pub mod combat;
pub mod core;
pub mod fighter;
pub mod llm;
