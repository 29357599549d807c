pub mod config;
pub mod llm;
pub mod output;
pub mod roster;
pub mod scoring;
pub mod similar;
