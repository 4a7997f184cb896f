//! Clients for hosted LLM completion endpoints.

pub mod claude_api_client;

pub use claude_api_client::ClaudeApiClient;
