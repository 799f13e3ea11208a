//! Telegram bot that answers user-defined triggers with templated responses.

pub mod config;
pub mod quotes;
pub mod respond;
