//! EduBot — WhatsApp intent dispatcher for the academy's support line.

pub mod channels;
pub mod config;
pub mod context;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod server;
pub mod store;
